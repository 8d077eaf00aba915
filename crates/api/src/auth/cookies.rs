//! Cookie credential transport.
//!
//! Both tokens travel as HTTP-only cookies on path `/`. Max-age mirrors the
//! token TTLs; logout clears both by re-setting them with max-age 0. The
//! `Secure` flag follows deployment configuration.

use axum_extra::extract::CookieJar;
use cookie::time::Duration;
use cookie::{Cookie, SameSite};

use crate::config::ServerConfig;

/// Name of the access token cookie.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
/// Name of the refresh token cookie.
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Build the access token cookie (max-age = access TTL).
pub fn access_token_cookie(token: String, config: &ServerConfig) -> Cookie<'static> {
    auth_cookie(
        ACCESS_TOKEN_COOKIE,
        token,
        config.jwt.access_token_expiry_secs,
        config.cookie_secure,
    )
}

/// Build the refresh token cookie (max-age = refresh TTL).
pub fn refresh_token_cookie(token: String, config: &ServerConfig) -> Cookie<'static> {
    auth_cookie(
        REFRESH_TOKEN_COOKIE,
        token,
        config.jwt.refresh_token_expiry_secs,
        config.cookie_secure,
    )
}

/// Add both credential cookies to the jar.
pub fn set_auth_cookies(
    jar: CookieJar,
    access_token: String,
    refresh_token: String,
    config: &ServerConfig,
) -> CookieJar {
    jar.add(access_token_cookie(access_token, config))
        .add(refresh_token_cookie(refresh_token, config))
}

/// Clear both credential cookies by re-setting them with max-age 0.
pub fn clear_auth_cookies(jar: CookieJar, config: &ServerConfig) -> CookieJar {
    jar.add(expired_cookie(ACCESS_TOKEN_COOKIE, config.cookie_secure))
        .add(expired_cookie(REFRESH_TOKEN_COOKIE, config.cookie_secure))
}

fn auth_cookie(name: &'static str, value: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(max_age_secs))
        .build()
}

fn expired_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    Cookie::build((name, ""))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtConfig;

    fn test_server_config() -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec![],
            request_timeout_secs: 30,
            shutdown_timeout_secs: 30,
            cookie_secure: false,
            jwt: JwtConfig {
                secret: "test-secret".to_string(),
                access_token_expiry_secs: 900,
                refresh_token_expiry_secs: 604_800,
            },
        }
    }

    #[test]
    fn test_access_cookie_attributes() {
        let config = test_server_config();
        let cookie = access_token_cookie("tok".to_string(), &config);

        assert_eq!(cookie.name(), "accessToken");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(900)));
    }

    #[test]
    fn test_refresh_cookie_lives_seven_days() {
        let config = test_server_config();
        let cookie = refresh_token_cookie("tok".to_string(), &config);

        assert_eq!(cookie.name(), "refreshToken");
        assert_eq!(cookie.max_age(), Some(Duration::seconds(604_800)));
    }

    #[test]
    fn test_clear_resets_both_with_zero_max_age() {
        let config = test_server_config();
        let jar = clear_auth_cookies(CookieJar::new(), &config);

        for name in [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE] {
            let cookie = jar.get(name).expect("cleared cookie must be present");
            assert_eq!(cookie.value(), "");
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        }
    }

    #[test]
    fn test_secure_flag_follows_config() {
        let mut config = test_server_config();
        config.cookie_secure = true;
        let cookie = access_token_cookie("tok".to_string(), &config);
        assert_eq!(cookie.secure(), Some(true));
    }
}
