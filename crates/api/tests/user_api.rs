//! HTTP-level integration tests for the `/user` resource: registration,
//! profile access, lookups, and admin account management.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, cookies_from, delete_with_cookies, get, get_with_cookies, post_json,
    put_json_with_cookies,
};
use dentapp_api::auth::password::hash_password;
use dentapp_core::roles::UserRole;
use dentapp_db::models::user::CreateUser;
use dentapp_db::repositories::UserRepo;
use sqlx::PgPool;

const TEST_PASSWORD: &str = "test_password_123!";

/// Insert a user directly and log them in, returning the cookie header.
async fn seed_and_login(pool: &PgPool, username: &str, role: UserRole) -> String {
    let input = CreateUser {
        username: username.to_string(),
        email: format!("{username}@clinic.test"),
        password_hash: hash_password(TEST_PASSWORD).unwrap(),
        first_name: "Test".to_string(),
        middle_name: None,
        last_name: "User".to_string(),
        role,
    };
    UserRepo::create(pool, &input).await.unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/auth/login",
        serde_json::json!({ "username": username, "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    cookies_from(&response)
}

fn signup_body(username: &str) -> serde_json::Value {
    serde_json::json!({
        "username": username,
        "email": format!("{username}@clinic.test"),
        "password": "a-decent-password",
        "firstName": "New",
        "lastName": "Hire",
        "role": "STAFF",
    })
}

/// Signup creates the account (201) and the new user can log in.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_signup_then_login(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/user/signup", signup_body("newhire")).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["username"], "newhire");
    assert_eq!(body["role"], "STAFF");
    assert_eq!(body["isActive"], true);
    assert!(
        body.get("passwordHash").is_none(),
        "password hash must never be serialized"
    );

    let app = common::build_test_app(pool.clone());
    let login = post_json(
        app,
        "/auth/login",
        serde_json::json!({ "username": "newhire", "password": "a-decent-password" }),
    )
    .await;
    assert_eq!(login.status(), StatusCode::OK);

    // The stored hash is the strong format, never the legacy digest.
    let user = UserRepo::find_by_username(&pool, "newhire")
        .await
        .unwrap()
        .unwrap();
    assert!(user.password_hash.starts_with("$argon2id$"));
}

/// Duplicate usernames and emails are rejected with 409.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_signup_duplicates_conflict(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let first = post_json(app, "/user/signup", signup_body("dupe")).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool.clone());
    let same_username = post_json(app, "/user/signup", signup_body("dupe")).await;
    assert_eq!(same_username.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(same_username).await["message"], "Username already exists");

    let mut body = signup_body("dupe2");
    body["email"] = serde_json::json!("dupe@clinic.test");
    let app = common::build_test_app(pool.clone());
    let same_email = post_json(app, "/user/signup", body).await;
    assert_eq!(same_email.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(same_email).await["message"], "Email already exists");
}

/// Signup validation: short passwords and bad emails are 400.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_signup_validation(pool: PgPool) {
    let mut short_pw = signup_body("weakling");
    short_pw["password"] = serde_json::json!("short");
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/user/signup", short_pw).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);

    let mut bad_email = signup_body("bademail");
    bad_email["email"] = serde_json::json!("not-an-email");
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/user/signup", bad_email).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// /user/profile requires authentication and returns the caller's record.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_profile(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let unauthed = get(app, "/user/profile").await;
    assert_eq!(unauthed.status(), StatusCode::UNAUTHORIZED);

    let cookies = seed_and_login(&pool, "doc1", UserRole::Clinician).await;
    let app = common::build_test_app(pool.clone());
    let response = get_with_cookies(app, "/user/profile", &cookies).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["username"], "doc1");
    assert_eq!(body["role"], "CLINICIAN");
}

/// Lookups by id and username; unknown targets are 404.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_user_lookups(pool: PgPool) {
    let cookies = seed_and_login(&pool, "doc1", UserRole::Clinician).await;
    let doc1 = UserRepo::find_by_username(&pool, "doc1").await.unwrap().unwrap();

    let app = common::build_test_app(pool.clone());
    let by_id = get_with_cookies(app, &format!("/user/{}", doc1.id), &cookies).await;
    assert_eq!(by_id.status(), StatusCode::OK);
    assert_eq!(body_json(by_id).await["username"], "doc1");

    let app = common::build_test_app(pool.clone());
    let by_name = get_with_cookies(app, "/user/username/doc1", &cookies).await;
    assert_eq!(by_name.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let missing = get_with_cookies(app, "/user/999999", &cookies).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool.clone());
    let missing_name = get_with_cookies(app, "/user/username/nobody", &cookies).await;
    assert_eq!(missing_name.status(), StatusCode::NOT_FOUND);
}

/// Admin listings are gated: clinicians get 403, admins and superadmins 200.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_listing_gates(pool: PgPool) {
    let clinician = seed_and_login(&pool, "doc1", UserRole::Clinician).await;
    let admin = seed_and_login(&pool, "admin1", UserRole::Admin).await;
    let superadmin = seed_and_login(&pool, "root1", UserRole::Superadmin).await;

    let app = common::build_test_app(pool.clone());
    let forbidden = get_with_cookies(app, "/user/all", &clinician).await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let unauthed = get(app, "/user/all").await;
    assert_eq!(unauthed.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool.clone());
    let ok = get_with_cookies(app, "/user/all", &admin).await;
    assert_eq!(ok.status(), StatusCode::OK);
    let users = body_json(ok).await;
    assert!(users.as_array().unwrap().len() >= 3);

    let app = common::build_test_app(pool.clone());
    let root_ok = get_with_cookies(app, "/user/active", &superadmin).await;
    assert_eq!(root_ok.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let by_role = get_with_cookies(app, "/user/role/CLINICIAN", &admin).await;
    assert_eq!(by_role.status(), StatusCode::OK);
    let clinicians = body_json(by_role).await;
    assert_eq!(clinicians.as_array().unwrap().len(), 1);
    assert_eq!(clinicians[0]["username"], "doc1");
}

/// Admin update applies partial changes and enforces email uniqueness.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_update_user(pool: PgPool) {
    let admin = seed_and_login(&pool, "admin1", UserRole::Admin).await;
    let _ = seed_and_login(&pool, "doc1", UserRole::Clinician).await;
    let doc1 = UserRepo::find_by_username(&pool, "doc1").await.unwrap().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = put_json_with_cookies(
        app,
        &format!("/user/admin/{}", doc1.id),
        serde_json::json!({ "firstName": "Renamed", "role": "FACULTY" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["firstName"], "Renamed");
    assert_eq!(body["role"], "FACULTY");
    // Untouched fields survive the partial update.
    assert_eq!(body["lastName"], "User");

    // Taking another account's email is a conflict.
    let app = common::build_test_app(pool.clone());
    let conflict = put_json_with_cookies(
        app,
        &format!("/user/admin/{}", doc1.id),
        serde_json::json!({ "email": "admin1@clinic.test" }),
        &admin,
    )
    .await;
    assert_eq!(conflict.status(), StatusCode::CONFLICT);

    // Non-admins cannot update anyone.
    let clinician = seed_and_login(&pool, "doc2", UserRole::Clinician).await;
    let app = common::build_test_app(pool.clone());
    let forbidden = put_json_with_cookies(
        app,
        &format!("/user/admin/{}", doc1.id),
        serde_json::json!({ "firstName": "Nope" }),
        &clinician,
    )
    .await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
}

/// Deactivation is a soft delete: repeatable, and the account can no longer
/// log in (with the generic failure).
#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_deactivate_user(pool: PgPool) {
    let admin = seed_and_login(&pool, "admin1", UserRole::Admin).await;
    let _ = seed_and_login(&pool, "doc1", UserRole::Clinician).await;
    let doc1 = UserRepo::find_by_username(&pool, "doc1").await.unwrap().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = delete_with_cookies(app, &format!("/user/admin/{}", doc1.id), &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    // Repeat deactivation is a no-op success.
    let app = common::build_test_app(pool.clone());
    let again = delete_with_cookies(app, &format!("/user/admin/{}", doc1.id), &admin).await;
    assert_eq!(again.status(), StatusCode::OK);

    // Unknown target is 404.
    let app = common::build_test_app(pool.clone());
    let missing = delete_with_cookies(app, "/user/admin/999999", &admin).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    // The deactivated account cannot log in, with the generic message.
    let app = common::build_test_app(pool.clone());
    let login = post_json(
        app,
        "/auth/login",
        serde_json::json!({ "username": "doc1", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(login.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(login).await["message"],
        "Invalid username or password"
    );
}
