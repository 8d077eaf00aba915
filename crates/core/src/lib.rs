//! Shared domain types for the dentapp backend.
//!
//! Kept deliberately small: ID/timestamp aliases, the domain error
//! taxonomy, and the clinic role enum. Everything else lives in the
//! `dentapp-db` and `dentapp-api` crates.

pub mod error;
pub mod roles;
pub mod types;
