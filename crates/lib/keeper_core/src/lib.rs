//! # keeper_core
//!
//! Core domain logic for Keeper: password hashing, signed session claims,
//! the stateless session check, and the user/record stores.

pub mod auth;
pub mod directory;
pub mod migrate;
pub mod models;
pub mod records;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
