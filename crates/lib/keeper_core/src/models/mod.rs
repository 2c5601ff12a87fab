//! Domain models shared by the API and the stores.

pub mod auth;
pub mod records;
