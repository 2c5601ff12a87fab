//! Request handlers.

pub mod data;
pub mod health;
pub mod user;
