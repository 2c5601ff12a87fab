//! Authentication and session tokens.
//!
//! Provides password hashing, the signed claims codec, the token pair
//! issuer and the stateless per-request session check. Nothing in here
//! keeps server-side session state: a token is valid exactly when its
//! signature verifies and it has not expired.

pub mod claims;
pub mod clock;
pub mod password;
pub mod session;
pub mod tokens;

use thiserror::Error;

use crate::directory::DirectoryError;
use claims::TokenClass;
use session::DenyReason;

/// Why a presented token was rejected.
///
/// The variants stay distinct for logging; the HTTP layer collapses all of
/// them into a single unauthorized response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token signature invalid")]
    SignatureInvalid,

    #[error("token malformed: {0}")]
    Malformed(String),

    #[error("token expired")]
    Expired,

    #[error("expected {expected} token, found {found}")]
    ClassMismatch {
        expected: TokenClass,
        found: TokenClass,
    },
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Session denied: {0}")]
    Denied(DenyReason),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Short stable label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Token(TokenError::SignatureInvalid) => "token_signature_invalid",
            AuthError::Token(TokenError::Malformed(_)) => "token_malformed",
            AuthError::Token(TokenError::Expired) => "token_expired",
            AuthError::Token(TokenError::ClassMismatch { .. }) => "token_class_mismatch",
            AuthError::Denied(_) => "session_denied",
            AuthError::Hashing(_) => "hashing_failure",
            AuthError::Validation(_) => "validation",
            AuthError::Directory(_) => "directory",
            AuthError::Internal(_) => "internal",
        }
    }
}
