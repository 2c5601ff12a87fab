//! Authentication service: register/login/refresh flows over the user
//! directory, delegating hashing and tokens to `keeper_core::auth`.

use keeper_core::auth::AuthError;
use keeper_core::auth::claims::TokenClass;
use keeper_core::auth::password::{hash_password_blocking, verify_password_blocking};
use keeper_core::auth::session::DenyReason;
use keeper_core::auth::tokens::SessionTokenPair;
use keeper_core::directory::DirectoryError;
use keeper_core::models::auth::Identity;
use tracing::{info, warn};

use crate::AppState;
use crate::error::{AppError, AppResult};

pub use keeper_core::auth::claims::resolve_jwt_secret;

/// Login length bounds, in characters.
pub const LOGIN_MIN_CHARS: usize = 4;
pub const LOGIN_MAX_CHARS: usize = 64;
/// Password length bounds, in bytes. bcrypt only reads the first 72.
pub const PASSWORD_MIN_BYTES: usize = 6;
pub const PASSWORD_MAX_BYTES: usize = 72;

/// A user that just proved who they are, with their new cookies' tokens.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub identity: Identity,
    pub tokens: SessionTokenPair,
}

/// Check login/password shape before touching the directory.
pub fn validate_credentials(login: &str, password: &str) -> AppResult<()> {
    let login_len = login.chars().count();
    if !(LOGIN_MIN_CHARS..=LOGIN_MAX_CHARS).contains(&login_len) {
        return Err(AppError::Validation(format!(
            "login must be {LOGIN_MIN_CHARS}-{LOGIN_MAX_CHARS} characters"
        )));
    }
    if login.trim() != login {
        return Err(AppError::Validation(
            "login must not start or end with whitespace".into(),
        ));
    }
    if !(PASSWORD_MIN_BYTES..=PASSWORD_MAX_BYTES).contains(&password.len()) {
        return Err(AppError::Validation(format!(
            "password must be {PASSWORD_MIN_BYTES}-{PASSWORD_MAX_BYTES} bytes"
        )));
    }
    Ok(())
}

fn issue(state: &AppState, identity: Identity) -> AppResult<Authenticated> {
    let tokens = state.issuer.issue_pair(identity.id, state.now())?;
    Ok(Authenticated { identity, tokens })
}

/// Register a new user account and sign them in.
pub async fn register(state: &AppState, login: &str, password: &str) -> AppResult<Authenticated> {
    validate_credentials(login, password)?;

    let pw_hash = hash_password_blocking(password.to_string()).await?;
    let identity = state.directory.create(login, &pw_hash).await?;
    info!(user_id = identity.id, "user registered");

    issue(state, identity)
}

/// Authenticate with login + password.
///
/// Unknown login, wrong password and an unreadable stored hash all come
/// back as the same `Unauthorized`.
pub async fn login(state: &AppState, login: &str, password: &str) -> AppResult<Authenticated> {
    validate_credentials(login, password)?;

    let (identity, pw_hash) = match state.directory.find_by_login(login).await {
        Ok(user) => (Some(user.identity), Some(user.password_hash)),
        Err(DirectoryError::NotFound) => (None, None),
        Err(e) => return Err(e.into()),
    };

    let verified = match verify_password_blocking(password.to_string(), pw_hash).await {
        Ok(verified) => verified,
        Err(AuthError::Hashing(detail)) => {
            warn!(%detail, "stored password hash unreadable");
            false
        }
        Err(e) => return Err(e.into()),
    };

    match identity {
        Some(identity) if verified => {
            info!(user_id = identity.id, "user logged in");
            issue(state, identity)
        }
        _ => Err(AuthError::InvalidCredentials.into()),
    }
}

/// Exchange a refresh token for a fresh pair.
///
/// The subject must still exist in the directory.
pub async fn refresh(state: &AppState, refresh_token: Option<&str>) -> AppResult<Authenticated> {
    let token = refresh_token.ok_or(AuthError::Denied(DenyReason::NoRefreshToken))?;
    let claims = state
        .issuer
        .verify(token, TokenClass::Refresh, state.now())
        .map_err(|e| AuthError::Denied(DenyReason::RefreshRejected(e)))?;

    let identity = match state.directory.find_by_id(claims.subject).await {
        Ok(identity) => identity,
        Err(DirectoryError::NotFound) => return Err(AuthError::InvalidCredentials.into()),
        Err(e) => return Err(e.into()),
    };

    issue(state, identity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_bounds() {
        assert!(validate_credentials("alice", "s3cret!").is_ok());
        assert!(validate_credentials("abc", "s3cret!").is_err());
        assert!(validate_credentials("alice", "abc").is_err());
        assert!(validate_credentials(&"x".repeat(65), "s3cret!").is_err());
        assert!(validate_credentials("alice", &"p".repeat(73)).is_err());
        assert!(validate_credentials(" alice", "s3cret!").is_err());
        assert!(validate_credentials("ällö", "s3cret!").is_ok());
    }
}
