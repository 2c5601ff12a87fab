//! Stateless per-request session check.
//!
//! A request moves through `NoCredential → AccessChecked` and ends in
//! `Authorized` or `Denied`, possibly by way of `NeedsRefresh`:
//!
//! 1. No access token, or one that fails for any reason other than expiry:
//!    denied.
//! 2. Valid access token: authorized, nothing reissued.
//! 3. Expired access token: look at the refresh token. Missing or invalid
//!    for any reason (its own expiry included): denied.
//! 4. Valid refresh token: a new pair is minted for the same subject and
//!    the request is authorized.

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::trace;

use super::claims::TokenClass;
use super::tokens::{SessionTokenPair, TokenIssuer};
use super::{AuthError, TokenError};
use crate::models::auth::UserId;

/// States of the session check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoCredential,
    AccessChecked,
    NeedsRefresh,
    Authorized,
    Denied,
}

/// Why a session was denied. Logged, never sent to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    NoAccessToken,
    AccessRejected(TokenError),
    NoRefreshToken,
    RefreshRejected(TokenError),
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::NoAccessToken => f.write_str("no access token"),
            DenyReason::AccessRejected(e) => write!(f, "access token rejected: {e}"),
            DenyReason::NoRefreshToken => f.write_str("access token expired and no refresh token"),
            DenyReason::RefreshRejected(e) => write!(f, "refresh token rejected: {e}"),
        }
    }
}

/// Outcome of a successful check.
#[derive(Debug, Clone)]
pub struct SessionCheck {
    pub subject: UserId,
    /// Present when the access token had expired and a new pair was minted.
    pub renewed: Option<SessionTokenPair>,
}

/// Run the session check for one request.
///
/// Returns `AuthError::Denied` for every rejection. Any other error means
/// minting the replacement pair failed and is a server fault.
pub fn check_session(
    issuer: &TokenIssuer,
    access: Option<&str>,
    refresh: Option<&str>,
    now: DateTime<Utc>,
) -> Result<SessionCheck, AuthError> {
    let mut state = SessionState::NoCredential;

    let Some(access) = access else {
        return deny(state, DenyReason::NoAccessToken);
    };
    state = transition(state, SessionState::AccessChecked);

    match issuer.verify(access, TokenClass::Access, now) {
        Ok(claims) => {
            transition(state, SessionState::Authorized);
            return Ok(SessionCheck {
                subject: claims.subject,
                renewed: None,
            });
        }
        Err(TokenError::Expired) => {
            state = transition(state, SessionState::NeedsRefresh);
        }
        Err(e) => return deny(state, DenyReason::AccessRejected(e)),
    }

    let Some(refresh) = refresh else {
        return deny(state, DenyReason::NoRefreshToken);
    };
    let claims = match issuer.verify(refresh, TokenClass::Refresh, now) {
        Ok(claims) => claims,
        Err(e) => return deny(state, DenyReason::RefreshRejected(e)),
    };

    let pair = issuer.issue_pair(claims.subject, now)?;
    transition(state, SessionState::Authorized);
    Ok(SessionCheck {
        subject: claims.subject,
        renewed: Some(pair),
    })
}

fn transition(from: SessionState, to: SessionState) -> SessionState {
    trace!(?from, ?to, "session state");
    to
}

fn deny(from: SessionState, reason: DenyReason) -> Result<SessionCheck, AuthError> {
    transition(from, SessionState::Denied);
    Err(AuthError::Denied(reason))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::auth::tokens::SessionSettings;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(b"session-test-secret", SessionSettings::default())
    }

    fn denied(result: Result<SessionCheck, AuthError>) -> DenyReason {
        match result {
            Err(AuthError::Denied(reason)) => reason,
            other => panic!("expected denial, got {other:?}"),
        }
    }

    #[test]
    fn valid_access_authorizes_without_renewal() {
        let issuer = issuer();
        let now = Utc::now();
        let pair = issuer.issue_pair(5, now).unwrap();
        let check = check_session(&issuer, Some(&pair.access.token), None, now).unwrap();
        assert_eq!(check.subject, 5);
        assert!(check.renewed.is_none());
    }

    #[test]
    fn no_cookies_is_denied() {
        let issuer = issuer();
        assert_eq!(
            denied(check_session(&issuer, None, None, Utc::now())),
            DenyReason::NoAccessToken
        );
    }

    #[test]
    fn refresh_alone_is_denied() {
        let issuer = issuer();
        let now = Utc::now();
        let pair = issuer.issue_pair(5, now).unwrap();
        assert_eq!(
            denied(check_session(&issuer, None, Some(&pair.refresh.token), now)),
            DenyReason::NoAccessToken
        );
    }

    #[test]
    fn expired_access_with_valid_refresh_renews() {
        let issuer = issuer();
        let now = Utc::now();
        let pair = issuer.issue_pair(5, now).unwrap();
        let later = now + Duration::minutes(20);

        let check = check_session(
            &issuer,
            Some(&pair.access.token),
            Some(&pair.refresh.token),
            later,
        )
        .unwrap();
        assert_eq!(check.subject, 5);
        let renewed = check.renewed.expect("new pair");
        assert_eq!(renewed.subject(), 5);
        assert_ne!(renewed.access.token, pair.access.token);
        assert!(issuer.verify(&renewed.access.token, TokenClass::Access, later).is_ok());
        assert!(renewed.access.claims.expires_at > later);
    }

    #[test]
    fn expired_access_without_refresh_is_denied() {
        let issuer = issuer();
        let now = Utc::now();
        let pair = issuer.issue_pair(5, now).unwrap();
        let later = now + Duration::minutes(20);
        assert_eq!(
            denied(check_session(&issuer, Some(&pair.access.token), None, later)),
            DenyReason::NoRefreshToken
        );
    }

    #[test]
    fn expired_access_and_expired_refresh_is_denied() {
        let issuer = issuer();
        let now = Utc::now();
        let pair = issuer.issue_pair(5, now).unwrap();
        let much_later = now + Duration::days(31);
        assert_eq!(
            denied(check_session(
                &issuer,
                Some(&pair.access.token),
                Some(&pair.refresh.token),
                much_later,
            )),
            DenyReason::RefreshRejected(TokenError::Expired)
        );
    }

    #[test]
    fn expired_access_and_garbage_refresh_is_denied() {
        let issuer = issuer();
        let now = Utc::now();
        let pair = issuer.issue_pair(5, now).unwrap();
        let later = now + Duration::minutes(20);
        let reason = denied(check_session(
            &issuer,
            Some(&pair.access.token),
            Some("garbage"),
            later,
        ));
        assert!(matches!(
            reason,
            DenyReason::RefreshRejected(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn expired_access_and_access_in_refresh_slot_is_denied() {
        let issuer = issuer();
        let now = Utc::now();
        let old = issuer.issue_pair(5, now).unwrap();
        let later = now + Duration::minutes(20);
        let fresh = issuer.issue_pair(5, later).unwrap();
        let reason = denied(check_session(
            &issuer,
            Some(&old.access.token),
            Some(&fresh.access.token),
            later,
        ));
        assert!(matches!(
            reason,
            DenyReason::RefreshRejected(TokenError::ClassMismatch { .. })
        ));
    }

    #[test]
    fn corrupted_access_is_denied_even_with_valid_refresh() {
        let issuer = issuer();
        let now = Utc::now();
        let pair = issuer.issue_pair(5, now).unwrap();
        let reason = denied(check_session(
            &issuer,
            Some("\u{1}\u{2}not-a-token"),
            Some(&pair.refresh.token),
            now,
        ));
        assert!(matches!(
            reason,
            DenyReason::AccessRejected(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn refresh_token_in_access_slot_is_denied() {
        let issuer = issuer();
        let now = Utc::now();
        let pair = issuer.issue_pair(5, now).unwrap();
        let reason = denied(check_session(
            &issuer,
            Some(&pair.refresh.token),
            Some(&pair.refresh.token),
            now,
        ));
        assert!(matches!(
            reason,
            DenyReason::AccessRejected(TokenError::ClassMismatch { .. })
        ));
    }

    #[test]
    fn token_from_other_secret_is_denied() {
        let ours = issuer();
        let theirs = TokenIssuer::new(b"someone-else", SessionSettings::default());
        let now = Utc::now();
        let pair = theirs.issue_pair(5, now).unwrap();
        assert_eq!(
            denied(check_session(&ours, Some(&pair.access.token), None, now)),
            DenyReason::AccessRejected(TokenError::SignatureInvalid)
        );
    }
}
