//! Access/refresh token pair issuance.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::AuthError;
use super::TokenError;
use super::claims::{Claims, ClaimsCodec, TokenClass};
use crate::models::auth::UserId;

/// Access token lifetime: 15 minutes.
pub const ACCESS_TOKEN_EXPIRY_SECS: i64 = 15 * 60;

/// Refresh token lifetime: 30 days.
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 30;

/// Token lifetimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            access_ttl: Duration::seconds(ACCESS_TOKEN_EXPIRY_SECS),
            refresh_ttl: Duration::days(REFRESH_TOKEN_EXPIRY_DAYS),
        }
    }
}

impl SessionSettings {
    pub fn ttl(&self, class: TokenClass) -> Duration {
        match class {
            TokenClass::Access => self.access_ttl,
            TokenClass::Refresh => self.refresh_ttl,
        }
    }
}

/// A signed token together with its decoded claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

impl IssuedToken {
    /// Seconds the token stays valid after issuance.
    pub fn ttl_secs(&self) -> i64 {
        (self.claims.expires_at - self.claims.issued_at).num_seconds()
    }
}

/// One access and one refresh token for the same subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

impl SessionTokenPair {
    pub fn subject(&self) -> UserId {
        self.access.claims.subject
    }

    pub fn get(&self, class: TokenClass) -> &IssuedToken {
        match class {
            TokenClass::Access => &self.access,
            TokenClass::Refresh => &self.refresh,
        }
    }
}

/// Mints token pairs. Pure computation over the codec and settings; it
/// records nothing, so there is nothing to revoke.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    codec: ClaimsCodec,
    settings: SessionSettings,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], settings: SessionSettings) -> Self {
        Self {
            codec: ClaimsCodec::new(secret),
            settings,
        }
    }

    /// Issue a fresh access/refresh pair for `user_id` as of `now`.
    pub fn issue_pair(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<SessionTokenPair, AuthError> {
        if user_id == 0 {
            return Err(AuthError::Internal("refusing to issue tokens for user 0".into()));
        }
        Ok(SessionTokenPair {
            access: self.issue(user_id, TokenClass::Access, now)?,
            refresh: self.issue(user_id, TokenClass::Refresh, now)?,
        })
    }

    /// Verify a token read from the `class` slot.
    pub fn verify(
        &self,
        token: &str,
        class: TokenClass,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        self.codec.decode_class(token, class, now)
    }

    fn issue(
        &self,
        user_id: UserId,
        class: TokenClass,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        // JWT timestamps are whole seconds; truncate so the claims we hand
        // back match what a later decode produces.
        let issued_at = DateTime::from_timestamp(now.timestamp(), 0)
            .ok_or_else(|| AuthError::Internal("clock out of range".into()))?;
        let expires_at = issued_at
            .checked_add_signed(self.settings.ttl(class))
            .ok_or_else(|| AuthError::Internal(format!("{class} token expiry out of range")))?;
        let claims = Claims {
            subject: user_id,
            class,
            issued_at,
            expires_at,
            token_id: Uuid::new_v4(),
        };
        let token = self.codec.encode(&claims)?;
        Ok(IssuedToken { token, claims })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(b"issuer-test-secret", SessionSettings::default())
    }

    #[test]
    fn pair_has_one_token_per_class_for_same_subject() {
        let now = Utc::now();
        let pair = issuer().issue_pair(7, now).unwrap();
        assert_eq!(pair.access.claims.class, TokenClass::Access);
        assert_eq!(pair.refresh.claims.class, TokenClass::Refresh);
        assert_eq!(pair.access.claims.subject, 7);
        assert_eq!(pair.refresh.claims.subject, 7);
        assert_eq!(pair.subject(), 7);
    }

    #[test]
    fn ttls_follow_settings() {
        let settings = SessionSettings {
            access_ttl: Duration::minutes(5),
            refresh_ttl: Duration::days(2),
        };
        let pair = TokenIssuer::new(b"s", settings)
            .issue_pair(1, Utc::now())
            .unwrap();
        assert_eq!(pair.access.ttl_secs(), 5 * 60);
        assert_eq!(pair.refresh.ttl_secs(), 2 * 24 * 60 * 60);
        assert!(pair.access.claims.expires_at < pair.refresh.claims.expires_at);
    }

    #[test]
    fn issued_tokens_verify_in_their_own_slot_only() {
        let issuer = issuer();
        let now = Utc::now();
        let pair = issuer.issue_pair(3, now).unwrap();

        let access = issuer.verify(&pair.access.token, TokenClass::Access, now).unwrap();
        assert_eq!(access, pair.access.claims);
        let refresh = issuer.verify(&pair.refresh.token, TokenClass::Refresh, now).unwrap();
        assert_eq!(refresh, pair.refresh.claims);

        assert!(matches!(
            issuer.verify(&pair.refresh.token, TokenClass::Access, now),
            Err(TokenError::ClassMismatch { .. })
        ));
        assert!(matches!(
            issuer.verify(&pair.access.token, TokenClass::Refresh, now),
            Err(TokenError::ClassMismatch { .. })
        ));
    }

    #[test]
    fn repeated_issuance_yields_independent_valid_pairs() {
        let issuer = issuer();
        let now = Utc::now();
        let first = issuer.issue_pair(9, now).unwrap();
        let second = issuer.issue_pair(9, now).unwrap();
        assert_ne!(first.access.token, second.access.token);
        assert_ne!(first.refresh.token, second.refresh.token);
        for pair in [&first, &second] {
            assert!(issuer.verify(&pair.access.token, TokenClass::Access, now).is_ok());
            assert!(issuer.verify(&pair.refresh.token, TokenClass::Refresh, now).is_ok());
        }
    }

    #[test]
    fn access_expires_before_refresh() {
        let issuer = issuer();
        let now = Utc::now();
        let pair = issuer.issue_pair(2, now).unwrap();
        let later = now + Duration::minutes(16);
        assert_eq!(
            issuer.verify(&pair.access.token, TokenClass::Access, later),
            Err(TokenError::Expired)
        );
        assert!(issuer.verify(&pair.refresh.token, TokenClass::Refresh, later).is_ok());
    }

    #[test]
    fn oversized_ttl_is_an_error_not_a_panic() {
        let settings = SessionSettings {
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::seconds(10_000_000_000_000),
        };
        let result = TokenIssuer::new(b"s", settings).issue_pair(1, Utc::now());
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }

    #[test]
    fn user_zero_is_refused() {
        assert!(issuer().issue_pair(0, Utc::now()).is_err());
    }
}
