//! Signed session claims (HS256 JWT) and signing-secret resolution.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{AuthError, TokenError};
use crate::models::auth::UserId;

/// Signing algorithm. Part of the wire contract with already-issued cookies.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Which cookie slot a token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenClass {
    Access,
    Refresh,
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenClass::Access => f.write_str("access"),
            TokenClass::Refresh => f.write_str("refresh"),
        }
    }
}

/// Decoded session claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub subject: UserId,
    pub class: TokenClass,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Unique per issued token.
    pub token_id: Uuid,
}

impl Claims {
    /// Expired when `expires_at <= now`. No skew allowance.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// JWT payload as it appears on the wire.
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    /// Subject: user id as a decimal string (standard JWT `sub`).
    sub: String,
    /// Token class.
    cls: TokenClass,
    /// Issued at (unix timestamp).
    iat: i64,
    /// Expiry (unix timestamp).
    exp: i64,
    /// Token id.
    jti: String,
}

impl From<&Claims> for WireClaims {
    fn from(claims: &Claims) -> Self {
        Self {
            sub: claims.subject.to_string(),
            cls: claims.class,
            iat: claims.issued_at.timestamp(),
            exp: claims.expires_at.timestamp(),
            jti: claims.token_id.to_string(),
        }
    }
}

impl TryFrom<WireClaims> for Claims {
    type Error = TokenError;

    fn try_from(wire: WireClaims) -> Result<Self, Self::Error> {
        let subject: UserId = wire
            .sub
            .parse()
            .map_err(|_| TokenError::Malformed("subject is not a user id".into()))?;
        if subject == 0 {
            return Err(TokenError::Malformed("subject is zero".into()));
        }
        let issued_at = DateTime::from_timestamp(wire.iat, 0)
            .ok_or_else(|| TokenError::Malformed("iat out of range".into()))?;
        let expires_at = DateTime::from_timestamp(wire.exp, 0)
            .ok_or_else(|| TokenError::Malformed("exp out of range".into()))?;
        let token_id = Uuid::parse_str(&wire.jti)
            .map_err(|_| TokenError::Malformed("jti is not a uuid".into()))?;
        Ok(Self {
            subject,
            class: wire.cls,
            issued_at,
            expires_at,
            token_id,
        })
    }
}

/// Encodes and verifies claims with a shared HMAC secret.
#[derive(Clone)]
pub struct ClaimsCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl ClaimsCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        // Expiry is checked against the caller's clock in `decode`.
        validation.validate_exp = false;
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign claims into a compact JWT.
    pub fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(
            &Header::new(SIGNING_ALGORITHM),
            &WireClaims::from(claims),
            &self.encoding,
        )
        .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
    }

    /// Verify signature and structure, then expiry against `now`.
    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let claims = self.verify_signed(token)?;
        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// Like [`decode`](Self::decode), but the token must also be of `class`.
    ///
    /// A token from the wrong slot is rejected before its expiry is looked at.
    pub fn decode_class(
        &self,
        token: &str,
        class: TokenClass,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        let claims = self.verify_signed(token)?;
        if claims.class != class {
            return Err(TokenError::ClassMismatch {
                expected: class,
                found: claims.class,
            });
        }
        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    fn verify_signed(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<WireClaims>(token, &self.decoding, &self.validation)
            .map_err(classify_jwt_error)?;
        Claims::try_from(data.claims)
    }
}

impl fmt::Debug for ClaimsCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimsCodec").finish_non_exhaustive()
    }
}

fn classify_jwt_error(e: jsonwebtoken::errors::Error) -> TokenError {
    match e.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::SignatureInvalid,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed(e.to_string()),
    }
}

/// Resolve the signing secret from `JWT_SECRET_KEY`, then `JWT_SECRET`, then a
/// generated secret persisted in the data dir.
pub fn resolve_jwt_secret() -> String {
    for var in ["JWT_SECRET_KEY", "JWT_SECRET"] {
        if let Ok(secret) = std::env::var(var)
            && !secret.is_empty()
        {
            return secret;
        }
    }
    // Generate and persist
    let secret_path = jwt_secret_path();
    if let Ok(existing) = std::fs::read_to_string(&secret_path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    if let Some(parent) = secret_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = std::fs::write(&secret_path, &secret);
    info!(path = %secret_path.display(), "generated new JWT secret");
    secret
}

/// Path to the persisted signing secret.
fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("keeper")
        .join("jwt-secret")
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn claims(class: TokenClass, now: DateTime<Utc>, ttl: Duration) -> Claims {
        let issued_at = DateTime::from_timestamp(now.timestamp(), 0).unwrap();
        Claims {
            subject: 42,
            class,
            issued_at,
            expires_at: issued_at + ttl,
            token_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn decode_reproduces_encoded_claims() {
        let codec = ClaimsCodec::new(b"test-secret");
        let now = Utc::now();
        let original = claims(TokenClass::Refresh, now, Duration::days(30));
        let token = codec.encode(&original).unwrap();
        let decoded = codec.decode(&token, now).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn expiry_is_exclusive_with_zero_skew() {
        let codec = ClaimsCodec::new(b"test-secret");
        let now = Utc::now();
        let original = claims(TokenClass::Access, now, Duration::minutes(15));
        let token = codec.encode(&original).unwrap();

        let just_before = original.expires_at - Duration::seconds(1);
        assert!(codec.decode(&token, just_before).is_ok());
        assert_eq!(
            codec.decode(&token, original.expires_at),
            Err(TokenError::Expired)
        );
        assert_eq!(
            codec.decode(&token, original.expires_at + Duration::seconds(1)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn other_secret_is_signature_invalid() {
        let ours = ClaimsCodec::new(b"secret-one");
        let theirs = ClaimsCodec::new(b"secret-two");
        let now = Utc::now();
        let token = theirs
            .encode(&claims(TokenClass::Access, now, Duration::minutes(15)))
            .unwrap();
        assert_eq!(ours.decode(&token, now), Err(TokenError::SignatureInvalid));
    }

    #[test]
    fn signature_is_checked_before_expiry() {
        let ours = ClaimsCodec::new(b"secret-one");
        let theirs = ClaimsCodec::new(b"secret-two");
        let now = Utc::now();
        let token = theirs
            .encode(&claims(TokenClass::Access, now, Duration::minutes(15)))
            .unwrap();
        let later = now + Duration::hours(1);
        assert_eq!(ours.decode(&token, later), Err(TokenError::SignatureInvalid));
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = ClaimsCodec::new(b"test-secret");
        let now = Utc::now();
        for junk in ["", "abc", "a.b.c", "\u{0}\u{1}\u{2}", "not a jwt at all"] {
            assert!(
                matches!(codec.decode(junk, now), Err(TokenError::Malformed(_))),
                "expected malformed for {junk:?}"
            );
        }
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let codec = ClaimsCodec::new(b"test-secret");
        let now = Utc::now();
        let token = codec
            .encode(&claims(TokenClass::Access, now, Duration::minutes(15)))
            .unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let other = codec
            .encode(&Claims {
                subject: 1,
                ..claims(TokenClass::Access, now, Duration::minutes(15))
            })
            .unwrap();
        let other_payload = other.split('.').nth(1).unwrap().to_string();
        parts[1] = &other_payload;
        let forged = parts.join(".");
        assert_eq!(codec.decode(&forged, now), Err(TokenError::SignatureInvalid));
    }

    #[test]
    fn decode_class_rejects_wrong_slot() {
        let codec = ClaimsCodec::new(b"test-secret");
        let now = Utc::now();
        let token = codec
            .encode(&claims(TokenClass::Refresh, now, Duration::days(30)))
            .unwrap();
        assert_eq!(
            codec.decode_class(&token, TokenClass::Access, now),
            Err(TokenError::ClassMismatch {
                expected: TokenClass::Access,
                found: TokenClass::Refresh,
            })
        );
        assert!(codec.decode_class(&token, TokenClass::Refresh, now).is_ok());
    }

    #[test]
    fn class_mismatch_wins_over_expiry() {
        let codec = ClaimsCodec::new(b"test-secret");
        let now = Utc::now();
        let token = codec
            .encode(&claims(TokenClass::Refresh, now, Duration::minutes(1)))
            .unwrap();
        let later = now + Duration::hours(1);
        assert!(matches!(
            codec.decode_class(&token, TokenClass::Access, later),
            Err(TokenError::ClassMismatch { .. })
        ));
    }

    #[test]
    fn zero_subject_is_malformed() {
        let codec = ClaimsCodec::new(b"test-secret");
        let now = Utc::now();
        let token = codec
            .encode(&Claims {
                subject: 0,
                ..claims(TokenClass::Access, now, Duration::minutes(15))
            })
            .unwrap();
        assert!(matches!(codec.decode(&token, now), Err(TokenError::Malformed(_))));
    }
}
