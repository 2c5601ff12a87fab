//! Request and response bodies of the HTTP API.

use keeper_core::models::auth::Identity;
use keeper_core::models::records::DataType;
use serde::{Deserialize, Deserializer, Serialize};

/// JSON error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// `POST /api/user/login` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

/// `POST /api/user/register` body.
pub type RegisterRequest = LoginRequest;

/// Public view of a user; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: u64,
    pub login: String,
}

impl From<Identity> for UserInfo {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            login: identity.login,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// `GET /api/data` query string. `type=0` (unknown) means no filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataListQuery {
    #[serde(rename = "type", default, deserialize_with = "kind_filter")]
    pub kind: Option<DataType>,
}

fn kind_filter<'de, D>(deserializer: D) -> Result<Option<DataType>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<i32>::deserialize(deserializer)? {
        None | Some(0) => Ok(None),
        Some(code) => DataType::try_from(code)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use axum::extract::Query;
    use axum::http::Uri;

    use super::*;

    fn kind_of(uri: &'static str) -> Option<Option<DataType>> {
        Query::<DataListQuery>::try_from_uri(&Uri::from_static(uri))
            .ok()
            .map(|Query(q)| q.kind)
    }

    #[test]
    fn list_filter_treats_zero_as_absent() {
        assert_eq!(kind_of("/api/data"), Some(None));
        assert_eq!(kind_of("/api/data?type=0"), Some(None));
        assert_eq!(kind_of("/api/data?type=4"), Some(Some(DataType::BankCard)));
        assert_eq!(kind_of("/api/data?type=9"), None);
    }
}
