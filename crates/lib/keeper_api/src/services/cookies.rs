//! Cookie transport: set/read/clear the httpOnly session cookies.
//!
//! Cookie names: `access-token`, `refresh-token`. Both are scoped to the
//! API path and live exactly as long as the token they carry.

use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::header::SET_COOKIE;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use keeper_core::auth::claims::TokenClass;
use keeper_core::auth::tokens::SessionTokenPair;
use time::Duration;

use crate::error::{AppError, AppResult};

/// Cookie name for the access token.
pub const ACCESS_COOKIE: &str = "access-token";
/// Cookie name for the refresh token.
pub const REFRESH_COOKIE: &str = "refresh-token";
/// Path both cookies are scoped to.
pub const COOKIE_PATH: &str = "/api";

/// Cookie attributes that vary by deployment.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub path: String,
    pub secure: bool,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            path: COOKIE_PATH.to_string(),
            secure: false,
        }
    }
}

/// Cookie name for a token class.
pub fn cookie_name(class: TokenClass) -> &'static str {
    match class {
        TokenClass::Access => ACCESS_COOKIE,
        TokenClass::Refresh => REFRESH_COOKIE,
    }
}

fn build(name: &str, value: String, max_age_secs: i64, settings: &CookieSettings) -> Cookie<'static> {
    Cookie::build((name.to_string(), value))
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Lax)
        .path(settings.path.clone())
        .max_age(Duration::seconds(max_age_secs))
        .build()
}

/// The two cookies carrying `pair`, access first.
pub fn session_cookies(pair: &SessionTokenPair, settings: &CookieSettings) -> [Cookie<'static>; 2] {
    [TokenClass::Access, TokenClass::Refresh].map(|class| {
        let issued = pair.get(class);
        build(cookie_name(class), issued.token.clone(), issued.ttl_secs(), settings)
    })
}

/// Add the session cookies to a jar returned from a handler.
pub fn attach_to_jar(jar: CookieJar, pair: &SessionTokenPair, settings: &CookieSettings) -> CookieJar {
    session_cookies(pair, settings)
        .into_iter()
        .fold(jar, |jar, cookie| jar.add(cookie))
}

/// Append `Set-Cookie` headers for `pair` to an outgoing response.
pub fn attach(
    headers: &mut HeaderMap,
    pair: &SessionTokenPair,
    settings: &CookieSettings,
) -> AppResult<()> {
    for cookie in session_cookies(pair, settings) {
        let value = HeaderValue::from_str(&cookie.to_string())
            .map_err(|e| AppError::Internal(format!("set-cookie header: {e}")))?;
        headers.append(SET_COOKIE, value);
    }
    Ok(())
}

/// Read the token for `class`. `None` means no credential was offered.
pub fn extract(jar: &CookieJar, class: TokenClass) -> Option<String> {
    jar.get(cookie_name(class))
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Expire both cookies on the client.
pub fn clear(jar: CookieJar, settings: &CookieSettings) -> CookieJar {
    [ACCESS_COOKIE, REFRESH_COOKIE]
        .into_iter()
        .fold(jar, |jar, name| jar.add(build(name, String::new(), 0, settings)))
}
