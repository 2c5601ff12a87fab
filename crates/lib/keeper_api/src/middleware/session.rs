//! Session middleware: cookie extraction, token verification and silent
//! renewal in front of every protected route.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use keeper_core::auth::claims::TokenClass;
use keeper_core::auth::session::check_session;
use keeper_core::models::auth::UserId;
use tracing::debug;

use crate::AppState;
use crate::error::AppError;
use crate::services::cookies;

/// Request extension carrying the authenticated subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

/// Axum middleware: reads the `access-token`/`refresh-token` cookies, runs
/// the session check, and injects `AuthenticatedUser` into request
/// extensions.
///
/// When the access token had expired but the refresh token was good, the
/// handler runs as normal and the response gains a freshly minted pair of
/// cookies.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let access = cookies::extract(&jar, TokenClass::Access);
    let refresh = cookies::extract(&jar, TokenClass::Refresh);

    let check = check_session(
        &state.issuer,
        access.as_deref(),
        refresh.as_deref(),
        state.now(),
    )?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser(check.subject));

    let mut response = next.run(request).await;

    if let Some(pair) = check.renewed {
        debug!(user_id = check.subject, "access token renewed");
        cookies::attach(response.headers_mut(), &pair, &state.config.cookie_settings())?;
    }

    Ok(response)
}
