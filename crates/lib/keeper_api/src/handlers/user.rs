//! User registration, login and session request handlers.

use axum::extract::State;
use axum::{Extension, Json};
use axum_extra::extract::cookie::CookieJar;
use keeper_core::auth::claims::TokenClass;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::session::AuthenticatedUser;
use crate::models::{LoginRequest, LogoutResponse, RegisterRequest, UserInfo};
use crate::services::auth::{self, Authenticated};
use crate::services::cookies;

fn signed_in(state: &AppState, jar: CookieJar, auth: Authenticated) -> (CookieJar, Json<UserInfo>) {
    let jar = cookies::attach_to_jar(jar, &auth.tokens, &state.config.cookie_settings());
    (jar, Json(UserInfo::from(auth.identity)))
}

/// `POST /api/user/register`: create an account and set session cookies.
pub async fn register_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RegisterRequest>,
) -> AppResult<(CookieJar, Json<UserInfo>)> {
    let auth = auth::register(&state, &body.login, &body.password).await?;
    Ok(signed_in(&state, jar, auth))
}

/// `POST /api/user/login`: authenticate and set session cookies.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<UserInfo>)> {
    let auth = auth::login(&state, &body.login, &body.password).await?;
    Ok(signed_in(&state, jar, auth))
}

/// `POST /api/user/refresh`: trade the refresh cookie for a new pair.
pub async fn refresh_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<UserInfo>)> {
    let token = cookies::extract(&jar, TokenClass::Refresh);
    let auth = auth::refresh(&state, token.as_deref()).await?;
    Ok(signed_in(&state, jar, auth))
}

/// `POST /api/user/logout`: expire both cookies on the client.
///
/// Tokens already handed out stay valid until they expire.
pub async fn logout_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<LogoutResponse>) {
    let jar = cookies::clear(jar, &state.config.cookie_settings());
    (jar, Json(LogoutResponse { success: true }))
}

/// `GET /api/user/me`: the signed-in user.
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
) -> AppResult<Json<UserInfo>> {
    let identity = state.directory.find_by_id(user_id).await?;
    Ok(Json(UserInfo::from(identity)))
}
