//! Secret record request handlers. All routes sit behind the session
//! middleware and operate on the caller's own records only.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use keeper_core::models::records::{Record, RecordInput};
use keeper_core::records::validate_input;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::session::AuthenticatedUser;
use crate::models::DataListQuery;

/// `GET /api/data?type=N`: list records, optionally of one kind.
pub async fn list_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Query(query): Query<DataListQuery>,
) -> AppResult<Json<Vec<Record>>> {
    let records = state.records.list(user_id, query.kind).await?;
    Ok(Json(records))
}

/// `POST /api/data`: store a new record.
pub async fn create_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Json(body): Json<RecordInput>,
) -> AppResult<(StatusCode, Json<Record>)> {
    validate_input(&body)?;
    let record = state.records.create(user_id, body).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /api/data/{id}`: one record.
pub async fn read_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Path(id): Path<u64>,
) -> AppResult<Json<Record>> {
    let record = state.records.find(user_id, id).await?;
    Ok(Json(record))
}

/// `PUT /api/data/{id}`: replace a record's fields.
pub async fn update_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Path(id): Path<u64>,
    Json(body): Json<RecordInput>,
) -> AppResult<Json<Record>> {
    validate_input(&body)?;
    let record = state.records.update(user_id, id, body).await?;
    Ok(Json(record))
}

/// `DELETE /api/data/{id}`: remove a record.
pub async fn delete_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Path(id): Path<u64>,
) -> AppResult<StatusCode> {
    state.records.delete(user_id, id).await?;
    Ok(StatusCode::ACCEPTED)
}
