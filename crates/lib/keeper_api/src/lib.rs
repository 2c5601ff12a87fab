//! # keeper_api
//!
//! HTTP API library for Keeper.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use chrono::{DateTime, Utc};
use keeper_core::auth::clock::{Clock, SystemClock};
use keeper_core::auth::tokens::TokenIssuer;
use keeper_core::directory::{MemoryUserDirectory, PgUserDirectory, UserDirectory};
use keeper_core::records::{MemoryRecordStore, PgRecordStore, RecordStore};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{data, health, user};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// User lookup and creation.
    pub directory: Arc<dyn UserDirectory>,
    /// Secret records.
    pub records: Arc<dyn RecordStore>,
    /// Session token issuer, keyed with `config.jwt_secret`.
    pub issuer: TokenIssuer,
    /// Time source for issuance and expiry.
    pub clock: Arc<dyn Clock>,
    /// API configuration.
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(
        config: ApiConfig,
        directory: Arc<dyn UserDirectory>,
        records: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            directory,
            records,
            issuer: TokenIssuer::new(config.jwt_secret.as_bytes(), config.session),
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// State backed by PostgreSQL.
    pub fn postgres(config: ApiConfig, pool: PgPool) -> Self {
        Self::new(
            config,
            Arc::new(PgUserDirectory::new(pool.clone())),
            Arc::new(PgRecordStore::new(pool)),
        )
    }

    /// State that keeps users and records in process memory.
    pub fn in_memory(config: ApiConfig) -> Self {
        Self::new(
            config,
            Arc::new(MemoryUserDirectory::new()),
            Arc::new(MemoryRecordStore::new()),
        )
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

/// Run embedded database migrations.
///
/// Delegates to `keeper_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    keeper_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    // Public routes (no session required)
    let public = Router::new()
        .route(routes::GET_API_HEALTH, get(health::health))
        .route(routes::POST_USER_REGISTER, post(user::register_handler))
        .route(routes::POST_USER_LOGIN, post(user::login_handler))
        .route(routes::POST_USER_REFRESH, post(user::refresh_handler))
        .route(routes::POST_USER_LOGOUT, post(user::logout_handler));

    // Protected routes (session cookies required)
    let protected = Router::new()
        .route(routes::GET_USER_ME, get(user::me_handler))
        .route(
            routes::DATA,
            get(data::list_handler).post(data::create_handler),
        )
        .route(
            routes::DATA_ID,
            get(data::read_handler)
                .put(data::update_handler)
                .delete(data::delete_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::session::require_session,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
