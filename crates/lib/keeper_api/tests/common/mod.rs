//! Shared harness: in-memory stores, a manual clock and a fixed secret.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, Response, StatusCode};
use keeper_api::config::ApiConfig;
use keeper_api::{AppState, router};
use keeper_core::auth::clock::ManualClock;
use keeper_core::auth::tokens::SessionSettings;
use tower::ServiceExt;

pub const ACCESS: &str = "access-token";
pub const REFRESH: &str = "refresh-token";

pub fn test_config(secret: &str) -> ApiConfig {
    ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        pg_connection_url: String::new(),
        jwt_secret: secret.into(),
        session: SessionSettings::default(),
        cookie_secure: false,
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_secret("integration-test-secret")
    }

    pub fn with_secret(secret: &str) -> Self {
        Self::with_config(test_config(secret))
    }

    pub fn with_config(config: ApiConfig) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("keeper_api=debug,keeper_core=debug")
            .try_init();
        let clock = Arc::new(ManualClock::default());
        let state = AppState::in_memory(config).with_clock(clock.clone());
        Self {
            router: router(state.clone()),
            state,
            clock,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        TestResponse::read(response).await
    }

    /// Register `login`/`password` and return the session cookies.
    pub async fn register(&self, login: &str, password: &str) -> HashMap<String, String> {
        let resp = self
            .send(json_request(
                Method::POST,
                "/api/user/register",
                serde_json::json!({"login": login, "password": password}),
                &[],
            ))
            .await;
        assert_eq!(resp.status, StatusCode::OK, "register failed: {:?}", resp.json);
        resp.set_cookies
    }

    pub async fn login(&self, login: &str, password: &str) -> TestResponse {
        self.send(json_request(
            Method::POST,
            "/api/user/login",
            serde_json::json!({"login": login, "password": password}),
            &[],
        ))
        .await
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    /// Cookie name → value for every `Set-Cookie` on the response.
    pub set_cookies: HashMap<String, String>,
    /// Raw `Set-Cookie` header values.
    pub set_cookie_headers: Vec<String>,
    pub json: serde_json::Value,
}

impl TestResponse {
    async fn read(response: Response<Body>) -> Self {
        let status = response.status();
        let set_cookie_headers: Vec<String> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().expect("ascii set-cookie").to_string())
            .collect();
        let set_cookies = set_cookie_headers
            .iter()
            .filter_map(|h| {
                let pair = h.split(';').next()?;
                let (name, value) = pair.split_once('=')?;
                Some((name.trim().to_string(), value.trim().to_string()))
            })
            .collect();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        Self {
            status,
            set_cookies,
            set_cookie_headers,
            json,
        }
    }
}

fn cookie_header(cookies: &[(&str, &str)]) -> Option<String> {
    if cookies.is_empty() {
        return None;
    }
    Some(
        cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; "),
    )
}

pub fn request(method: Method, uri: &str, cookies: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(header) = cookie_header(cookies) {
        builder = builder.header(COOKIE, header);
    }
    builder.body(Body::empty()).expect("valid request")
}

pub fn json_request(
    method: Method,
    uri: &str,
    body: serde_json::Value,
    cookies: &[(&str, &str)],
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(header) = cookie_header(cookies) {
        builder = builder.header(COOKIE, header);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("valid request")
}
