//! HTTP client for the Keeper API.
//!
//! Session cookies live in a `reqwest` cookie jar seeded from, and read
//! back into, a [`Session`]. A request answered with 401 triggers one
//! refresh-token exchange and a single retry.

use std::sync::Arc;

use keeper_api::models::{ErrorResponse, LoginRequest, UserInfo};
use keeper_api::routes;
use keeper_api::services::cookies::{ACCESS_COOKIE, COOKIE_PATH, REFRESH_COOKIE};
use keeper_core::models::records::{DataType, Record, RecordInput};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::session::Session;
use crate::{Error, Result};

pub struct KeeperClient {
    http: reqwest::Client,
    jar: Arc<Jar>,
    base: Url,
    /// URL the session cookies are scoped to.
    cookie_url: Url,
}

impl KeeperClient {
    pub fn new(server: &str, session: &Session) -> Result<Self> {
        let base = Url::parse(server)
            .map_err(|e| Error::Custom(format!("invalid server url {server:?}: {e}")))?;
        let cookie_url = join(&base, &format!("{COOKIE_PATH}/"))?;

        let jar = Arc::new(Jar::default());
        for (name, value) in [
            (ACCESS_COOKIE, &session.access),
            (REFRESH_COOKIE, &session.refresh),
        ] {
            if let Some(value) = value {
                jar.add_cookie_str(&format!("{name}={value}; Path={COOKIE_PATH}"), &cookie_url);
            }
        }

        let http = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .build()?;

        Ok(Self {
            http,
            jar,
            base,
            cookie_url,
        })
    }

    /// Cookies currently held, for persisting after the command.
    pub fn session(&self) -> Session {
        let mut session = Session::default();
        let Some(header) = self.jar.cookies(&self.cookie_url) else {
            return session;
        };
        let Ok(header) = header.to_str() else {
            return session;
        };
        for pair in header.split(';') {
            match pair.trim().split_once('=') {
                Some((ACCESS_COOKIE, value)) => session.access = Some(value.to_string()),
                Some((REFRESH_COOKIE, value)) => session.refresh = Some(value.to_string()),
                _ => {}
            }
        }
        session
    }

    pub async fn register(&self, login: &str, password: &str) -> Result<UserInfo> {
        let body = LoginRequest {
            login: login.to_string(),
            password: password.to_string(),
        };
        self.once(Method::POST, routes::POST_USER_REGISTER, Some(&body))
            .await
    }

    pub async fn login(&self, login: &str, password: &str) -> Result<UserInfo> {
        let body = LoginRequest {
            login: login.to_string(),
            password: password.to_string(),
        };
        self.once(Method::POST, routes::POST_USER_LOGIN, Some(&body))
            .await
    }

    pub async fn refresh(&self) -> Result<UserInfo> {
        self.once::<(), _>(Method::POST, routes::POST_USER_REFRESH, None)
            .await
    }

    pub async fn logout(&self) -> Result<()> {
        let _: serde_json::Value = self
            .once::<(), _>(Method::POST, routes::POST_USER_LOGOUT, None)
            .await?;
        Ok(())
    }

    pub async fn me(&self) -> Result<UserInfo> {
        self.call::<(), _>(Method::GET, routes::GET_USER_ME, &[], None)
            .await
    }

    pub async fn list(&self, kind: Option<DataType>) -> Result<Vec<Record>> {
        let query = match kind {
            Some(kind) => vec![("type", kind.code().to_string())],
            None => Vec::new(),
        };
        self.call::<(), _>(Method::GET, routes::DATA, &query, None)
            .await
    }

    pub async fn create(&self, input: &RecordInput) -> Result<Record> {
        self.call(Method::POST, routes::DATA, &[], Some(input)).await
    }

    pub async fn read(&self, id: u64) -> Result<Record> {
        self.call::<(), _>(Method::GET, &routes::data_path(id), &[], None)
            .await
    }

    pub async fn update(&self, id: u64, input: &RecordInput) -> Result<Record> {
        self.call(Method::PUT, &routes::data_path(id), &[], Some(input))
            .await
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        self.authed::<()>(Method::DELETE, &routes::data_path(id), &[], None)
            .await?;
        Ok(())
    }

    async fn call<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.authed(method, path, query, body).await?;
        Ok(response.json().await?)
    }

    /// Authenticated request: on 401, exchange the refresh cookie and retry
    /// once.
    async fn authed<B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        let response = self.send(method.clone(), path, query, body).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return check(response).await;
        }

        log::debug!("{path} rejected the session, refreshing");
        match self.refresh().await {
            Ok(_) => {}
            Err(Error::Api { status, .. }) if status == StatusCode::UNAUTHORIZED => {
                return Err(Error::Unauthorized);
            }
            Err(e) => return Err(e),
        }

        let retried = self.send(method, path, query, body).await?;
        if retried.status() == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized);
        }
        check(retried).await
    }

    /// Unauthenticated call, no retry.
    async fn once<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(method, path, &[], body).await?;
        decode(response).await
    }

    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        let url = join(&self.base, path)?;
        log::debug!("{method} {url}");
        let mut request = self.http.request(method, url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }
}

fn join(base: &Url, path: &str) -> Result<Url> {
    base.join(path)
        .map_err(|e| Error::Custom(format!("invalid path {path:?}: {e}")))
}

/// Turn a non-success status into `Error::Api` carrying the server's message.
async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let bytes = response.bytes().await?;
    let message = serde_json::from_slice::<ErrorResponse>(&bytes)
        .map(|e| e.message)
        .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
    Err(Error::Api { status, message })
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let response = check(response).await?;
    Ok(response.json().await?)
}
