//! Decorated HTTP client for the console backend. Every call goes through the
//! same pipeline: resolve the URL, attach authorization via the decorator,
//! send with the configured timeout, and hand the response to the
//! interceptor. Call sites receive `Result<Option<Value>, AppError>` and never
//! deal with 401 handling themselves.

use crate::api::decorator::authorization_headers;
use crate::api::interceptor::{intercept, RawResponse};
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::session::Session;
use crate::APP_USER_AGENT;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info_span, Instrument};

pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<Session>,
}

impl ApiClient {
    /// # Errors
    /// Returns `AppError::Config` if the HTTP client cannot be built.
    pub fn new(config: &AppConfig, session: Arc<Session>) -> Result<Self, AppError> {
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| AppError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim().trim_end_matches('/').to_string(),
            session,
        })
    }

    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolves `path` against the base URL. Absolute `http(s)` URLs are kept
    /// as they are, and the decorator decides whether they get a token.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        let path = path.trim();
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends one request through the decorator and the interceptor.
    ///
    /// # Errors
    /// Returns `AppError::Network`/`Timeout` when no response arrives, and the
    /// interceptor's errors otherwise.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Option<Value>, AppError> {
        let url = self.url(path);
        let generation = self.session.generation();
        let headers = authorization_headers(&self.base_url, &url, &self.session);

        let mut request = self.http.request(method.clone(), &url).headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }

        let span = info_span!("api.request", http.method = %method, url = %url);
        let response = request
            .send()
            .instrument(span)
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_request_error)?;
        debug!("{method} {url} -> {status}");

        intercept(
            &self.session,
            generation,
            RawResponse {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
                body,
            },
        )
    }

    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn get(&self, path: &str) -> Result<Option<Value>, AppError> {
        self.request(Method::GET, path, None).await
    }

    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn post(&self, path: &str, body: &Value) -> Result<Option<Value>, AppError> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn put(&self, path: &str, body: &Value) -> Result<Option<Value>, AppError> {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn delete(&self, path: &str) -> Result<Option<Value>, AppError> {
        self.request(Method::DELETE, path, None).await
    }

    /// GET and decode into `T`. An empty body is a `Parse` error.
    ///
    /// # Errors
    /// See [`ApiClient::request`]; also fails if the payload does not match `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        decode(self.get(path).await?)
    }
}

pub(crate) fn decode<T: DeserializeOwned>(payload: Option<Value>) -> Result<T, AppError> {
    let payload =
        payload.ok_or_else(|| AppError::Parse("Response body is empty.".to_string()))?;
    serde_json::from_value(payload)
        .map_err(|err| AppError::Parse(format!("Failed to decode response: {err}")))
}

/// Maps transport errors into `AppError` variants with timeout detection.
fn map_request_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::Timeout("Request timed out. Please try again.".to_string())
    } else {
        AppError::Network(format!("Unable to reach the server: {err}"))
    }
}
