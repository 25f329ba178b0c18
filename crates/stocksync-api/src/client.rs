//! REST API client
//!
//! Wraps `reqwest::Client` with the base URL, bearer authentication and a
//! request timeout, and classifies non-success responses into [`ApiError`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use reqwest::Method;
//! use stocksync_api::client::ApiClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = ApiClient::with_base_url("token", "http://localhost:3000/api");
//! let branches = client.send(Method::GET, "/branches", None).await?;
//! println!("{branches:?}");
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use stocksync_core::config::RemoteConfig;

use crate::ApiError;

/// Timeout used when none is configured
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest error body echoed into an error message
const MAX_ERROR_BODY: usize = 200;

/// HTTP client for the StockSync REST API
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Creates a client from the `remote` configuration section
    ///
    /// The token is taken from `STOCKSYNC_API_TOKEN` when set, otherwise
    /// from the file.
    pub fn from_config(config: &RemoteConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: trim_base(&config.base_url),
            token: config.resolved_token(),
        })
    }

    /// Creates a client against a custom base URL (useful for testing)
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: trim_base(&base_url.into()),
            token: Some(token.into()),
        }
    }

    /// Replaces the request timeout (rebuilds the underlying client)
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ApiError> {
        self.client = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Creates an authenticated request builder for the given method and path
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends a request with an optional JSON body and returns the parsed
    /// response body
    ///
    /// Empty bodies (e.g. `204 No Content`) yield `None`.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Option<Value>, ApiError> {
        debug!(%method, path, "Sending request");

        let mut request = self.request(method.clone(), path);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = check_status(request.send().await?).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| ApiError::InvalidResponse(format!("{method} {path}: {e}")))
    }

    /// Like [`send`](Self::send) but requires a body
    pub async fn send_expecting(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        self.send(method.clone(), path, body)
            .await?
            .ok_or_else(|| ApiError::InvalidResponse(format!("{method} {path}: empty body")))
    }
}

fn trim_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Maps non-success responses to [`ApiError`]
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    });
    warn!(status = status.as_u16(), %message, "Request rejected");

    Err(match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
        StatusCode::FORBIDDEN => ApiError::Forbidden(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            ApiError::Conflict(message)
        }
        other => ApiError::Status {
            status: other.as_u16(),
            message,
        },
    })
}

/// Extracts a human-readable message from an error body
///
/// Looks at `message`, then `error`, then `detail`; falls back to the raw
/// body, truncated.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        for key in ["message", "error", "detail"] {
            match map.get(key) {
                Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
                Some(Value::Object(inner)) => {
                    if let Some(Value::String(s)) = inner.get("message") {
                        return Some(s.clone());
                    }
                }
                _ => {}
            }
        }
    }

    Some(trimmed.chars().take(MAX_ERROR_BODY).collect())
}
