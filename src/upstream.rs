use crate::errors::AppError;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Failure of a single upstream call.
///
/// A closed set of variants so callers branch on exactly these cases
/// instead of inspecting response shapes at runtime.
#[derive(Debug)]
pub enum CallError {
    /// The service replied with a non-2xx status.
    Status { status: StatusCode, body: String },
    /// The request never produced an HTTP response (DNS, connect, timeout).
    Transport(reqwest::Error),
    /// The service replied 2xx but the body was not valid JSON.
    Decode(reqwest::Error),
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::Status { status, body } => {
                write!(f, "upstream returned {}: {}", status, body)
            }
            CallError::Transport(e) => write!(f, "upstream unreachable: {}", e),
            CallError::Decode(e) => write!(f, "failed to parse upstream body: {}", e),
        }
    }
}

/// Parsed 2xx reply from an upstream service.
#[derive(Debug)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Value,
}

/// Shared async HTTP wrapper for all upstream calls.
///
/// Holds no per-call state; clones share the same connection pool and are
/// safe to use across concurrent lookups. Never retries.
#[derive(Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
}

impl UpstreamClient {
    pub fn new() -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::InternalError(format!("Failed to create upstream HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    /// Performs one request and settles it into a parsed body or a typed
    /// failure. `form` is urlencoded into the request body when present.
    pub async fn call(
        &self,
        method: Method,
        url: Url,
        form: Option<&[(String, String)]>,
    ) -> Result<UpstreamReply, CallError> {
        let mut request = self.client.request(method, url);
        if let Some(fields) = form {
            request = request.form(fields);
        }

        let response = request.send().await.map_err(CallError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CallError::Status { status, body });
        }

        let body: Value = response.json().await.map_err(CallError::Decode)?;
        Ok(UpstreamReply { status, body })
    }

    pub async fn get(&self, url: Url) -> Result<UpstreamReply, CallError> {
        self.call(Method::GET, url, None).await
    }

    pub async fn post_form(
        &self,
        url: Url,
        form: &[(String, String)],
    ) -> Result<UpstreamReply, CallError> {
        self.call(Method::POST, url, Some(form)).await
    }
}
