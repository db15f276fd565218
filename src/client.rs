//! Orchestrator client.
//!
//! Used by agent processes to register themselves and by callers to invoke
//! capabilities without talking HTTP directly.

use std::time::Duration;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::capabilities::RegistrationRequest;
use crate::router::InvocationRequest;
use crate::security::API_KEY_HEADER;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client-side errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The orchestrator answered with a non-success status.
    #[error("orchestrator rejected request with HTTP {status}: {error}")]
    Rejected { status: u16, error: String },
}

impl ClientError {
    /// HTTP status for rejections.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// Acknowledgement returned by `POST /register`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAck {
    pub message: String,
    pub agent_id: String,
}

/// Async client for the orchestrator HTTP API.
#[derive(Debug, Clone)]
pub struct OrchestratorClient {
    base_url: String,
    api_key: Option<String>,
    http: reqwest::Client,
}

impl OrchestratorClient {
    /// Create a client with the default timeout.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET /health.
    pub async fn health(&self) -> Result<Value, ClientError> {
        let resp = self.http.get(self.url("/health")).send().await?;
        Self::decode(resp).await
    }

    /// Register (or re-register) an agent.
    pub async fn register(&self, request: &RegistrationRequest) -> Result<RegisterAck, ClientError> {
        log::debug!("Registering agent '{}' at {}", request.agent_id, self.base_url);
        self.post_json("/register", request).await
    }

    /// Invoke a capability and return the response body.
    pub async fn invoke(&self, request: &InvocationRequest) -> Result<Value, ClientError> {
        log::debug!(
            "Invoking '{}' (messageId={}) at {}",
            request.capability,
            request.message_id,
            self.base_url
        );
        self.post_json("/message", request).await
    }

    async fn post_json<T, R>(&self, path: &str, body: &T) -> Result<R, ClientError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut req = self.http.post(self.url(path)).json(body);
        if let Some(ref key) = self.api_key {
            req = req.header(API_KEY_HEADER, key.as_str());
        }
        let resp = req.send().await?;
        Self::decode(resp).await
    }

    async fn decode<R: DeserializeOwned>(resp: reqwest::Response) -> Result<R, ClientError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let error = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                error,
            });
        }
        Ok(resp.json().await?)
    }
}
