//! Agent transport — delivers forwarded invocations to agent endpoints.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::errors::TransportError;
use super::invocation::ForwardEnvelope;

/// Longest agent error body kept in a [`TransportError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Sends one envelope to one agent endpoint.
///
/// Implementations make a single attempt; the router never retries.
#[async_trait]
pub trait AgentTransport: Send + Sync {
    async fn deliver(&self, endpoint: &str, envelope: &ForwardEnvelope)
        -> Result<Value, TransportError>;
}

/// JSON-over-HTTP transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport whose requests are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl AgentTransport for HttpTransport {
    async fn deliver(
        &self,
        endpoint: &str,
        envelope: &ForwardEnvelope,
    ) -> Result<Value, TransportError> {
        log::debug!(
            "POST {} (capability={}, messageId={})",
            endpoint,
            envelope.capability,
            envelope.message_id
        );

        let resp = self
            .client
            .post(endpoint)
            .header("Accept", "application/json")
            .json(envelope)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(self.timeout.as_millis() as u64)
                } else {
                    TransportError::Unreachable(e.to_string())
                }
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(self.timeout.as_millis() as u64)
            } else {
                TransportError::InvalidResponse(e.to_string())
            }
        })?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: truncate(body, MAX_ERROR_BODY),
            });
        }

        parse_body(body)
    }
}

/// Agents should answer JSON; anything else is passed through as a string.
fn parse_body(body: String) -> Result<Value, TransportError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
}

fn truncate(mut body: String, max: usize) -> String {
    if body.len() > max {
        let mut cut = max;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push('…');
    }
    body
}
