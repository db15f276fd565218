//! Routing error types.

use thiserror::Error;

/// Errors surfaced by [`CapabilityRouter::route`](super::CapabilityRouter::route).
///
/// None of these are fatal; each one is reported for the single invocation
/// that produced it and the router keeps serving.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The invocation request itself was malformed.
    #[error("Invalid invocation: {0}")]
    InvalidInvocation(String),

    /// No inline handler and no registered agent declares the capability.
    #[error("No agents found with capability: {capability}")]
    Unroutable { capability: String },

    /// An inline handler rejected the payload.
    #[error("Invalid payload for '{capability}': {message}")]
    InvalidPayload { capability: String, message: String },

    /// An inline handler failed after accepting the payload.
    #[error("Inline capability '{capability}' failed: {message}")]
    InlineFailure { capability: String, message: String },

    /// Agents declare the capability but the selection strategy picked none.
    #[error("Selection strategy '{strategy}' chose no agent for capability '{capability}' ({candidates} candidates)")]
    NoSelection {
        capability: String,
        strategy: String,
        candidates: usize,
    },

    /// The selected agent was unreachable, timed out, or answered with an error.
    #[error("Forwarding to agent '{agent_id}' failed: {message}")]
    ForwardingFailure { agent_id: String, message: String },
}

impl RouteError {
    /// The agent a forwarding failure is attributed to.
    pub fn agent_id(&self) -> Option<&str> {
        match self {
            Self::ForwardingFailure { agent_id, .. } => Some(agent_id),
            _ => None,
        }
    }

    pub(crate) fn from_inline(capability: &str, error: InlineError) -> Self {
        match error {
            InlineError::InvalidPayload(message) => Self::InvalidPayload {
                capability: capability.to_string(),
                message,
            },
            InlineError::Failed(message) => Self::InlineFailure {
                capability: capability.to_string(),
                message,
            },
        }
    }
}

/// Errors returned by inline capability handlers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InlineError {
    #[error("{0}")]
    InvalidPayload(String),

    #[error("{0}")]
    Failed(String),
}

/// Errors from delivering an envelope to an agent endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("agent endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("agent responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("timed out after {0}ms")]
    Timeout(u64),

    #[error("invalid agent response: {0}")]
    InvalidResponse(String),

    #[error("HTTP client setup failed: {0}")]
    Client(String),
}
