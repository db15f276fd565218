//! HTTP rendering of registry, router and gate errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::capabilities::RegistryError;
use crate::router::RouteError;

/// Every failure a handler or the gate can report.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Missing API key")]
    MissingApiKey,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Server misconfigured: no API keys configured")]
    ServerMisconfigured,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Registry(RegistryError::InvalidRegistration(_)) => StatusCode::BAD_REQUEST,
            Self::Route(err) => match err {
                RouteError::InvalidInvocation(_) | RouteError::InvalidPayload { .. } => {
                    StatusCode::BAD_REQUEST
                }
                RouteError::Unroutable { .. } => StatusCode::NOT_FOUND,
                RouteError::InlineFailure { .. }
                | RouteError::NoSelection { .. }
                | RouteError::ForwardingFailure { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Self::MissingApiKey => StatusCode::UNAUTHORIZED,
            Self::InvalidApiKey => StatusCode::FORBIDDEN,
            Self::ServerMisconfigured => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// `{ "error": ... }`, plus `agentId` for forwarding failures.
    pub fn body(&self) -> Value {
        let mut body = json!({ "error": self.to_string() });
        if let Self::Route(err) = self {
            if let Some(agent_id) = err.agent_id() {
                body["agentId"] = Value::String(agent_id.to_string());
            }
        }
        body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
