//! API key middleware.
//!
//! Applied as a `route_layer`, so it only guards the routes registered
//! before it. Rejected requests never reach the registry or router.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::error::ApiError;
use crate::security::{ApiKeyGate, GateDecision, API_KEY_HEADER};

/// Reject requests without a valid `x-api-key` header.
pub async fn require_api_key(
    State(gate): State<ApiKeyGate>,
    request: Request,
    next: Next,
) -> Response {
    // A header that is not valid UTF-8 cannot match any key.
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .map(|v| v.to_str().unwrap_or("\u{0}"));

    match gate.check(presented) {
        GateDecision::Allow => next.run(request).await,
        GateDecision::Missing => {
            log::warn!("Rejected {} {}: missing API key", request.method(), request.uri().path());
            ApiError::MissingApiKey.into_response()
        }
        GateDecision::Invalid => {
            log::warn!("Rejected {} {}: invalid API key", request.method(), request.uri().path());
            ApiError::InvalidApiKey.into_response()
        }
        GateDecision::Misconfigured => {
            log::error!(
                "Rejected {} {}: no API keys configured (set ORCHESTRATOR_API_KEYS)",
                request.method(),
                request.uri().path()
            );
            ApiError::ServerMisconfigured.into_response()
        }
    }
}
