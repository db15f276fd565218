//! A minimal agent process that writes blog posts.
//!
//! Serves `POST /callback` for invocations forwarded by the orchestrator:
//! reads `payload.text` from the envelope and answers `{ "blog_post": ... }`.

use axum::{routing::post, Json, Router};
use serde_json::Value;

use crate::capabilities::{Capability, RegistrationRequest};

/// Capability name this agent declares.
pub const BLOG_CAPABILITY: &str = "blog-writing";

/// Path the agent serves forwarded invocations on.
pub const CALLBACK_PATH: &str = "/callback";

/// Build the agent's HTTP router.
pub fn callback_router() -> Router {
    Router::new().route(CALLBACK_PATH, post(callback_handler))
}

/// The registration this agent sends to the orchestrator.
///
/// `public_url` is the base URL the orchestrator can reach the agent at.
pub fn registration_request(agent_id: &str, public_url: &str) -> RegistrationRequest {
    let endpoint = format!("{}{}", public_url.trim_end_matches('/'), CALLBACK_PATH);
    RegistrationRequest::new(
        agent_id,
        vec![Capability::new(
            BLOG_CAPABILITY,
            "Turn free-form notes into an HTML blog post",
        )],
        endpoint,
    )
}

/// POST /callback — render the forwarded notes.
async fn callback_handler(Json(envelope): Json<Value>) -> Json<Value> {
    let notes = envelope
        .get("payload")
        .and_then(|p| p.get("text"))
        .and_then(|t| t.as_str())
        .unwrap_or("");

    if let Some(message_id) = envelope.get("messageId").and_then(|m| m.as_str()) {
        log::debug!("Writing blog post for message {}", message_id);
    }

    Json(serde_json::json!({ "blog_post": super::write_blog(notes) }))
}
