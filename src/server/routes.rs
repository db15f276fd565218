//! Axum route handlers for the orchestrator HTTP server.
//!
//! # Routes
//!
//! - `GET  /health`   — Liveness probe (unauthenticated)
//! - `POST /register` — Register or replace an agent's capabilities
//! - `POST /message`  — Invoke a capability
//! - `GET  /agents`   — List registrations in iteration order

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::auth::require_api_key;
use super::error::ApiError;
use crate::capabilities::{CapabilityRegistry, RegistrationRequest};
use crate::config::OrchestratorConfig;
use crate::router::{CapabilityRouter, HttpTransport, InvocationRequest, RouteOutcome, TransportError};
use crate::security::ApiKeyGate;

/// Shared application state for the HTTP server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The process-wide registry; the router holds the same instance.
    pub registry: Arc<CapabilityRegistry>,
    pub router: Arc<CapabilityRouter>,
    pub gate: ApiKeyGate,
}

impl AppState {
    pub fn new(router: CapabilityRouter, gate: ApiKeyGate) -> Self {
        Self {
            registry: Arc::clone(router.registry()),
            router: Arc::new(router),
            gate,
        }
    }

    /// Build a fresh registry, an HTTP-forwarding router and the gate.
    pub fn from_config(config: &OrchestratorConfig) -> Result<Self, TransportError> {
        let registry = Arc::new(CapabilityRegistry::new());
        let transport = HttpTransport::new(config.forward_timeout)?;
        let router = CapabilityRouter::new(registry, Arc::new(transport))
            .with_forward_timeout(config.forward_timeout)
            .with_dispatch_mode(config.dispatch_mode);
        Ok(Self::new(router, ApiKeyGate::new(config.api_keys.clone())))
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/register", post(register_handler))
        .route("/message", post(message_handler))
        .route("/agents", get(list_agents_handler))
        .route_layer(middleware::from_fn_with_state(
            state.gate.clone(),
            require_api_key,
        ))
        // Unauthenticated routes (added after the layer).
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /health — liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "agent-orchestrator",
    }))
}

/// POST /register — register or replace an agent.
///
/// Request:  `{ "agentId", "capabilities": [{ "name", "description", ... }], "endpoint" }`
/// Response: `201 { "message", "agentId" }`
async fn register_handler(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(body) = body.map_err(|e| ApiError::MalformedBody(e.body_text()))?;
    let request = RegistrationRequest::from_value(body)?;
    let agent_id = request.agent_id.clone();

    let outcome = state.registry.register(request)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": outcome.message(),
            "agentId": agent_id,
        })),
    ))
}

/// POST /message — invoke a capability.
///
/// Request: `{ "messageId", "capability", "payload" }`
async fn message_handler(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::MalformedBody(e.body_text()))?;
    let request = InvocationRequest::from_value(body)?;

    let outcome = state.router.route(request).await?;
    Ok(Json(outcome_body(outcome)))
}

/// Response body for a routed invocation.
///
/// Inline results are returned as-is; forwarded and announced outcomes are
/// wrapped with the correlation fields.
fn outcome_body(outcome: RouteOutcome) -> Value {
    match outcome {
        RouteOutcome::Inline { result, .. } => result,
        RouteOutcome::Forwarded {
            message_id,
            capability,
            agent_id,
            response,
        } => json!({
            "messageId": message_id,
            "capability": capability,
            "agentId": agent_id,
            "result": response,
        }),
        RouteOutcome::Announced {
            message_id,
            capability,
            agents,
        } => json!({
            "message": format!("Found {} agent(s) with capability: {}", agents.len(), capability),
            "messageId": message_id,
            "capability": capability,
            "agentCount": agents.len(),
            "agents": agents,
        }),
    }
}

/// GET /agents — list registrations.
async fn list_agents_handler(State(state): State<AppState>) -> Json<Value> {
    let agents: Vec<Value> = state
        .registry
        .list()
        .iter()
        .map(|r| serde_json::to_value(r.as_ref()).unwrap_or(Value::Null))
        .collect();

    Json(json!({
        "count": agents.len(),
        "agents": agents,
        "inlineCapabilities": state.router.inline_capabilities().names(),
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::DispatchMode;
    use crate::security::{ApiKeySet, API_KEY_HEADER};
    use axum::body::Body;
    use axum::http::Request;
    use std::time::Duration;
    use tower::ServiceExt;

    const KEY: &str = "test-key";

    fn test_state() -> AppState {
        test_state_with(ApiKeySet::new([KEY]), DispatchMode::Forward)
    }

    fn test_state_with(keys: ApiKeySet, mode: DispatchMode) -> AppState {
        let config = OrchestratorConfig {
            api_keys: keys,
            forward_timeout: Duration::from_secs(2),
            dispatch_mode: mode,
            ..Default::default()
        };
        AppState::from_config(&config).unwrap()
    }

    fn post_json(uri: &str, body: Value, key: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json");
        if let Some(key) = key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = app_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    fn registration(agent_id: &str, capability: &str, endpoint: &str) -> Value {
        json!({
            "agentId": agent_id,
            "capabilities": [{ "name": capability, "description": "test capability" }],
            "endpoint": endpoint,
        })
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let state = test_state();
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, json) = send(&state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::VERSION);
    }

    #[tokio::test]
    async fn test_register_returns_created() {
        let state = test_state();
        let (status, json) = send(
            &state,
            post_json("/register", registration("a1", "x", "http://localhost:9/cb"), Some(KEY)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["agentId"], "a1");
        assert_eq!(json["message"], "Agent registered successfully");
        assert_eq!(state.registry.len(), 1);

        let (status, json) = send(
            &state,
            post_json("/register", registration("a1", "y", "http://localhost:9/cb"), Some(KEY)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["message"], "Agent registration replaced");
        assert!(state.registry.find_by_capability("x").is_empty());
    }

    #[tokio::test]
    async fn test_register_missing_endpoint_is_bad_request() {
        let state = test_state();
        let mut body = registration("a1", "x", "http://localhost:9/cb");
        body.as_object_mut().unwrap().remove("endpoint");

        let (status, json) = send(&state, post_json("/register", body, Some(KEY))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("endpoint"));
        assert_eq!(state.registry.len(), 0);
    }

    #[tokio::test]
    async fn test_register_empty_capabilities_is_bad_request() {
        let state = test_state();
        let body = json!({ "agentId": "a1", "capabilities": [], "endpoint": "http://h/cb" });
        let (status, _) = send(&state, post_json("/register", body, Some(KEY))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(state.registry.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let state = test_state();
        let request = Request::builder()
            .method("POST")
            .uri("/register")
            .header("Content-Type", "application/json")
            .header(API_KEY_HEADER, KEY)
            .body(Body::from("{ not json"))
            .unwrap();
        let (status, json) = send(&state, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().starts_with("Malformed request body"));
    }

    #[tokio::test]
    async fn test_unknown_capability_is_not_found() {
        let state = test_state();
        let body = json!({ "messageId": "m1", "capability": "unknown-thing", "payload": {} });
        let (status, json) = send(&state, post_json("/message", body, Some(KEY))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            json,
            json!({ "error": "No agents found with capability: unknown-thing" })
        );
    }

    #[tokio::test]
    async fn test_inline_blog_writing_without_text_is_bad_request() {
        let state = test_state();
        let body = json!({
            "messageId": "m1",
            "capability": "enhanced-blog-writing",
            "payload": { "notes": "wrong field" }
        });
        let (status, json) = send(&state, post_json("/message", body, Some(KEY))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("text"));
        assert!(state.registry.is_empty());
    }

    #[tokio::test]
    async fn test_inline_blog_writing_returns_result_directly() {
        let state = test_state();
        let body = json!({
            "messageId": "m1",
            "capability": "enhanced-blog-writing",
            "payload": { "text": "first day" }
        });
        let (status, json) = send(&state, post_json("/message", body, Some(KEY))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({ "blog_post": "<h2>Blog Post</h2><p>first day</p>" }));
    }

    #[tokio::test]
    async fn test_unreachable_agent_is_forwarding_failure() {
        let state = test_state();
        let (status, _) = send(
            &state,
            post_json(
                "/register",
                registration("a1", "photo-metadata", "http://localhost:9/cb"),
                Some(KEY),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let body = json!({ "messageId": "m1", "capability": "photo-metadata", "payload": {} });
        let (status, json) = send(&state, post_json("/message", body, Some(KEY))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["agentId"], "a1");
        assert!(json["error"].as_str().unwrap().contains("'a1'"));
        assert_eq!(state.registry.len(), 1, "failing agent stays registered");
    }

    #[tokio::test]
    async fn test_announce_mode_reports_candidates() {
        let state = test_state_with(ApiKeySet::new([KEY]), DispatchMode::Announce);
        for id in ["a2", "a1"] {
            send(
                &state,
                post_json("/register", registration(id, "x", "http://localhost:9/cb"), Some(KEY)),
            )
            .await;
        }

        let body = json!({ "messageId": "m1", "capability": "x", "payload": {} });
        let (status, json) = send(&state, post_json("/message", body, Some(KEY))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["messageId"], "m1");
        assert_eq!(json["capability"], "x");
        assert_eq!(json["agentCount"], 2);
        assert_eq!(json["agents"], json!(["a2", "a1"]));
        assert!(json["message"].is_string());
    }

    #[tokio::test]
    async fn test_missing_key_is_unauthorized() {
        let state = test_state();
        // Valid payload, no key.
        let body = json!({ "messageId": "m1", "capability": "echo", "payload": {} });
        let (status, json) = send(&state, post_json("/message", body, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "Missing API key");

        // Invalid payload, no key: still 401.
        let (status, _) = send(&state, post_json("/message", json!("garbage"), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_key_is_forbidden() {
        let state = test_state();
        let (status, _) = send(
            &state,
            post_json("/register", registration("a1", "x", "http://h/cb"), Some("wrong")),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(state.registry.is_empty());
    }

    #[tokio::test]
    async fn test_no_configured_keys_is_server_error() {
        let state = test_state_with(ApiKeySet::default(), DispatchMode::Forward);
        let body = json!({ "messageId": "m1", "capability": "echo", "payload": {} });
        let (status, json) = send(&state, post_json("/message", body, Some(KEY))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"].as_str().unwrap().contains("misconfigured"));

        // Health stays reachable.
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, _) = send(&state, request).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_agents_in_registration_order() {
        let state = test_state();
        for id in ["b", "a"] {
            send(
                &state,
                post_json("/register", registration(id, "x", "http://h/cb"), Some(KEY)),
            )
            .await;
        }

        let request = Request::builder()
            .uri("/agents")
            .header(API_KEY_HEADER, KEY)
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(&state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["count"], 2);
        assert_eq!(json["agents"][0]["agentId"], "b");
        assert_eq!(json["agents"][1]["agentId"], "a");
        assert_eq!(json["agents"][0]["capabilities"][0]["name"], "x");
        assert!(json["agents"][0]["registeredAt"].is_string());
        assert_eq!(json["inlineCapabilities"], json!(["echo", "enhanced-blog-writing"]));
    }
}
