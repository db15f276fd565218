//! HTTP server for the orchestrator.
//!
//! Exposes the capability registry and router over HTTP. Every route except
//! the health probe sits behind the pre-shared key gate.
//!
//! # Endpoints
//!
//! - `GET  /health`   — Liveness probe
//! - `POST /register` — Agent registration
//! - `POST /message`  — Capability invocation
//! - `GET  /agents`   — Registration listing

pub mod auth;
pub mod error;
pub mod routes;

pub use error::ApiError;
pub use routes::{app_router, AppState};
