//! # Agent Orchestrator
//!
//! A message-routing façade for independently hosted agents. Agents register
//! the capabilities they can perform together with a callback endpoint;
//! callers invoke a capability by name without knowing which agent serves it.
//!
//! - [`capabilities`] — the registry of agent registrations and selection strategies
//! - [`router`] — inline capabilities, registry resolution and forwarding
//! - [`security`] — the pre-shared key gate
//! - [`server`] — the axum HTTP surface
//! - [`client`] — an async client for agents and callers
//! - [`blog`] — the blog formatter and a demo blog-writing agent

pub mod blog;
pub mod capabilities;
pub mod client;
pub mod config;
pub mod router;
pub mod security;
pub mod server;

pub use capabilities::{AgentRegistration, Capability, CapabilityRegistry, RegistrationRequest};
pub use client::OrchestratorClient;
pub use config::OrchestratorConfig;
pub use router::{CapabilityRouter, InvocationRequest, RouteError, RouteOutcome};

/// Crate version reported by `/health`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
