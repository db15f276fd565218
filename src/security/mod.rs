//! Inbound request security.
//!
//! The orchestrator guards its endpoints with a pre-shared key checked
//! before a request reaches the registry or router. The HTTP wiring lives
//! in `server::auth`; this module only decides.

pub mod api_keys;

pub use api_keys::{ApiKeyGate, ApiKeySet, GateDecision, API_KEY_HEADER};
