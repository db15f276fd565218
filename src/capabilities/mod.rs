//! # Capability Registry
//!
//! Agents declare the capabilities they can perform together with a callback
//! endpoint. The registry keeps the current declaration per agent and answers
//! "who can do X?" lookups for the router.
//!
//! ## Resolution Flow
//!
//! 1. Agent posts `{ agentId, capabilities, endpoint }` to `/register`
//! 2. `RegistrationRequest::from_value` checks field presence and types
//! 3. `CapabilityRegistry::register` validates contents and stores or replaces the entry
//! 4. `CapabilityRegistry::find_by_capability("x")` returns every agent declaring `x`
//! 5. A `SelectionStrategy` (default [`FirstRegistered`]) picks the target

pub mod capability;
pub mod errors;
pub mod registry;
pub mod selection;

pub use capability::{AgentRegistration, Capability, RegistrationRequest};
pub use errors::RegistryError;
pub use registry::{CapabilityRegistry, RegistrationOutcome};
pub use selection::{FirstRegistered, SelectionStrategy};
