//! Capability Registry — the authoritative store of agent registrations.
//!
//! One instance is created at process start and shared by `Arc` between the
//! router and the HTTP handlers. Each registration is stored as an immutable
//! `Arc<AgentRegistration>`; a `register` call swaps the whole entry under
//! the write lock, so readers never see a capability list from one call
//! paired with an endpoint from another.
//!
//! Iteration order is first-registration order. Replacing an existing
//! agent keeps its position; only new agent ids append.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::capability::{AgentRegistration, RegistrationRequest};
use super::errors::RegistryError;
use super::selection::{FirstRegistered, SelectionStrategy};

/// What a successful `register` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// First registration for this agent id.
    Created,
    /// An existing entry was fully replaced.
    Replaced,
    /// The identical declaration was already stored.
    Unchanged,
}

impl RegistrationOutcome {
    /// Human-readable message for API responses.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Created => "Agent registered successfully",
            Self::Replaced => "Agent registration replaced",
            Self::Unchanged => "Agent registration unchanged",
        }
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    entries: Vec<Arc<AgentRegistration>>,
    positions: HashMap<String, usize>,
}

/// In-memory registry mapping agent ids to their registrations.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    inner: RwLock<RegistryInner>,
}

impl CapabilityRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store a registration.
    ///
    /// An existing entry with the same `agentId` is replaced in full; the
    /// capability lists are never merged. On error the registry is unchanged.
    pub fn register(
        &self,
        request: RegistrationRequest,
    ) -> Result<RegistrationOutcome, RegistryError> {
        let registration = AgentRegistration::from_request(request).map_err(|e| {
            log::warn!("Rejected agent registration: {}", e);
            e
        })?;
        let agent_id = registration.agent_id.clone();

        let (outcome, previous) = {
            let mut inner = self.inner.write();
            match inner.positions.get(&agent_id).copied() {
                Some(pos) if inner.entries[pos].same_declaration(&registration) => {
                    (RegistrationOutcome::Unchanged, None)
                }
                Some(pos) => {
                    let previous = std::mem::replace(&mut inner.entries[pos], Arc::new(registration));
                    (RegistrationOutcome::Replaced, Some(previous))
                }
                None => {
                    let pos = inner.entries.len();
                    inner.entries.push(Arc::new(registration));
                    inner.positions.insert(agent_id.clone(), pos);
                    (RegistrationOutcome::Created, None)
                }
            }
        };

        match outcome {
            RegistrationOutcome::Created => {
                log::info!("Registered agent '{}'", agent_id);
            }
            RegistrationOutcome::Replaced => {
                let previous = previous.map(|p| p.capability_names().join(", "));
                log::info!(
                    "Agent '{}' re-registered; previous registration replaced (had: [{}])",
                    agent_id,
                    previous.unwrap_or_default()
                );
            }
            RegistrationOutcome::Unchanged => {
                log::info!("Agent '{}' re-registered (declaration unchanged)", agent_id);
            }
        }

        Ok(outcome)
    }

    /// All registrations declaring `capability`, in iteration order.
    ///
    /// Returns an empty vector when nothing matches.
    pub fn find_by_capability(&self, capability: &str) -> Vec<Arc<AgentRegistration>> {
        self.inner
            .read()
            .entries
            .iter()
            .filter(|r| r.declares(capability))
            .cloned()
            .collect()
    }

    /// The first-registered agent declaring `capability`, if any.
    pub fn select_one(&self, capability: &str) -> Option<Arc<AgentRegistration>> {
        self.select_with(capability, &FirstRegistered)
    }

    /// Select among the matching agents with a custom strategy.
    pub fn select_with(
        &self,
        capability: &str,
        strategy: &dyn SelectionStrategy,
    ) -> Option<Arc<AgentRegistration>> {
        let candidates = self.find_by_capability(capability);
        strategy.select(capability, &candidates).cloned()
    }

    /// Look up one agent by id.
    pub fn get(&self, agent_id: &str) -> Option<Arc<AgentRegistration>> {
        let inner = self.inner.read();
        inner
            .positions
            .get(agent_id)
            .map(|&pos| Arc::clone(&inner.entries[pos]))
    }

    /// Snapshot of every registration, in iteration order.
    pub fn list(&self) -> Vec<Arc<AgentRegistration>> {
        self.inner.read().entries.clone()
    }

    /// Number of registered agents.
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// Remove every registration. Administrative reset only.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        let removed = inner.entries.len();
        inner.entries.clear();
        inner.positions.clear();
        drop(inner);
        log::info!("Registry cleared ({} agents removed)", removed);
    }
}
