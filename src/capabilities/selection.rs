//! Agent selection strategies.
//!
//! When several agents declare the same capability, a [`SelectionStrategy`]
//! picks the one that receives the invocation. Strategies only see the
//! candidate list, so swapping one never touches the registry.

use std::fmt;
use std::sync::Arc;

use super::capability::AgentRegistration;

/// Picks one agent out of the candidates declaring a capability.
///
/// `candidates` is in registry iteration order and is never empty when the
/// router calls this. Returning `None` for a non-empty list is reported to
/// the caller as `RouteError::NoSelection`, not as an unroutable capability.
pub trait SelectionStrategy: Send + Sync + fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn select<'a>(
        &self,
        capability: &str,
        candidates: &'a [Arc<AgentRegistration>],
    ) -> Option<&'a Arc<AgentRegistration>>;
}

/// First match in registry iteration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstRegistered;

impl SelectionStrategy for FirstRegistered {
    fn name(&self) -> &str {
        "first-registered"
    }

    fn select<'a>(
        &self,
        _capability: &str,
        candidates: &'a [Arc<AgentRegistration>],
    ) -> Option<&'a Arc<AgentRegistration>> {
        candidates.first()
    }
}
