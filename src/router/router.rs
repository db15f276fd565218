//! CapabilityRouter — resolves an invocation to an inline handler or an agent.
//!
//! Each invocation is resolved independently:
//! 1. Inline capability? Run the local handler; the registry is not consulted.
//! 2. Otherwise look up every agent declaring the capability.
//!    None → `Unroutable`.
//! 3. Select one agent with the configured strategy and forward
//!    `{capability, payload, messageId}` to its endpoint, bounded by the
//!    forward timeout. No retry, no fan-out, no deregistration on failure.

use std::sync::Arc;
use std::time::Duration;

use super::errors::{RouteError, TransportError};
use super::inline::InlineCapabilities;
use super::invocation::{DispatchMode, ForwardEnvelope, InvocationRequest, RouteOutcome};
use super::transport::AgentTransport;
use crate::capabilities::{CapabilityRegistry, FirstRegistered, SelectionStrategy};

/// Default bound on a forwarded call.
pub const DEFAULT_FORWARD_TIMEOUT: Duration = Duration::from_secs(10);

/// Routes invocations to inline handlers or registered agents.
pub struct CapabilityRouter {
    registry: Arc<CapabilityRegistry>,
    inline: InlineCapabilities,
    transport: Arc<dyn AgentTransport>,
    strategy: Arc<dyn SelectionStrategy>,
    forward_timeout: Duration,
    mode: DispatchMode,
}

impl std::fmt::Debug for CapabilityRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRouter")
            .field("inline", &self.inline)
            .field("strategy", &self.strategy.name())
            .field("forward_timeout", &self.forward_timeout)
            .field("mode", &self.mode)
            .finish()
    }
}

impl CapabilityRouter {
    /// Create a router with the built-in inline capabilities, first-registered
    /// selection, forward dispatch, and the default timeout.
    pub fn new(registry: Arc<CapabilityRegistry>, transport: Arc<dyn AgentTransport>) -> Self {
        Self {
            registry,
            inline: InlineCapabilities::with_builtins(),
            transport,
            strategy: Arc::new(FirstRegistered),
            forward_timeout: DEFAULT_FORWARD_TIMEOUT,
            mode: DispatchMode::Forward,
        }
    }

    /// Replace the inline capability set.
    pub fn with_inline(mut self, inline: InlineCapabilities) -> Self {
        self.inline = inline;
        self
    }

    /// Replace the agent selection strategy.
    pub fn with_strategy(mut self, strategy: Arc<dyn SelectionStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_forward_timeout(mut self, timeout: Duration) -> Self {
        self.forward_timeout = timeout;
        self
    }

    pub fn with_dispatch_mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    pub fn inline_capabilities(&self) -> &InlineCapabilities {
        &self.inline
    }

    pub fn dispatch_mode(&self) -> DispatchMode {
        self.mode
    }

    pub fn forward_timeout(&self) -> Duration {
        self.forward_timeout
    }

    /// Route one invocation.
    pub async fn route(&self, request: InvocationRequest) -> Result<RouteOutcome, RouteError> {
        if let Some(handler) = self.inline.get(&request.capability) {
            log::debug!(
                "Message {} handled inline by '{}'",
                request.message_id,
                request.capability
            );
            let result = handler
                .handle(&request.payload)
                .await
                .map_err(|e| RouteError::from_inline(&request.capability, e))?;
            return Ok(RouteOutcome::Inline {
                message_id: request.message_id,
                capability: request.capability,
                result,
            });
        }

        // Arcs are cloned out of the registry; no lock is held past this point.
        let candidates = self.registry.find_by_capability(&request.capability);
        if candidates.is_empty() {
            log::info!(
                "No agents found with capability '{}' (message {})",
                request.capability,
                request.message_id
            );
            return Err(RouteError::Unroutable {
                capability: request.capability,
            });
        }

        if self.mode == DispatchMode::Announce {
            return Ok(RouteOutcome::Announced {
                message_id: request.message_id,
                capability: request.capability,
                agents: candidates.iter().map(|r| r.agent_id.clone()).collect(),
            });
        }

        let target = self
            .strategy
            .select(&request.capability, &candidates)
            .cloned()
            .ok_or_else(|| {
                log::error!(
                    "Strategy '{}' chose no agent for '{}' out of {} candidates",
                    self.strategy.name(),
                    request.capability,
                    candidates.len()
                );
                RouteError::NoSelection {
                    capability: request.capability.clone(),
                    strategy: self.strategy.name().to_string(),
                    candidates: candidates.len(),
                }
            })?;

        log::debug!(
            "Message {} for '{}' routed to agent '{}' ({} of {} candidates, strategy={})",
            request.message_id,
            request.capability,
            target.agent_id,
            candidates
                .iter()
                .position(|c| Arc::ptr_eq(c, &target))
                .map_or(0, |p| p + 1),
            candidates.len(),
            self.strategy.name()
        );

        let envelope = ForwardEnvelope::from(request);
        let delivery = tokio::time::timeout(
            self.forward_timeout,
            self.transport.deliver(&target.endpoint, &envelope),
        )
        .await
        .unwrap_or_else(|_| {
            Err(TransportError::Timeout(
                self.forward_timeout.as_millis() as u64,
            ))
        });

        match delivery {
            Ok(response) => Ok(RouteOutcome::Forwarded {
                message_id: envelope.message_id,
                capability: envelope.capability,
                agent_id: target.agent_id.clone(),
                response,
            }),
            Err(e) => {
                log::warn!(
                    "Forwarding message {} to agent '{}' at {} failed: {}",
                    envelope.message_id,
                    target.agent_id,
                    target.endpoint,
                    e
                );
                Err(RouteError::ForwardingFailure {
                    agent_id: target.agent_id.clone(),
                    message: e.to_string(),
                })
            }
        }
    }
}
