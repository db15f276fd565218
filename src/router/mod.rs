//! Capability Router.
//!
//! Turns an [`InvocationRequest`] into one of:
//! - an inline result from a capability the orchestrator implements itself,
//! - a forwarded call to the agent selected from the registry,
//! - an `Unroutable` outcome when nothing declares the capability.
//!
//! Inline capabilities are checked first and cannot be shadowed by agents.

pub mod errors;
pub mod inline;
pub mod invocation;
pub mod router;
pub mod transport;

pub use errors::{InlineError, RouteError, TransportError};
pub use inline::{Echo, EnhancedBlogWriting, InlineCapabilities, InlineHandler};
pub use invocation::{DispatchMode, ForwardEnvelope, InvocationRequest, RouteOutcome};
pub use router::{CapabilityRouter, DEFAULT_FORWARD_TIMEOUT};
pub use transport::{AgentTransport, HttpTransport};
