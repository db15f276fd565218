//! Registry error types.

use thiserror::Error;

/// Errors reported by the capability registry.
///
/// Lookups never fail: an unmatched capability is an empty result, not an
/// error. Only malformed registrations are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The registration was incomplete or malformed. The registry is unchanged.
    #[error("Invalid registration: {0}")]
    InvalidRegistration(String),
}

impl RegistryError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRegistration(message.into())
    }
}
