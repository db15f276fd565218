//! Orchestrator configuration, loaded from environment variables.
//!
//! # Environment Variables
//!
//! - `BIND_HOST` — interface to bind (default: `0.0.0.0`)
//! - `PORT` — HTTP port (default: 8080)
//! - `ORCHESTRATOR_API_KEYS` — comma-separated pre-shared keys
//! - `FORWARD_TIMEOUT_MS` — bound on a forwarded agent call (default: 10000)
//! - `DISPATCH_MODE` — `forward` (default) or `announce`

use std::time::Duration;

use thiserror::Error;

use crate::router::{DispatchMode, DEFAULT_FORWARD_TIMEOUT};
use crate::security::ApiKeySet;

/// Configuration errors. Raised at startup, never per request.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Runtime configuration for the orchestrator server.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub host: String,
    pub port: u16,
    /// An empty set is allowed: the server starts but answers every gated
    /// request with a misconfiguration error.
    pub api_keys: ApiKeySet,
    pub forward_timeout: Duration,
    pub dispatch_mode: DispatchMode,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            api_keys: ApiKeySet::default(),
            forward_timeout: DEFAULT_FORWARD_TIMEOUT,
            dispatch_mode: DispatchMode::Forward,
        }
    }
}

impl OrchestratorConfig {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Unset or blank values take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let host = get("BIND_HOST")
            .map(|h| h.trim().to_string())
            .unwrap_or(defaults.host);

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                key: "PORT",
                message: format!("'{}': {}", raw, e),
            })?,
            None => defaults.port,
        };

        let api_keys = get("ORCHESTRATOR_API_KEYS")
            .map(|raw| ApiKeySet::parse_list(&raw))
            .unwrap_or_default();

        let forward_timeout = match get("FORWARD_TIMEOUT_MS") {
            Some(raw) => {
                let ms = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                    key: "FORWARD_TIMEOUT_MS",
                    message: format!("'{}': {}", raw, e),
                })?;
                if ms == 0 {
                    return Err(ConfigError::Invalid {
                        key: "FORWARD_TIMEOUT_MS",
                        message: "must be greater than zero".to_string(),
                    });
                }
                Duration::from_millis(ms)
            }
            None => defaults.forward_timeout,
        };

        let dispatch_mode = match get("DISPATCH_MODE") {
            Some(raw) => raw
                .parse::<DispatchMode>()
                .map_err(|message| ConfigError::Invalid {
                    key: "DISPATCH_MODE",
                    message,
                })?,
            None => defaults.dispatch_mode,
        };

        Ok(Self {
            host,
            port,
            api_keys,
            forward_timeout,
            dispatch_mode,
        })
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<OrchestratorConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        OrchestratorConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert!(config.api_keys.is_empty());
        assert_eq!(config.forward_timeout, DEFAULT_FORWARD_TIMEOUT);
        assert_eq!(config.dispatch_mode, DispatchMode::Forward);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("BIND_HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("ORCHESTRATOR_API_KEYS", "a,b"),
            ("FORWARD_TIMEOUT_MS", "2500"),
            ("DISPATCH_MODE", "announce"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.api_keys.len(), 2);
        assert_eq!(config.forward_timeout, Duration::from_millis(2500));
        assert_eq!(config.dispatch_mode, DispatchMode::Announce);
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = load(&[("PORT", "  "), ("DISPATCH_MODE", "")]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.dispatch_mode, DispatchMode::Forward);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for (key, value) in [
            ("PORT", "eighty"),
            ("PORT", "70000"),
            ("FORWARD_TIMEOUT_MS", "0"),
            ("FORWARD_TIMEOUT_MS", "-5"),
            ("DISPATCH_MODE", "broadcast"),
        ] {
            let err = load(&[(key, value)]).unwrap_err();
            assert!(err.to_string().contains(key), "{}={} -> {}", key, value, err);
        }
    }
}
