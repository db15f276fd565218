//! Capability and agent registration types.
//!
//! A registration arrives over the wire as a loosely-typed JSON document.
//! [`RegistrationRequest::from_value`] checks that the three required fields
//! are present and well-typed, and [`AgentRegistration::from_request`]
//! enforces the content rules before anything touches the registry.
//!
//! Example registration:
//! ```json
//! {
//!   "agentId": "photo-agent",
//!   "capabilities": [
//!     { "name": "photo-metadata", "description": "Extract EXIF metadata" }
//!   ],
//!   "endpoint": "http://photo-agent.internal:9000/callback"
//! }
//! ```

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::RegistryError;

/// A named unit of functionality an agent can perform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    /// Identifier, unique within one agent's declared set.
    pub name: String,

    /// Human-readable description.
    pub description: String,

    /// Advisory payload contract. Not enforced by the router.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Map<String, Value>>,

    /// Advisory result contract. Not enforced by the router.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Map<String, Value>>,
}

impl Capability {
    /// Create a capability without schemas.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: None,
            output_schema: None,
        }
    }

    /// Attach an input schema.
    pub fn with_input_schema(mut self, schema: Map<String, Value>) -> Self {
        self.input_schema = Some(schema);
        self
    }

    /// Attach an output schema.
    pub fn with_output_schema(mut self, schema: Map<String, Value>) -> Self {
        self.output_schema = Some(schema);
        self
    }
}

/// The wire form of a registration, as sent to `POST /register`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub agent_id: String,
    pub capabilities: Vec<Capability>,
    pub endpoint: String,
}

impl RegistrationRequest {
    pub fn new(
        agent_id: impl Into<String>,
        capabilities: Vec<Capability>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            capabilities,
            endpoint: endpoint.into(),
        }
    }

    /// Parse a request body, reporting the first missing or mistyped field.
    pub fn from_value(value: Value) -> Result<Self, RegistryError> {
        let Value::Object(mut fields) = value else {
            return Err(RegistryError::invalid(
                "registration body must be a JSON object",
            ));
        };

        let agent_id = take_string(&mut fields, "agentId")?;

        let capabilities = match fields.remove("capabilities") {
            None | Some(Value::Null) => return Err(missing("capabilities")),
            Some(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| {
                    serde_json::from_value::<Capability>(item).map_err(|e| {
                        RegistryError::invalid(format!("capabilities[{}] is malformed: {}", index, e))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(RegistryError::invalid("capabilities must be an array"));
            }
        };

        let endpoint = take_string(&mut fields, "endpoint")?;

        Ok(Self {
            agent_id,
            capabilities,
            endpoint,
        })
    }
}

fn missing(field: &str) -> RegistryError {
    RegistryError::invalid(format!("missing required field '{}'", field))
}

fn take_string(fields: &mut Map<String, Value>, field: &str) -> Result<String, RegistryError> {
    match fields.remove(field) {
        None | Some(Value::Null) => Err(missing(field)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(RegistryError::invalid(format!("'{}' must be a string", field))),
    }
}

/// A validated agent registration as held by the registry.
///
/// Entries are immutable once stored; re-registering swaps the whole value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRegistration {
    pub agent_id: String,
    pub capabilities: Vec<Capability>,
    /// Absolute http(s) URL invocations are forwarded to.
    pub endpoint: String,
    /// When this declaration was first accepted.
    pub registered_at: DateTime<Utc>,
}

impl AgentRegistration {
    /// Validate a wire request into a registration.
    pub fn from_request(request: RegistrationRequest) -> Result<Self, RegistryError> {
        if request.agent_id.trim().is_empty() {
            return Err(RegistryError::invalid("agentId must not be empty"));
        }

        if request.capabilities.is_empty() {
            return Err(RegistryError::invalid(
                "capabilities must declare at least one capability",
            ));
        }

        let mut seen = HashSet::new();
        for (index, capability) in request.capabilities.iter().enumerate() {
            if capability.name.trim().is_empty() {
                return Err(RegistryError::invalid(format!(
                    "capabilities[{}].name must not be empty",
                    index
                )));
            }
            if !seen.insert(capability.name.as_str()) {
                return Err(RegistryError::invalid(format!(
                    "capability '{}' is declared more than once",
                    capability.name
                )));
            }
        }

        let endpoint = validate_endpoint(&request.endpoint)?;

        Ok(Self {
            agent_id: request.agent_id,
            capabilities: request.capabilities,
            endpoint,
            registered_at: Utc::now(),
        })
    }

    /// Whether this agent declares a capability with the given name.
    pub fn declares(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c.name == capability)
    }

    /// Names of the declared capabilities, in declaration order.
    pub fn capability_names(&self) -> Vec<&str> {
        self.capabilities.iter().map(|c| c.name.as_str()).collect()
    }

    /// Same agent, capabilities and endpoint; ignores `registered_at`.
    pub fn same_declaration(&self, other: &AgentRegistration) -> bool {
        self.agent_id == other.agent_id
            && self.capabilities == other.capabilities
            && self.endpoint == other.endpoint
    }
}

fn validate_endpoint(raw: &str) -> Result<String, RegistryError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RegistryError::invalid("endpoint must not be empty"));
    }

    let url = Url::parse(trimmed).map_err(|e| {
        RegistryError::invalid(format!("endpoint '{}' is not a valid URI: {}", trimmed, e))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(RegistryError::invalid(format!(
            "endpoint scheme '{}' is not supported (expected http or https)",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(RegistryError::invalid("endpoint must include a host"));
    }

    Ok(trimmed.to_string())
}
