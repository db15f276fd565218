//! Invocation request, forward envelope, and routing outcome types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::RouteError;

/// A request to perform a capability, as sent to `POST /message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationRequest {
    /// Caller-supplied correlation id. Not deduplicated.
    pub message_id: String,
    pub capability: String,
    /// Opaque to the router; interpreted by the target only.
    #[serde(default)]
    pub payload: Map<String, Value>,
}

impl InvocationRequest {
    pub fn new(
        message_id: impl Into<String>,
        capability: impl Into<String>,
        payload: Map<String, Value>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            capability: capability.into(),
            payload,
        }
    }

    /// Create a request with a fresh random message id.
    pub fn with_generated_id(capability: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), capability, payload)
    }

    /// Parse a request body. A missing payload is treated as `{}`.
    pub fn from_value(value: Value) -> Result<Self, RouteError> {
        let Value::Object(mut fields) = value else {
            return Err(RouteError::InvalidInvocation(
                "message body must be a JSON object".into(),
            ));
        };

        let message_id = take_non_empty(&mut fields, "messageId")?;
        let capability = take_non_empty(&mut fields, "capability")?;

        let payload = match fields.remove("payload") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(RouteError::InvalidInvocation(
                    "'payload' must be a JSON object".into(),
                ));
            }
        };

        Ok(Self {
            message_id,
            capability,
            payload,
        })
    }
}

fn take_non_empty(fields: &mut Map<String, Value>, field: &str) -> Result<String, RouteError> {
    match fields.remove(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s),
        Some(Value::String(_)) => Err(RouteError::InvalidInvocation(format!(
            "'{}' must not be empty",
            field
        ))),
        None | Some(Value::Null) => Err(RouteError::InvalidInvocation(format!(
            "missing required field '{}'",
            field
        ))),
        Some(_) => Err(RouteError::InvalidInvocation(format!(
            "'{}' must be a string",
            field
        ))),
    }
}

/// The body POSTed to an agent's endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardEnvelope {
    pub capability: String,
    pub payload: Map<String, Value>,
    pub message_id: String,
}

impl From<InvocationRequest> for ForwardEnvelope {
    fn from(request: InvocationRequest) -> Self {
        Self {
            capability: request.capability,
            payload: request.payload,
            message_id: request.message_id,
        }
    }
}

/// What the router does once a capability resolves to agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// Forward to the selected agent and return its response.
    #[default]
    Forward,
    /// Report the matching agents without contacting any of them.
    Announce,
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => write!(f, "forward"),
            Self::Announce => write!(f, "announce"),
        }
    }
}

impl FromStr for DispatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" => Ok(Self::Forward),
            "announce" => Ok(Self::Announce),
            other => Err(format!(
                "unknown dispatch mode '{}' (expected 'forward' or 'announce')",
                other
            )),
        }
    }
}

/// Successful result of routing one invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// Handled by an inline capability.
    Inline {
        message_id: String,
        capability: String,
        result: Value,
    },
    /// Forwarded to an agent, which answered successfully.
    Forwarded {
        message_id: String,
        capability: String,
        agent_id: String,
        response: Value,
    },
    /// Resolved in [`DispatchMode::Announce`]; `agents` is in iteration order.
    Announced {
        message_id: String,
        capability: String,
        agents: Vec<String>,
    },
}

impl RouteOutcome {
    pub fn message_id(&self) -> &str {
        match self {
            Self::Inline { message_id, .. }
            | Self::Forwarded { message_id, .. }
            | Self::Announced { message_id, .. } => message_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_defaults_payload() {
        let request = InvocationRequest::from_value(json!({
            "messageId": "m1",
            "capability": "echo"
        }))
        .unwrap();
        assert!(request.payload.is_empty());
    }

    #[test]
    fn test_from_value_rejects_bad_shapes() {
        let cases = [
            (json!("nope"), "JSON object"),
            (json!({ "capability": "x" }), "messageId"),
            (json!({ "messageId": "m1" }), "capability"),
            (json!({ "messageId": "", "capability": "x" }), "must not be empty"),
            (json!({ "messageId": 1, "capability": "x" }), "must be a string"),
            (json!({ "messageId": "m1", "capability": "x", "payload": [1] }), "payload"),
        ];
        for (body, expected) in cases {
            let err = InvocationRequest::from_value(body.clone()).unwrap_err();
            assert!(
                err.to_string().contains(expected),
                "{} -> {}",
                body,
                err
            );
        }
    }

    #[test]
    fn test_envelope_uses_camel_case() {
        let mut payload = Map::new();
        payload.insert("text".into(), json!("hi"));
        let envelope = ForwardEnvelope::from(InvocationRequest::new("m1", "x", payload));
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value, json!({ "capability": "x", "payload": { "text": "hi" }, "messageId": "m1" }));
    }

    #[test]
    fn test_dispatch_mode_parse() {
        assert_eq!("Forward".parse::<DispatchMode>().unwrap(), DispatchMode::Forward);
        assert_eq!(" announce ".parse::<DispatchMode>().unwrap(), DispatchMode::Announce);
        assert!("broadcast".parse::<DispatchMode>().is_err());
        assert_eq!(DispatchMode::default().to_string(), "forward");
    }

    #[test]
    fn test_generated_ids_differ() {
        let a = InvocationRequest::with_generated_id("x", Map::new());
        let b = InvocationRequest::with_generated_id("x", Map::new());
        assert_ne!(a.message_id, b.message_id);
    }
}
