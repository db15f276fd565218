//! Inline capabilities — handled by the orchestrator itself.
//!
//! The set is fixed when the router is built. An inline name always wins over
//! an agent declaring the same capability.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::errors::InlineError;
use crate::blog;

/// Name of the built-in blog formatting capability.
pub const ENHANCED_BLOG_WRITING: &str = "enhanced-blog-writing";

/// Name of the built-in echo capability.
pub const ECHO: &str = "echo";

/// A capability implemented inside the orchestrator.
///
/// Handlers validate their own payload fields; the router imposes no schema.
#[async_trait]
pub trait InlineHandler: Send + Sync {
    fn description(&self) -> &str;

    async fn handle(&self, payload: &Map<String, Value>) -> Result<Value, InlineError>;
}

/// The fixed set of inline capabilities, keyed by name.
#[derive(Clone, Default)]
pub struct InlineCapabilities {
    handlers: HashMap<String, Arc<dyn InlineHandler>>,
}

impl fmt::Debug for InlineCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InlineCapabilities")
            .field("names", &self.names())
            .finish()
    }
}

impl InlineCapabilities {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in handlers: `enhanced-blog-writing` and `echo`.
    pub fn with_builtins() -> Self {
        let mut set = Self::new();
        set.insert(ENHANCED_BLOG_WRITING, Arc::new(EnhancedBlogWriting));
        set.insert(ECHO, Arc::new(Echo));
        set
    }

    /// Add or replace a handler.
    pub fn insert(&mut self, name: impl Into<String>, handler: Arc<dyn InlineHandler>) {
        self.handlers.insert(name.into(), handler);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn InlineHandler>> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Sorted handler names.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Formats `text` (and an optional `title`) into an HTML blog post.
///
/// Payload: `{ "text": string, "title"?: string }`
/// Result:  `{ "blog_post": string }`
#[derive(Debug, Clone, Copy, Default)]
pub struct EnhancedBlogWriting;

#[async_trait]
impl InlineHandler for EnhancedBlogWriting {
    fn description(&self) -> &str {
        "Format notes into an HTML blog post"
    }

    async fn handle(&self, payload: &Map<String, Value>) -> Result<Value, InlineError> {
        let text = match payload.get("text") {
            Some(Value::String(text)) if !text.trim().is_empty() => text,
            Some(Value::String(_)) => {
                return Err(InlineError::InvalidPayload("'text' must not be empty".into()));
            }
            Some(_) => {
                return Err(InlineError::InvalidPayload("'text' must be a string".into()));
            }
            None => {
                return Err(InlineError::InvalidPayload(
                    "payload is missing required field 'text'".into(),
                ));
            }
        };

        let post = match payload.get("title") {
            None | Some(Value::Null) => blog::write_blog(text),
            Some(Value::String(title)) => blog::write_titled_blog(title, text),
            Some(_) => {
                return Err(InlineError::InvalidPayload("'title' must be a string".into()));
            }
        };

        Ok(serde_json::json!({ "blog_post": post }))
    }
}

/// Returns the payload unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Echo;

#[async_trait]
impl InlineHandler for Echo {
    fn description(&self) -> &str {
        "Return the payload unchanged"
    }

    async fn handle(&self, payload: &Map<String, Value>) -> Result<Value, InlineError> {
        Ok(Value::Object(payload.clone()))
    }
}
