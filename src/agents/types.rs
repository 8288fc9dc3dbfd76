use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::AgentError;

/// Reply produced by agent handlers and the coordinator
///
/// A flat JSON object. Success carries `success: true` plus domain fields,
/// failure carries only `error`, conversational replies carry `message`.
/// Callers tell failure apart by the presence of the `error` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reply(Map<String, Value>);

impl Reply {
    pub fn new() -> Self {
        Self::default()
    }

    /// `{success: true, message}`
    pub fn success(message: impl Into<String>) -> Self {
        Self::new()
            .with("success", true)
            .with("message", Into::<String>::into(message))
    }

    /// `{success: true}` with fields to follow
    pub fn ok() -> Self {
        Self::new().with("success", true)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new().with("error", Into::<String>::into(message))
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self::new().with("message", Into::<String>::into(message))
    }

    /// Default acknowledgement for messages an agent does not interpret
    pub fn unhandled() -> Self {
        Self::new()
            .with("status", "received")
            .with("message", "Message received but not processed")
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Serialize) {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_error(&self) -> bool {
        self.0.contains_key("error")
    }

    pub fn error_text(&self) -> Option<&str> {
        self.0.get("error").and_then(Value::as_str)
    }

    pub fn message_text(&self) -> Option<&str> {
        self.0.get("message").and_then(Value::as_str)
    }

    /// Read a non-negative integer field such as `count`
    pub fn count(&self, key: &str) -> Option<u64> {
        self.0.get(key).and_then(Value::as_u64)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<AgentError> for Reply {
    fn from(error: AgentError) -> Self {
        Reply::error(error.to_string())
    }
}
