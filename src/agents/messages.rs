// Agent message passing
//
// Envelope, typed payloads and the history snapshot taken at send/receive time

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide tie breaker for message ids created within the same microsecond
static MESSAGE_SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Request,
    Response,
    Notification,
    Query,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageKind::Request => write!(f, "request"),
            MessageKind::Response => write!(f, "response"),
            MessageKind::Notification => write!(f, "notification"),
            MessageKind::Query => write!(f, "query"),
        }
    }
}

/// An action another agent is asked to perform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub arguments: Map<String, Value>,
}

impl ActionRequest {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            arguments: Map::new(),
        }
    }

    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    pub fn argument(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(Value::as_str)
    }
}

/// Message content, one variant per message kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "lowercase")]
pub enum Payload {
    Request(ActionRequest),
    Query { text: String },
    Response(Value),
    Notification(Value),
}

impl Payload {
    pub fn request(request: ActionRequest) -> Self {
        Payload::Request(request)
    }

    pub fn query(text: impl Into<String>) -> Self {
        Payload::Query { text: text.into() }
    }

    pub fn notification(content: Value) -> Self {
        Payload::Notification(content)
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Payload::Request(_) => MessageKind::Request,
            Payload::Query { .. } => MessageKind::Query,
            Payload::Response(_) => MessageKind::Response,
            Payload::Notification(_) => MessageKind::Notification,
        }
    }

    /// Content as recorded in conversation history
    pub fn content(&self) -> Value {
        match self {
            Payload::Request(request) => serde_json::to_value(request).unwrap_or(Value::Null),
            Payload::Query { text } => json!({ "query": text }),
            Payload::Response(value) | Payload::Notification(value) => value.clone(),
        }
    }
}

/// Immutable envelope for one agent-to-agent delivery
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    id: String,
    sender: String,
    receiver: String,
    payload: Payload,
    timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(sender: impl Into<String>, receiver: impl Into<String>, payload: Payload) -> Self {
        let sender = sender.into();
        let receiver = receiver.into();
        let timestamp = Utc::now();
        let sequence = MESSAGE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let id = format!(
            "{}-{}-{}-{}",
            sender,
            receiver,
            timestamp.timestamp_micros(),
            sequence
        );

        Self {
            id,
            sender,
            receiver,
            payload,
            timestamp,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn kind(&self) -> MessageKind {
        self.payload.kind()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Serialized snapshot of a message, kept for observability only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: String,
    pub sender: String,
    pub receiver: String,
    pub content: Value,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub timestamp: DateTime<Utc>,
}

impl From<&Message> for ConversationRecord {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.clone(),
            sender: message.sender.clone(),
            receiver: message.receiver.clone(),
            content: message.payload.content(),
            kind: message.kind(),
            timestamp: message.timestamp,
        }
    }
}
