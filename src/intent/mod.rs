// Intent resolution
//
// Turns a free-text command into a structured [`Intent`]. The remote
// classification service is tried first; the deterministic
// [`fallback::classify`] rule engine always stands behind it, so resolution
// never fails from the coordinator's point of view.

pub mod cache;
pub mod fallback;
pub mod offline;
pub mod perplexity;
pub mod prompts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::agents::errors::AgentError;

pub use cache::IntentCache;
pub use offline::OfflineIntentService;
pub use perplexity::{PerplexityClient, PerplexityConfig};

/// Resource domain an intent targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Service {
    #[serde(rename = "ec2")]
    Compute,
    #[serde(rename = "s3")]
    Storage,
    #[serde(rename = "unknown", other)]
    Unknown,
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Service::Compute => write!(f, "EC2"),
            Service::Storage => write!(f, "S3"),
            Service::Unknown => write!(f, "unknown"),
        }
    }
}

/// Structured interpretation of one command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub service: Service,
    pub action: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl Intent {
    pub fn new(service: Service, action: impl Into<String>) -> Self {
        Self {
            service,
            action: action.into(),
            parameters: Map::new(),
        }
    }

    pub fn help() -> Self {
        Self::new(Service::Unknown, "help")
    }

    pub fn greeting() -> Self {
        Self::new(Service::Unknown, "greeting")
    }

    /// Attach an explicit parameter
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Read a parameter as text; blank strings and non-scalar values count as absent
    pub fn param(&self, key: &str) -> Option<String> {
        match self.parameters.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Actions the compute handler table accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeAction {
    CreateInstance,
    ListInstances,
    StopInstance,
    TerminateInstance,
}

impl ComputeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComputeAction::CreateInstance => "create_instance",
            ComputeAction::ListInstances => "list_instances",
            ComputeAction::StopInstance => "stop_instance",
            ComputeAction::TerminateInstance => "terminate_instance",
        }
    }
}

impl FromStr for ComputeAction {
    type Err = AgentError;

    fn from_str(action: &str) -> Result<Self, Self::Err> {
        match action {
            "create_instance" => Ok(ComputeAction::CreateInstance),
            "list_instances" => Ok(ComputeAction::ListInstances),
            "stop_instance" => Ok(ComputeAction::StopInstance),
            "terminate_instance" => Ok(ComputeAction::TerminateInstance),
            other => Err(AgentError::UnknownAction {
                service: Service::Compute,
                action: other.to_string(),
            }),
        }
    }
}

/// Actions the storage handler table accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageAction {
    CreateBucket,
    ListBuckets,
    ListObjects,
    DeleteBucket,
}

impl StorageAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageAction::CreateBucket => "create_bucket",
            StorageAction::ListBuckets => "list_buckets",
            StorageAction::ListObjects => "list_objects",
            StorageAction::DeleteBucket => "delete_bucket",
        }
    }
}

impl FromStr for StorageAction {
    type Err = AgentError;

    fn from_str(action: &str) -> Result<Self, Self::Err> {
        match action {
            "create_bucket" => Ok(StorageAction::CreateBucket),
            "list_buckets" => Ok(StorageAction::ListBuckets),
            "list_objects" => Ok(StorageAction::ListObjects),
            "delete_bucket" => Ok(StorageAction::DeleteBucket),
            other => Err(AgentError::UnknownAction {
                service: Service::Storage,
                action: other.to_string(),
            }),
        }
    }
}

/// Natural-language intent service
///
/// Implementations must degrade gracefully: `parse_intent` always returns a
/// best-effort intent and `conversational_response` always returns text.
#[async_trait]
pub trait IntentService: Send + Sync {
    /// Short name for status reporting
    fn name(&self) -> &'static str;

    async fn parse_intent(&self, text: &str) -> Intent;

    async fn conversational_response(&self, text: &str) -> String;

    /// Number of cached classifications, if the service caches
    fn cached_intents(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_wire_intent() {
        let intent: Intent = serde_json::from_value(json!({
            "service": "ec2",
            "action": "create_instance",
            "parameters": {"region": "ohio"}
        }))
        .unwrap();

        assert_eq!(intent.service, Service::Compute);
        assert_eq!(intent.param("region").as_deref(), Some("ohio"));
    }

    #[test]
    fn unrecognized_service_decodes_as_unknown() {
        let intent: Intent =
            serde_json::from_value(json!({"service": "lambda", "action": "invoke"})).unwrap();

        assert_eq!(intent.service, Service::Unknown);
        assert!(intent.parameters.is_empty());
    }

    #[test]
    fn blank_and_structured_params_are_absent() {
        let intent = Intent::new(Service::Storage, "create_bucket")
            .with_parameter("bucket_name", "  ")
            .with_parameter("tags", json!({"a": 1}))
            .with_parameter("count", 3);

        assert_eq!(intent.param("bucket_name"), None);
        assert_eq!(intent.param("tags"), None);
        assert_eq!(intent.param("count").as_deref(), Some("3"));
        assert_eq!(intent.param("missing"), None);
    }

    #[test]
    fn action_vocabulary_round_trips() {
        for action in [
            ComputeAction::CreateInstance,
            ComputeAction::ListInstances,
            ComputeAction::StopInstance,
            ComputeAction::TerminateInstance,
        ] {
            assert_eq!(action.as_str().parse::<ComputeAction>().unwrap(), action);
        }
        for action in [
            StorageAction::CreateBucket,
            StorageAction::ListBuckets,
            StorageAction::ListObjects,
            StorageAction::DeleteBucket,
        ] {
            assert_eq!(action.as_str().parse::<StorageAction>().unwrap(), action);
        }
    }

    #[test]
    fn unknown_action_names_the_service() {
        let err = "reboot_instance".parse::<ComputeAction>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown EC2 action: reboot_instance");

        let err = "upload_file".parse::<StorageAction>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown S3 action: upload_file");
    }
}
