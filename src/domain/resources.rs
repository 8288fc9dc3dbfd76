use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle state of a compute instance as reported by the provider
///
/// # State Transitions
/// ```text
/// Pending -> Running -> Stopping -> Stopped
///               └-----> ShuttingDown -> Terminated
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstanceState {
    Pending,
    Running,
    Stopping,
    Stopped,
    ShuttingDown,
    Terminated,
}

impl InstanceState {
    /// Whether the instance can still be stopped or terminated
    pub fn is_live(&self) -> bool {
        !matches!(self, InstanceState::ShuttingDown | InstanceState::Terminated)
    }
}

impl std::fmt::Display for InstanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstanceState::Pending => write!(f, "pending"),
            InstanceState::Running => write!(f, "running"),
            InstanceState::Stopping => write!(f, "stopping"),
            InstanceState::Stopped => write!(f, "stopped"),
            InstanceState::ShuttingDown => write!(f, "shutting-down"),
            InstanceState::Terminated => write!(f, "terminated"),
        }
    }
}

/// A compute instance living in exactly one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub instance_id: String,
    pub instance_type: String,
    pub image_id: String,
    pub state: InstanceState,
    pub region: String,
    pub launch_time: DateTime<Utc>,
}

/// Parameters for launching a single instance
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchSpec {
    pub instance_type: String,
    pub image_id: String,
    pub key_name: Option<String>,
    pub tags: BTreeMap<String, String>,
}

/// A storage bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub name: String,
    pub region: String,
    pub creation_date: DateTime<Utc>,
}

/// An object stored in a bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredObject {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_display_matches_wire_names() {
        assert_eq!(InstanceState::Running.to_string(), "running");
        assert_eq!(InstanceState::ShuttingDown.to_string(), "shutting-down");
        assert_eq!(
            serde_json::to_value(InstanceState::ShuttingDown).unwrap(),
            serde_json::json!("shutting-down")
        );
    }

    #[test]
    fn terminated_instances_are_not_live() {
        assert!(InstanceState::Stopped.is_live());
        assert!(!InstanceState::Terminated.is_live());
        assert!(!InstanceState::ShuttingDown.is_live());
    }
}
