use thiserror::Error;

use crate::domain::providers::ProviderError;
use crate::intent::Service;

/// Errors that can occur in the agent system
///
/// Everything except an internal fault is turned into an `{error}` reply at
/// the coordinator's dispatch boundary.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The receiver is not in the sender's directory, or has been dropped
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Hop limit of {limit} exceeded delivering {sender} -> {receiver} (chain: {chain})")]
    HopLimitExceeded {
        limit: usize,
        sender: String,
        receiver: String,
        chain: String,
    },

    #[error("Unknown {service} action: {action}")]
    UnknownAction { service: Service, action: String },

    #[error("Please provide {0}")]
    MissingParameter(&'static str),

    #[error("{kind} {id} not found in any region")]
    NotLocated { kind: &'static str, id: String },

    #[error("No AMI found for region {region}. Please specify ami_id parameter.")]
    NoImage { region: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Remote intent service unreachable; always recovered locally
    #[error("Intent service unavailable: {0}")]
    ClassificationUnavailable(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Agent network error: {0}")]
    NetworkAssembly(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type AgentResult<T> = Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_facing_messages() {
        assert_eq!(
            AgentError::MissingParameter("instance ID").to_string(),
            "Please provide instance ID"
        );
        assert_eq!(
            AgentError::NotLocated {
                kind: "Instance",
                id: "rsc-unknown".to_string()
            }
            .to_string(),
            "Instance rsc-unknown not found in any region"
        );
        assert_eq!(
            AgentError::from(ProviderError::Rejected("Bucket x already exists".to_string()))
                .to_string(),
            "Bucket x already exists"
        );
    }
}
