// Provider ports
// The cloud resource provider is an external collaborator; these traits are
// the only surface the agents depend on.

pub mod compute_provider;
pub mod storage_provider;

use thiserror::Error;

pub use compute_provider::ComputeProvider;
pub use storage_provider::StorageProvider;

/// Errors reported by a cloud resource provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("{0}")]
    Rejected(String),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;
