use async_trait::async_trait;

use super::ProviderResult;
use crate::domain::resources::{Instance, LaunchSpec};

/// Port for the compute domain of the cloud provider
///
/// Every operation except `describe_regions` is region-scoped: the caller
/// must address the region that owns the resource.
#[async_trait]
pub trait ComputeProvider: Send + Sync {
    /// List region codes in the provider's own enumeration order
    async fn describe_regions(&self) -> ProviderResult<Vec<String>>;

    /// Find the newest general purpose image available in a region
    async fn latest_image(&self, region: &str) -> ProviderResult<Option<String>>;

    /// Launch one instance and wait until it is running
    async fn launch_instance(&self, region: &str, spec: &LaunchSpec) -> ProviderResult<Instance>;

    /// List all instances in a region
    async fn list_instances(&self, region: &str) -> ProviderResult<Vec<Instance>>;

    /// Describe a single instance, `None` if the region does not own it
    async fn describe_instance(
        &self,
        region: &str,
        instance_id: &str,
    ) -> ProviderResult<Option<Instance>>;

    /// Stop an instance and wait until it is stopped
    async fn stop_instance(&self, region: &str, instance_id: &str) -> ProviderResult<Instance>;

    /// Terminate an instance and wait until it is terminated
    async fn terminate_instance(&self, region: &str, instance_id: &str)
        -> ProviderResult<Instance>;
}
