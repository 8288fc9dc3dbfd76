use tracing::{debug, info};

use crate::domain::providers::{ComputeProvider, ProviderResult};

/// Find the region that owns an instance
///
/// Regions are probed sequentially in the order the provider enumerates them
/// and the scan stops at the first hit. A failing probe is treated as "not in
/// this region"; only a failure to enumerate regions is an error. Nothing is
/// cached, so every call rescans from the first region.
pub async fn locate_instance(
    provider: &dyn ComputeProvider,
    instance_id: &str,
) -> ProviderResult<Option<String>> {
    info!("Searching for instance {} across all regions", instance_id);

    let regions = provider.describe_regions().await?;

    for region in regions {
        match provider.describe_instance(&region, instance_id).await {
            Ok(Some(_)) => {
                info!("Found instance {} in {}", instance_id, region);
                return Ok(Some(region));
            }
            Ok(None) => continue,
            Err(e) => {
                debug!(region = %region, error = %e, "Region probe failed");
                continue;
            }
        }
    }

    info!("Instance {} not found in any region", instance_id);
    Ok(None)
}
