use async_trait::async_trait;

use super::ProviderResult;
use crate::domain::resources::{Bucket, StoredObject};

/// Port for the storage domain of the cloud provider
///
/// Bucket names are global, so only creation takes a region.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Create a bucket in the given region
    async fn create_bucket(&self, name: &str, region: &str) -> ProviderResult<Bucket>;

    /// List every bucket owned by the account
    async fn list_buckets(&self) -> ProviderResult<Vec<Bucket>>;

    /// Check whether a bucket exists and is reachable
    async fn head_bucket(&self, name: &str) -> ProviderResult<bool>;

    /// List the objects in a bucket
    async fn list_objects(&self, bucket: &str) -> ProviderResult<Vec<StoredObject>>;

    /// Delete one object from a bucket
    async fn delete_object(&self, bucket: &str, key: &str) -> ProviderResult<()>;

    /// Delete an empty bucket
    async fn delete_bucket(&self, name: &str) -> ProviderResult<()>;
}
