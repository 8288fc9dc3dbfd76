use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::providers::{
    ComputeProvider, ProviderError, ProviderResult, StorageProvider,
};
use crate::domain::region::REGIONS;
use crate::domain::resources::{Bucket, Instance, InstanceState, LaunchSpec, StoredObject};

/// In-memory cloud implementing both provider ports
///
/// Used as the sandbox backend of the binaries and as a test double. State
/// transitions that a real provider would poll for complete immediately.
pub struct InMemoryCloud {
    regions: Vec<String>,
    state: Mutex<CloudState>,
}

#[derive(Default)]
struct CloudState {
    images: HashMap<String, String>,
    instances: Vec<Instance>,
    buckets: Vec<Bucket>,
    objects: HashMap<String, Vec<StoredObject>>,
    next_instance: u64,
}

impl InMemoryCloud {
    /// Creates a cloud exposing the given regions, in that order
    pub fn new<I, S>(regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            regions: regions.into_iter().map(Into::into).collect(),
            state: Mutex::new(CloudState::default()),
        }
    }

    /// Creates a cloud exposing every region of the static region table
    pub fn with_default_regions() -> Self {
        Self::new(REGIONS.iter().map(|info| info.code))
    }

    /// Publishes an image in a region
    pub fn with_image(self, region: &str, image_id: &str) -> Self {
        self.state()
            .images
            .insert(region.to_string(), image_id.to_string());
        self
    }

    /// Places a running instance directly into a region
    pub fn seed_instance(&self, region: &str, instance_type: &str) -> Instance {
        let mut state = self.state();
        let instance = Instance {
            instance_id: state.allocate_instance_id(),
            instance_type: instance_type.to_string(),
            image_id: "ami-seeded".to_string(),
            state: InstanceState::Running,
            region: region.to_string(),
            launch_time: Utc::now(),
        };
        state.instances.push(instance.clone());
        instance
    }

    /// Stores an object of `size` bytes in an existing bucket
    pub fn put_object(&self, bucket: &str, key: &str, size: u64) -> ProviderResult<StoredObject> {
        let mut state = self.state();
        if !state.buckets.iter().any(|b| b.name == bucket) {
            return Err(bucket_not_found(bucket));
        }
        let object = StoredObject {
            key: key.to_string(),
            size,
            last_modified: Utc::now(),
        };
        let objects = state.objects.entry(bucket.to_string()).or_default();
        objects.retain(|existing| existing.key != key);
        objects.push(object.clone());
        Ok(object)
    }

    fn state(&self) -> MutexGuard<'_, CloudState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_region(&self, region: &str) -> ProviderResult<()> {
        if self.regions.iter().any(|r| r == region) {
            Ok(())
        } else {
            Err(ProviderError::Rejected(format!(
                "Region {} is not enabled for this account",
                region
            )))
        }
    }

    fn transition(
        &self,
        region: &str,
        instance_id: &str,
        target: InstanceState,
    ) -> ProviderResult<Instance> {
        self.ensure_region(region)?;
        let mut state = self.state();
        let instance = state
            .instances
            .iter_mut()
            .find(|i| i.region == region && i.instance_id == instance_id)
            .ok_or_else(|| instance_not_found(instance_id))?;

        if !instance.state.is_live() {
            return Err(ProviderError::Rejected(format!(
                "Instance {} is in state {} and cannot be modified",
                instance_id, instance.state
            )));
        }

        instance.state = target;
        Ok(instance.clone())
    }
}

impl CloudState {
    fn allocate_instance_id(&mut self) -> String {
        self.next_instance += 1;
        format!("i-{:017x}", 0x5eed_0000_0000_u64 + self.next_instance)
    }
}

fn instance_not_found(instance_id: &str) -> ProviderError {
    ProviderError::NotFound {
        kind: "Instance",
        id: instance_id.to_string(),
    }
}

fn bucket_not_found(bucket: &str) -> ProviderError {
    ProviderError::NotFound {
        kind: "Bucket",
        id: bucket.to_string(),
    }
}

#[async_trait]
impl ComputeProvider for InMemoryCloud {
    async fn describe_regions(&self) -> ProviderResult<Vec<String>> {
        Ok(self.regions.clone())
    }

    async fn latest_image(&self, region: &str) -> ProviderResult<Option<String>> {
        self.ensure_region(region)?;
        Ok(self.state().images.get(region).cloned())
    }

    async fn launch_instance(&self, region: &str, spec: &LaunchSpec) -> ProviderResult<Instance> {
        self.ensure_region(region)?;
        let mut state = self.state();
        let instance = Instance {
            instance_id: state.allocate_instance_id(),
            instance_type: spec.instance_type.clone(),
            image_id: spec.image_id.clone(),
            state: InstanceState::Running,
            region: region.to_string(),
            launch_time: Utc::now(),
        };
        state.instances.push(instance.clone());
        Ok(instance)
    }

    async fn list_instances(&self, region: &str) -> ProviderResult<Vec<Instance>> {
        self.ensure_region(region)?;
        Ok(self
            .state()
            .instances
            .iter()
            .filter(|i| i.region == region)
            .cloned()
            .collect())
    }

    async fn describe_instance(
        &self,
        region: &str,
        instance_id: &str,
    ) -> ProviderResult<Option<Instance>> {
        self.ensure_region(region)?;
        Ok(self
            .state()
            .instances
            .iter()
            .find(|i| i.region == region && i.instance_id == instance_id)
            .cloned())
    }

    async fn stop_instance(&self, region: &str, instance_id: &str) -> ProviderResult<Instance> {
        self.transition(region, instance_id, InstanceState::Stopped)
    }

    async fn terminate_instance(
        &self,
        region: &str,
        instance_id: &str,
    ) -> ProviderResult<Instance> {
        self.transition(region, instance_id, InstanceState::Terminated)
    }
}

#[async_trait]
impl StorageProvider for InMemoryCloud {
    async fn create_bucket(&self, name: &str, region: &str) -> ProviderResult<Bucket> {
        self.ensure_region(region)?;
        let mut state = self.state();
        if state.buckets.iter().any(|b| b.name == name) {
            return Err(ProviderError::Rejected(format!(
                "Bucket {} already exists",
                name
            )));
        }
        let bucket = Bucket {
            name: name.to_string(),
            region: region.to_string(),
            creation_date: Utc::now(),
        };
        state.buckets.push(bucket.clone());
        Ok(bucket)
    }

    async fn list_buckets(&self) -> ProviderResult<Vec<Bucket>> {
        Ok(self.state().buckets.clone())
    }

    async fn head_bucket(&self, name: &str) -> ProviderResult<bool> {
        Ok(self.state().buckets.iter().any(|b| b.name == name))
    }

    async fn list_objects(&self, bucket: &str) -> ProviderResult<Vec<StoredObject>> {
        let state = self.state();
        if !state.buckets.iter().any(|b| b.name == bucket) {
            return Err(bucket_not_found(bucket));
        }
        Ok(state.objects.get(bucket).cloned().unwrap_or_default())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> ProviderResult<()> {
        let mut state = self.state();
        if !state.buckets.iter().any(|b| b.name == bucket) {
            return Err(bucket_not_found(bucket));
        }
        if let Some(objects) = state.objects.get_mut(bucket) {
            objects.retain(|object| object.key != key);
        }
        Ok(())
    }

    async fn delete_bucket(&self, name: &str) -> ProviderResult<()> {
        let mut state = self.state();
        if !state.buckets.iter().any(|b| b.name == name) {
            return Err(bucket_not_found(name));
        }
        if state.objects.get(name).is_some_and(|objects| !objects.is_empty()) {
            return Err(ProviderError::Rejected(format!(
                "Bucket {} is not empty",
                name
            )));
        }
        state.buckets.retain(|b| b.name != name);
        state.objects.remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn spec() -> LaunchSpec {
        LaunchSpec {
            instance_type: "t2.small".to_string(),
            image_id: "ami-123".to_string(),
            key_name: None,
            tags: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn launched_instances_are_region_scoped() {
        let cloud = InMemoryCloud::new(["us-east-1", "eu-west-1"]);
        let instance = cloud.launch_instance("eu-west-1", &spec()).await.unwrap();

        assert_eq!(instance.state, InstanceState::Running);
        assert!(instance.instance_id.starts_with("i-"));
        assert!(cloud.list_instances("us-east-1").await.unwrap().is_empty());
        assert_eq!(cloud.list_instances("eu-west-1").await.unwrap().len(), 1);
        assert!(cloud
            .describe_instance("us-east-1", &instance.instance_id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn unknown_region_is_rejected() {
        let cloud = InMemoryCloud::new(["us-east-1"]);
        let result = cloud.launch_instance("mars-1", &spec()).await;
        assert!(matches!(result, Err(ProviderError::Rejected(_))));
    }

    #[tokio::test]
    async fn terminated_instance_cannot_be_stopped() {
        let cloud = InMemoryCloud::new(["us-east-1"]);
        let instance = cloud.seed_instance("us-east-1", "t2.micro");

        let terminated = cloud
            .terminate_instance("us-east-1", &instance.instance_id)
            .await
            .unwrap();
        assert_eq!(terminated.state, InstanceState::Terminated);

        let result = cloud.stop_instance("us-east-1", &instance.instance_id).await;
        assert!(matches!(result, Err(ProviderError::Rejected(_))));
    }

    #[tokio::test]
    async fn instance_ids_are_unique() {
        let cloud = InMemoryCloud::new(["us-east-1"]);
        let a = cloud.seed_instance("us-east-1", "t2.micro");
        let b = cloud.seed_instance("us-east-1", "t2.micro");
        assert_ne!(a.instance_id, b.instance_id);
    }

    #[tokio::test]
    async fn non_empty_bucket_cannot_be_deleted() {
        let cloud = InMemoryCloud::new(["us-east-2"]);
        cloud.create_bucket("logs", "us-east-2").await.unwrap();
        cloud.put_object("logs", "a.txt", 12).unwrap();

        let result = cloud.delete_bucket("logs").await;
        assert!(matches!(result, Err(ProviderError::Rejected(_))));

        cloud.delete_object("logs", "a.txt").await.unwrap();
        cloud.delete_bucket("logs").await.unwrap();
        assert!(!cloud.head_bucket("logs").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_bucket_is_rejected() {
        let cloud = InMemoryCloud::new(["us-east-2"]);
        cloud.create_bucket("photos", "us-east-2").await.unwrap();
        let err = cloud.create_bucket("photos", "us-east-2").await.unwrap_err();
        assert_eq!(err.to_string(), "Bucket photos already exists");
    }

    #[tokio::test]
    async fn missing_bucket_reports_not_found() {
        let cloud = InMemoryCloud::new(["us-east-2"]);
        let err = cloud.list_objects("ghost").await.unwrap_err();
        assert_eq!(err.to_string(), "Bucket ghost not found");
    }
}
