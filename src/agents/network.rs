use std::sync::Arc;
use tracing::info;

use super::base::{Agent, AgentSettings, Directory};
use super::compute::ComputeAgent;
use super::coordinator::CoordinatorAgent;
use super::errors::AgentResult;
use super::storage::StorageAgent;
use crate::domain::providers::{ComputeProvider, StorageProvider};
use crate::intent::IntentService;

/// The assembled agent network
///
/// Owns every agent. Directories hold only weak references, so dropping the
/// network drops the agents.
pub struct AgentNetwork {
    coordinator: Arc<CoordinatorAgent>,
    compute: Arc<ComputeAgent>,
    storage: Arc<StorageAgent>,
}

impl AgentNetwork {
    /// Build the agents and wire every pair in both directions
    pub fn assemble(
        compute_provider: Arc<dyn ComputeProvider>,
        storage_provider: Arc<dyn StorageProvider>,
        intents: Arc<dyn IntentService>,
        home_region: &str,
        settings: &AgentSettings,
    ) -> AgentResult<Self> {
        let compute = Arc::new(ComputeAgent::new(compute_provider, home_region, settings));
        let storage = Arc::new(StorageAgent::new(storage_provider, home_region, settings));
        let coordinator = Arc::new(CoordinatorAgent::new(
            compute.clone(),
            storage.clone(),
            intents,
            settings,
        ));

        let mut directory = Directory::new();
        directory.register(&compute);
        directory.register(&storage);
        coordinator.core().install_directory(directory)?;

        let mut directory = Directory::new();
        directory.register(&coordinator);
        directory.register(&storage);
        compute.core().install_directory(directory)?;

        let mut directory = Directory::new();
        directory.register(&coordinator);
        directory.register(&compute);
        storage.core().install_directory(directory)?;

        info!(
            "Agent network initialized: {} <-> {} <-> {}",
            coordinator.name(),
            compute.name(),
            storage.name()
        );

        Ok(Self {
            coordinator,
            compute,
            storage,
        })
    }

    pub fn coordinator(&self) -> &Arc<CoordinatorAgent> {
        &self.coordinator
    }

    pub fn compute(&self) -> &Arc<ComputeAgent> {
        &self.compute
    }

    pub fn storage(&self) -> &Arc<StorageAgent> {
        &self.storage
    }

    pub fn agent_names(&self) -> [&str; 3] {
        [
            self.coordinator.name(),
            self.compute.name(),
            self.storage.name(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::providers::InMemoryCloud;
    use crate::intent::OfflineIntentService;

    fn network() -> AgentNetwork {
        let cloud = Arc::new(InMemoryCloud::with_default_regions());
        AgentNetwork::assemble(
            cloud.clone(),
            cloud,
            Arc::new(OfflineIntentService),
            "us-east-2",
            &AgentSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn every_agent_knows_the_other_two() {
        let network = network();

        assert_eq!(
            network.coordinator().core().peers(),
            vec!["EC2Agent", "S3Agent"]
        );
        assert_eq!(
            network.compute().core().peers(),
            vec!["CoordinatorAgent", "S3Agent"]
        );
        assert_eq!(
            network.storage().core().peers(),
            vec!["CoordinatorAgent", "EC2Agent"]
        );
    }

    #[tokio::test]
    async fn resource_agents_can_query_each_other() {
        let network = network();
        network.storage().create_bucket("shared", None).await.unwrap();

        let ctx = network.compute().core().root_context();
        let reply = network
            .compute()
            .core()
            .query(&ctx, StorageAgent::NAME, "bucket count")
            .await
            .unwrap();

        assert_eq!(reply.count("count"), Some(1));
        assert_eq!(network.storage().core().history_len(), 1);
    }

    #[test]
    fn agent_names_in_network_order() {
        assert_eq!(
            network().agent_names(),
            ["CoordinatorAgent", "EC2Agent", "S3Agent"]
        );
    }
}
