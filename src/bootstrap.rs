// Wiring shared by the HTTP server and the chat binary

use std::sync::Arc;
use tracing::info;

use crate::agents::{AgentNetwork, AgentResult};
use crate::config::AppConfig;
use crate::infrastructure::providers::InMemoryCloud;

/// Images published in the sandbox cloud; other regions use the agent's fallback table
const SANDBOX_IMAGES: &[(&str, &str)] = &[
    ("us-east-1", "ami-0b5eea76982371e91"),
    ("us-east-2", "ami-0a606d8395a538502"),
    ("us-west-2", "ami-0ceecbb0f30a902a6"),
    ("eu-central-1", "ami-0a261c0e5f51090b1"),
    ("ap-northeast-1", "ami-0d52744d6551d851e"),
];

/// In-memory cloud spanning every known region
pub fn sandbox_cloud() -> InMemoryCloud {
    SANDBOX_IMAGES
        .iter()
        .fold(InMemoryCloud::with_default_regions(), |cloud, (region, image_id)| {
            cloud.with_image(region, image_id)
        })
}

/// Assemble the agent network described by `config` over the sandbox cloud
pub fn build_network(config: &AppConfig) -> AgentResult<AgentNetwork> {
    let cloud = Arc::new(sandbox_cloud());
    let intents = config.intent_service()?;
    info!(
        intent_service = intents.name(),
        home_region = %config.home_region,
        "Assembling agent network"
    );

    AgentNetwork::assemble(
        cloud.clone(),
        cloud,
        intents,
        &config.home_region,
        &config.agent_settings(),
    )
}
