use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::base::{Agent, AgentCore, AgentSettings, CallContext};
use super::errors::{AgentError, AgentResult};
use super::messages::{Message, Payload};
use super::params::DEFAULT_INSTANCE_TYPE;
use super::types::Reply;
use crate::domain::providers::ComputeProvider;
use crate::domain::region::{display_name, locate_instance, map_region};
use crate::domain::resources::{Instance, InstanceState, LaunchSpec};

/// Images used when the provider has no current image for a region
const FALLBACK_IMAGES: &[(&str, &str)] = &[
    ("us-east-1", "ami-0c55b159cbfafe1f0"),
    ("us-east-2", "ami-0c55b159cbfafe1f0"),
    ("us-west-1", "ami-0d1cd67c26f5fca19"),
    ("us-west-2", "ami-0d1cd67c26f5fca19"),
    ("eu-west-1", "ami-0d71ea30463e0ff8d"),
    ("eu-west-2", "ami-0d71ea30463e0ff8d"),
    ("ap-southeast-1", "ami-0c802847a7dd848c0"),
];

/// Parameters for launching one instance
#[derive(Debug, Clone, PartialEq)]
pub struct CreateInstance {
    pub instance_type: String,
    /// Friendly name or region code; `None` uses the default region
    pub region: Option<String>,
    pub image_id: Option<String>,
    pub key_name: Option<String>,
    pub tags: BTreeMap<String, String>,
}

impl Default for CreateInstance {
    fn default() -> Self {
        Self {
            instance_type: DEFAULT_INSTANCE_TYPE.to_string(),
            region: None,
            image_id: None,
            key_name: None,
            tags: BTreeMap::new(),
        }
    }
}

/// Compute resource agent
///
/// Answers A2A queries about instance counts and performs instance
/// lifecycle operations through the compute provider.
pub struct ComputeAgent {
    core: AgentCore,
    provider: Arc<dyn ComputeProvider>,
    home_region: String,
}

impl ComputeAgent {
    pub const NAME: &'static str = "EC2Agent";

    pub fn new(
        provider: Arc<dyn ComputeProvider>,
        home_region: impl Into<String>,
        settings: &AgentSettings,
    ) -> Self {
        Self {
            core: AgentCore::new(Self::NAME, settings),
            provider,
            home_region: home_region.into(),
        }
    }

    pub fn home_region(&self) -> &str {
        &self.home_region
    }

    pub async fn create_instance(&self, request: &CreateInstance) -> AgentResult<Reply> {
        let region = match request.region.as_deref() {
            Some(requested) => map_region(Some(requested)),
            None => self.home_region.as_str(),
        };
        let image_id = match &request.image_id {
            Some(image_id) => image_id.clone(),
            None => self.resolve_image(region).await?,
        };

        let spec = LaunchSpec {
            instance_type: request.instance_type.clone(),
            image_id: image_id.clone(),
            key_name: request.key_name.clone(),
            tags: request.tags.clone(),
        };
        let instance = self.provider.launch_instance(region, &spec).await?;
        let region_name = display_name(region);

        info!(
            instance_id = %instance.instance_id,
            region = %region,
            "Instance launched"
        );

        Ok(Reply::ok()
            .with("instance_id", &instance.instance_id)
            .with("instance_type", &instance.instance_type)
            .with("ami_id", image_id)
            .with("region", region)
            .with("region_name", region_name)
            .with("state", instance.state)
            .with(
                "message",
                format!(
                    "EC2 instance {} created successfully in {} ({})",
                    instance.instance_id, region_name, region
                ),
            ))
    }

    async fn resolve_image(&self, region: &str) -> AgentResult<String> {
        match self.provider.latest_image(region).await {
            Ok(Some(image_id)) => return Ok(image_id),
            Ok(None) => {}
            Err(e) => warn!(region = %region, error = %e, "Image lookup failed"),
        }

        FALLBACK_IMAGES
            .iter()
            .find(|(code, _)| *code == region)
            .map(|(_, image_id)| image_id.to_string())
            .ok_or_else(|| AgentError::NoImage {
                region: region.to_string(),
            })
    }

    async fn instances(&self) -> AgentResult<Vec<Instance>> {
        Ok(self.provider.list_instances(&self.home_region).await?)
    }

    /// Instances in the home region
    pub async fn list_instances(&self) -> AgentResult<Reply> {
        let instances = self.instances().await?;
        Ok(Reply::ok().with("instances", summaries(&instances)))
    }

    pub async fn instance_info(&self, instance_id: &str) -> AgentResult<Reply> {
        let region = self.locate(instance_id).await?;
        let instance = self
            .provider
            .describe_instance(&region, instance_id)
            .await?
            .ok_or_else(|| AgentError::NotLocated {
                kind: "Instance",
                id: instance_id.to_string(),
            })?;

        Ok(Reply::ok()
            .with("instance_id", &instance.instance_id)
            .with("state", instance.state)
            .with("type", &instance.instance_type)
            .with("region", &region)
            .with("launch_time", instance.launch_time.to_rfc3339()))
    }

    pub async fn stop_instance(&self, instance_id: &str) -> AgentResult<Reply> {
        let region = self.locate(instance_id).await?;
        self.provider.stop_instance(&region, instance_id).await?;
        Ok(lifecycle_reply(instance_id, &region, "stopped"))
    }

    pub async fn terminate_instance(&self, instance_id: &str) -> AgentResult<Reply> {
        let region = self.locate(instance_id).await?;
        self.provider.terminate_instance(&region, instance_id).await?;
        Ok(lifecycle_reply(instance_id, &region, "terminated"))
    }

    async fn locate(&self, instance_id: &str) -> AgentResult<String> {
        locate_instance(self.provider.as_ref(), instance_id)
            .await?
            .ok_or_else(|| AgentError::NotLocated {
                kind: "Instance",
                id: instance_id.to_string(),
            })
    }

    async fn answer_query(&self, text: &str) -> AgentResult<Reply> {
        let text = text.to_lowercase();

        if text.contains("running") {
            let running: Vec<Instance> = self
                .instances()
                .await?
                .into_iter()
                .filter(|instance| instance.state == InstanceState::Running)
                .collect();
            return Ok(Reply::new()
                .with("running_count", running.len())
                .with("instances", summaries(&running)));
        }

        if text.contains("instance") && (text.contains("count") || text.contains("how many")) {
            let instances = self.instances().await?;
            return Ok(Reply::new()
                .with("count", instances.len())
                .with("instances", summaries(&instances)));
        }

        Ok(Reply::unhandled())
    }
}

fn summaries(instances: &[Instance]) -> Vec<Value> {
    instances
        .iter()
        .map(|instance| {
            json!({
                "instance_id": instance.instance_id,
                "instance_type": instance.instance_type,
                "state": instance.state,
                "region": instance.region,
                "launch_time": instance.launch_time.to_rfc3339(),
            })
        })
        .collect()
}

fn lifecycle_reply(instance_id: &str, region: &str, outcome: &str) -> Reply {
    let region_name = display_name(region);
    Reply::ok()
        .with("instance_id", instance_id)
        .with("region", region)
        .with("region_name", region_name)
        .with(
            "message",
            format!(
                "Instance {} {} successfully in {} ({})",
                instance_id, outcome, region_name, region
            ),
        )
}

#[async_trait]
impl Agent for ComputeAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    async fn handle(&self, _ctx: &CallContext, message: &Message) -> Reply {
        let result = match message.payload() {
            Payload::Query { text } => self.answer_query(text).await,
            Payload::Request(request) => match request.action.as_str() {
                "list_instances" => self.list_instances().await,
                "get_instance_info" => match request.argument("instance_id") {
                    Some(instance_id) => self.instance_info(instance_id).await,
                    None => Err(AgentError::MissingParameter("instance ID")),
                },
                _ => Ok(Reply::unhandled()),
            },
            _ => Ok(Reply::unhandled()),
        };

        result.unwrap_or_else(Reply::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::messages::ActionRequest;
    use crate::infrastructure::providers::InMemoryCloud;

    fn agent_with(cloud: Arc<InMemoryCloud>) -> ComputeAgent {
        ComputeAgent::new(cloud, "us-east-2", &AgentSettings::default())
    }

    #[tokio::test]
    async fn create_uses_default_region_and_fallback_image() {
        let cloud = Arc::new(InMemoryCloud::with_default_regions());
        let agent = agent_with(cloud.clone());

        let reply = agent.create_instance(&CreateInstance::default()).await.unwrap();

        assert_eq!(reply.get("region"), Some(&json!("us-east-2")));
        assert_eq!(reply.get("region_name"), Some(&json!("Ohio")));
        assert_eq!(reply.get("ami_id"), Some(&json!("ami-0c55b159cbfafe1f0")));
        assert_eq!(reply.get("instance_type"), Some(&json!("t2.micro")));
        assert!(reply
            .message_text()
            .unwrap()
            .ends_with("created successfully in Ohio (us-east-2)"));
    }

    #[tokio::test]
    async fn create_without_region_uses_home_region() {
        let cloud = Arc::new(InMemoryCloud::with_default_regions());
        let agent = ComputeAgent::new(cloud.clone(), "eu-west-1", &AgentSettings::default());

        let reply = agent.create_instance(&CreateInstance::default()).await.unwrap();
        let listed = agent.list_instances().await.unwrap();

        assert_eq!(reply.get("region"), Some(&json!("eu-west-1")));
        assert_eq!(reply.get("region_name"), Some(&json!("Ireland")));
        assert_eq!(listed.get("instances").unwrap().as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_prefers_provider_image_and_maps_region() {
        let cloud = Arc::new(
            InMemoryCloud::with_default_regions().with_image("ap-northeast-1", "ami-tokyo"),
        );
        let agent = agent_with(cloud.clone());

        let reply = agent
            .create_instance(&CreateInstance {
                region: Some("Tokyo".to_string()),
                ..CreateInstance::default()
            })
            .await
            .unwrap();

        assert_eq!(reply.get("region"), Some(&json!("ap-northeast-1")));
        assert_eq!(reply.get("ami_id"), Some(&json!("ami-tokyo")));
    }

    #[tokio::test]
    async fn create_without_any_image_asks_for_one() {
        let cloud = Arc::new(InMemoryCloud::with_default_regions());
        let agent = agent_with(cloud);

        let result = agent
            .create_instance(&CreateInstance {
                region: Some("sydney".to_string()),
                ..CreateInstance::default()
            })
            .await;

        assert_eq!(
            result.unwrap_err().to_string(),
            "No AMI found for region ap-southeast-2. Please specify ami_id parameter."
        );
    }

    #[tokio::test]
    async fn stop_finds_instance_in_another_region() {
        let cloud = Arc::new(InMemoryCloud::with_default_regions());
        let instance = cloud.seed_instance("eu-west-2", "t3.small");
        let agent = agent_with(cloud.clone());

        let reply = agent.stop_instance(&instance.instance_id).await.unwrap();

        assert_eq!(reply.get("region_name"), Some(&json!("London")));
        assert_eq!(
            reply.message_text(),
            Some(
                format!(
                    "Instance {} stopped successfully in London (eu-west-2)",
                    instance.instance_id
                )
                .as_str()
            )
        );
    }

    #[tokio::test]
    async fn terminate_unknown_instance_is_not_located() {
        let agent = agent_with(Arc::new(InMemoryCloud::with_default_regions()));

        let error = agent.terminate_instance("rsc-unknown").await.unwrap_err();

        assert_eq!(error.to_string(), "Instance rsc-unknown not found in any region");
    }

    #[tokio::test]
    async fn queries_count_instances() {
        let cloud = Arc::new(InMemoryCloud::with_default_regions());
        cloud.seed_instance("us-east-2", "t2.micro");
        let stopped = cloud.seed_instance("us-east-2", "t2.micro");
        let agent = agent_with(cloud.clone());
        agent.stop_instance(&stopped.instance_id).await.unwrap();
        let ctx = agent.core().root_context();

        let ask = |text: &str| Message::new("S3Agent", ComputeAgent::NAME, Payload::query(text));

        let count = agent
            .handle(&ctx, &ask("How many instances does the user have?"))
            .await;
        let running = agent.handle(&ctx, &ask("running instances")).await;

        assert_eq!(count.count("count"), Some(2));
        assert_eq!(running.count("running_count"), Some(1));
    }

    #[tokio::test]
    async fn info_request_needs_an_id() {
        let agent = agent_with(Arc::new(InMemoryCloud::with_default_regions()));
        let ctx = agent.core().root_context();

        let reply = agent
            .handle(
                &ctx,
                &Message::new(
                    "CoordinatorAgent",
                    ComputeAgent::NAME,
                    Payload::request(ActionRequest::new("get_instance_info")),
                ),
            )
            .await;

        assert_eq!(reply.error_text(), Some("Please provide instance ID"));
    }

    #[tokio::test]
    async fn info_request_describes_instance() {
        let cloud = Arc::new(InMemoryCloud::with_default_regions());
        let instance = cloud.seed_instance("us-west-2", "t3.medium");
        let agent = agent_with(cloud);
        let ctx = agent.core().root_context();

        let request = ActionRequest::new("get_instance_info")
            .with_argument("instance_id", instance.instance_id.as_str());
        let reply = agent
            .handle(
                &ctx,
                &Message::new("CoordinatorAgent", ComputeAgent::NAME, Payload::request(request)),
            )
            .await;

        assert_eq!(reply.get("type"), Some(&json!("t3.medium")));
        assert_eq!(reply.get("region"), Some(&json!("us-west-2")));
    }
}
