use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::base::{Agent, AgentCore, AgentSettings, CallContext};
use super::compute::{ComputeAgent, CreateInstance};
use super::errors::{AgentError, AgentResult};
use super::messages::{ActionRequest, Payload};
use super::params::{
    extract_bucket_name, extract_instance_id, extract_instance_type, extract_region, resolve,
    DEFAULT_INSTANCE_TYPE,
};
use super::storage::StorageAgent;
use super::types::Reply;
use crate::intent::{ComputeAction, Intent, IntentService, Service, StorageAction};

const BUCKET_COUNT_QUERY: &str = "How many buckets does the user have?";
const INSTANCE_COUNT_QUERY: &str = "How many instances does the user have?";

/// Entry point for natural-language commands
///
/// Resolves each command to an [`Intent`] and dispatches it to the compute or
/// storage agent. Every branch of the dispatch table produces a [`Reply`];
/// errors become `{error}` replies here and never escape.
pub struct CoordinatorAgent {
    core: AgentCore,
    compute: Arc<ComputeAgent>,
    storage: Arc<StorageAgent>,
    intents: Arc<dyn IntentService>,
}

impl CoordinatorAgent {
    pub const NAME: &'static str = "CoordinatorAgent";

    pub fn new(
        compute: Arc<ComputeAgent>,
        storage: Arc<StorageAgent>,
        intents: Arc<dyn IntentService>,
        settings: &AgentSettings,
    ) -> Self {
        Self {
            core: AgentCore::new(Self::NAME, settings),
            compute,
            storage,
            intents,
        }
    }

    pub fn compute(&self) -> &Arc<ComputeAgent> {
        &self.compute
    }

    pub fn storage(&self) -> &Arc<StorageAgent> {
        &self.storage
    }

    pub fn intents(&self) -> &dyn IntentService {
        self.intents.as_ref()
    }

    pub async fn process_request(&self, text: &str) -> Reply {
        info!("Processing: {}", text);
        let intent = self.intents.parse_intent(text).await;
        debug!(service = ?intent.service, action = %intent.action, "Intent resolved");

        let ctx = self.core.root_context();
        let result = match intent.service {
            Service::Compute => self.dispatch_compute(&ctx, &intent, text).await,
            Service::Storage => self.dispatch_storage(&ctx, &intent, text).await,
            Service::Unknown => Ok(self.converse(&intent, text).await),
        };

        result.unwrap_or_else(|e| {
            warn!(error = %e, action = %intent.action, "Request failed");
            Reply::from(e)
        })
    }

    /// Query a peer outside of a command, e.g. for status reporting
    pub async fn ask(&self, peer: &str, text: &str) -> Reply {
        let ctx = self.core.root_context();
        self.core
            .query(&ctx, peer, text)
            .await
            .unwrap_or_else(Reply::from)
    }

    async fn dispatch_compute(
        &self,
        ctx: &CallContext,
        intent: &Intent,
        text: &str,
    ) -> AgentResult<Reply> {
        match intent.action.parse::<ComputeAction>()? {
            ComputeAction::CreateInstance => {
                let request = CreateInstance {
                    instance_type: resolve(intent, "instance_type", text, extract_instance_type)
                        .unwrap_or_else(|| DEFAULT_INSTANCE_TYPE.to_string()),
                    region: resolve(intent, "region", text, extract_region),
                    image_id: intent.param("ami_id"),
                    key_name: intent.param("key_name"),
                    tags: tags(intent),
                };

                let buckets = self.peer_count(ctx, StorageAgent::NAME, BUCKET_COUNT_QUERY).await;
                let mut reply = self.compute.create_instance(&request).await?;
                if let Some(count) = buckets.filter(|count| *count > 0) {
                    reply.insert(
                        "tip",
                        format!(
                            "You have {} S3 bucket(s). You can use them with this instance!",
                            count
                        ),
                    );
                }
                Ok(reply)
            }
            ComputeAction::ListInstances => {
                self.core
                    .send(
                        ctx,
                        ComputeAgent::NAME,
                        Payload::request(ActionRequest::new("list_instances")),
                    )
                    .await
            }
            ComputeAction::StopInstance => {
                let instance_id = required_instance_id(intent, text)?;
                self.compute.stop_instance(&instance_id).await
            }
            ComputeAction::TerminateInstance => {
                let instance_id = required_instance_id(intent, text)?;
                self.compute.terminate_instance(&instance_id).await
            }
        }
    }

    async fn dispatch_storage(
        &self,
        ctx: &CallContext,
        intent: &Intent,
        text: &str,
    ) -> AgentResult<Reply> {
        match intent.action.parse::<StorageAction>()? {
            StorageAction::CreateBucket => {
                let bucket_name = required_bucket_name(intent, text)?;
                let region = resolve(intent, "region", text, extract_region);

                let instances = self
                    .peer_count(ctx, ComputeAgent::NAME, INSTANCE_COUNT_QUERY)
                    .await;
                let mut reply = self
                    .storage
                    .create_bucket(&bucket_name, region.as_deref())
                    .await?;
                if let Some(count) = instances.filter(|count| *count > 0) {
                    reply.insert(
                        "tip",
                        format!(
                            "You have {} EC2 instance(s). You can access this bucket from them!",
                            count
                        ),
                    );
                }
                Ok(reply)
            }
            StorageAction::ListBuckets => {
                self.core
                    .send(
                        ctx,
                        StorageAgent::NAME,
                        Payload::request(ActionRequest::new("list_buckets")),
                    )
                    .await
            }
            StorageAction::ListObjects => {
                let bucket_name = required_bucket_name(intent, text)?;
                self.storage.list_objects(&bucket_name).await
            }
            StorageAction::DeleteBucket => {
                let bucket_name = required_bucket_name(intent, text)?;
                let force = intent
                    .parameters
                    .get("force")
                    .and_then(Value::as_bool)
                    .unwrap_or_else(|| text.to_lowercase().contains("force"));
                self.storage.delete_bucket(&bucket_name, force).await
            }
        }
    }

    async fn converse(&self, intent: &Intent, text: &str) -> Reply {
        let message = self.intents.conversational_response(text).await;
        let reply = Reply::message(message);

        match intent.action.as_str() {
            "greeting" | "help" => reply.with("greeting", true),
            _ => reply,
        }
    }

    /// Best-effort count from a peer; any failure reads as "no context"
    async fn peer_count(&self, ctx: &CallContext, peer: &str, question: &str) -> Option<u64> {
        match self.core.query(ctx, peer, question).await {
            Ok(reply) if !reply.is_error() => reply.count("count"),
            Ok(reply) => {
                debug!(peer = %peer, error = ?reply.error_text(), "Enrichment query failed");
                None
            }
            Err(e) => {
                debug!(peer = %peer, error = %e, "Enrichment query not delivered");
                None
            }
        }
    }
}

fn required_instance_id(intent: &Intent, text: &str) -> AgentResult<String> {
    resolve(intent, "instance_id", text, extract_instance_id)
        .ok_or(AgentError::MissingParameter("instance ID"))
}

fn required_bucket_name(intent: &Intent, text: &str) -> AgentResult<String> {
    resolve(intent, "bucket_name", text, extract_bucket_name)
        .ok_or(AgentError::MissingParameter("bucket name"))
}

fn tags(intent: &Intent) -> BTreeMap<String, String> {
    intent
        .parameters
        .get("tags")
        .and_then(Value::as_object)
        .map(|tags| {
            tags.iter()
                .filter_map(|(key, value)| value.as_str().map(|v| (key.clone(), v.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl Agent for CoordinatorAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }
}
