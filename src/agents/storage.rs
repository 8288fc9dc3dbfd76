use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

use super::base::{Agent, AgentCore, AgentSettings, CallContext};
use super::errors::{AgentError, AgentResult};
use super::messages::{Message, Payload};
use super::types::Reply;
use crate::domain::providers::StorageProvider;
use crate::domain::region::map_region;
use crate::domain::resources::Bucket;

/// Storage resource agent
pub struct StorageAgent {
    core: AgentCore,
    provider: Arc<dyn StorageProvider>,
    home_region: String,
}

impl StorageAgent {
    pub const NAME: &'static str = "S3Agent";

    pub fn new(
        provider: Arc<dyn StorageProvider>,
        home_region: impl Into<String>,
        settings: &AgentSettings,
    ) -> Self {
        Self {
            core: AgentCore::new(Self::NAME, settings),
            provider,
            home_region: home_region.into(),
        }
    }

    /// Create a bucket; without a region it lands in the home region
    pub async fn create_bucket(
        &self,
        bucket_name: &str,
        region: Option<&str>,
    ) -> AgentResult<Reply> {
        let region = match region {
            Some(region) => map_region(Some(region)),
            None => self.home_region.as_str(),
        };

        let bucket = self.provider.create_bucket(bucket_name, region).await?;
        info!(bucket = %bucket.name, region = %bucket.region, "Bucket created");

        Ok(Reply::ok()
            .with("bucket_name", &bucket.name)
            .with("region", &bucket.region)
            .with(
                "message",
                format!(
                    "S3 bucket '{}' created successfully in {}",
                    bucket.name, bucket.region
                ),
            ))
    }

    async fn buckets(&self) -> AgentResult<Vec<Bucket>> {
        Ok(self.provider.list_buckets().await?)
    }

    pub async fn list_buckets(&self) -> AgentResult<Reply> {
        let buckets = self.buckets().await?;
        Ok(Reply::ok().with("buckets", summaries(&buckets)))
    }

    /// Delete a bucket, emptying it first when `force` is set
    pub async fn delete_bucket(&self, bucket_name: &str, force: bool) -> AgentResult<Reply> {
        if force {
            let objects = self.provider.list_objects(bucket_name).await?;
            debug!(bucket = %bucket_name, objects = objects.len(), "Emptying bucket");
            for object in objects {
                self.provider.delete_object(bucket_name, &object.key).await?;
            }
        }

        self.provider.delete_bucket(bucket_name).await?;
        info!(bucket = %bucket_name, "Bucket deleted");

        Ok(
            Reply::success(format!("S3 bucket '{}' deleted successfully", bucket_name))
                .with("bucket_name", bucket_name),
        )
    }

    pub async fn list_objects(&self, bucket_name: &str) -> AgentResult<Reply> {
        let objects: Vec<Value> = self
            .provider
            .list_objects(bucket_name)
            .await?
            .into_iter()
            .map(|object| {
                json!({
                    "key": object.key,
                    "size": object.size,
                    "last_modified": object.last_modified.to_rfc3339(),
                })
            })
            .collect();

        Ok(Reply::ok()
            .with("bucket_name", bucket_name)
            .with("objects", objects))
    }

    /// A probe failure reads as "does not exist"
    pub async fn bucket_exists(&self, bucket_name: &str) -> Reply {
        let exists = self
            .provider
            .head_bucket(bucket_name)
            .await
            .unwrap_or(false);
        Reply::new()
            .with("exists", exists)
            .with("bucket_name", bucket_name)
    }

    async fn answer_query(&self, text: &str) -> AgentResult<Reply> {
        let text = text.to_lowercase();

        if text.contains("bucket") && (text.contains("count") || text.contains("how many")) {
            let buckets = self.buckets().await?;
            return Ok(Reply::new()
                .with("count", buckets.len())
                .with("buckets", summaries(&buckets)));
        }

        if text.contains("storage") || text.contains("size") {
            return Ok(Reply::message(
                "Storage size calculation requires CloudWatch metrics",
            ));
        }

        Ok(Reply::unhandled())
    }
}

fn summaries(buckets: &[Bucket]) -> Vec<Value> {
    buckets
        .iter()
        .map(|bucket| {
            json!({
                "name": bucket.name,
                "region": bucket.region,
                "creation_date": bucket.creation_date.to_rfc3339(),
            })
        })
        .collect()
}

#[async_trait]
impl Agent for StorageAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    async fn handle(&self, _ctx: &CallContext, message: &Message) -> Reply {
        let result = match message.payload() {
            Payload::Query { text } => self.answer_query(text).await,
            Payload::Request(request) => match request.action.as_str() {
                "list_buckets" => self.list_buckets().await,
                "bucket_exists" => match request.argument("bucket_name") {
                    Some(bucket_name) => Ok(self.bucket_exists(bucket_name).await),
                    None => Err(AgentError::MissingParameter("bucket name")),
                },
                _ => Ok(Reply::unhandled()),
            },
            _ => Ok(Reply::unhandled()),
        };

        result.unwrap_or_else(Reply::from)
    }
}
