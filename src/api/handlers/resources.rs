use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::agents::{Agent, ComputeAgent, Reply, StorageAgent};
use crate::api::routes::AppState;

/// Conversation records included in the status report
const STATUS_HISTORY_LEN: usize = 5;

/// List instances in the home region
///
/// GET /instances
pub async fn list_instances(State(network): State<AppState>) -> Json<Reply> {
    Json(
        network
            .compute()
            .list_instances()
            .await
            .unwrap_or_else(Reply::from),
    )
}

/// List buckets
///
/// GET /buckets
pub async fn list_buckets(State(network): State<AppState>) -> Json<Reply> {
    Json(
        network
            .storage()
            .list_buckets()
            .await
            .unwrap_or_else(Reply::from),
    )
}

/// System status gathered over agent-to-agent queries
///
/// GET /status
pub async fn status(State(network): State<AppState>) -> Json<Value> {
    let coordinator = network.coordinator();
    let compute_info = coordinator
        .ask(ComputeAgent::NAME, "How many running instances?")
        .await;
    let storage_info = coordinator.ask(StorageAgent::NAME, "How many buckets?").await;
    let [coordinator_name, compute_name, storage_name] = network.agent_names();

    Json(json!({
        "status": "running",
        "a2a_enabled": true,
        "llm_client": coordinator.intents().name(),
        "cache_size": coordinator.intents().cached_intents(),
        "agents": {
            "coordinator": coordinator_name,
            "ec2": compute_name,
            "s3": storage_name,
        },
        "resources": {
            "ec2": compute_info,
            "s3": storage_info,
        },
        "conversation_history": coordinator.core().recent_history(STATUS_HISTORY_LEN),
    }))
}
