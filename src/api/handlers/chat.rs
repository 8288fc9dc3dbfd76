use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::agents::Reply;
use crate::api::errors::ApiError;
use crate::api::routes::AppState;

/// Request body for a chat command
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Reply of the coordinator plus a success flag derived from it
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: Reply,
    pub success: bool,
}

/// Service banner
///
/// GET /
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Cloudmesh Multi-Agent API",
        "status": "running"
    }))
}

/// Health check endpoint
///
/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}

/// Run one natural-language command through the coordinator
///
/// POST /chat
pub async fn chat(
    State(network): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = req.message.trim().to_string();
    if message.is_empty() {
        return Err(ApiError::bad_request("Message must not be empty"));
    }

    // A panic inside an agent must not take the connection down with it
    let coordinator = network.coordinator().clone();
    let response = tokio::spawn(async move { coordinator.process_request(&message).await }).await?;

    let success = !response.is_error();
    debug!(success, "Chat command processed");

    Ok(Json(ChatResponse { response, success }))
}
