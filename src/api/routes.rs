use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{chat, resources};
use crate::agents::AgentNetwork;

/// Shared state of every handler
pub type AppState = Arc<AgentNetwork>;

/// Build the HTTP router over an assembled agent network
pub fn router(network: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(chat::root))
        .route("/health", get(chat::health_check))
        .route("/chat", post(chat::chat))
        .route("/instances", get(resources::list_instances))
        .route("/buckets", get(resources::list_buckets))
        .route("/status", get(resources::status))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Shared state
        .with_state(network)
}
