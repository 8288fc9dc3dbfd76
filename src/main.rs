use std::sync::Arc;

use cloudmesh::api;
use cloudmesh::bootstrap::build_network;
use cloudmesh::config::AppConfig;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = AppConfig::from_env().expect("Invalid configuration");

    // Assemble agents
    tracing::info!("Assembling agent network...");
    let network = build_network(&config).expect("Failed to assemble agent network");

    // Build router
    let app = api::router(Arc::new(network));

    // Start server
    tracing::info!("Server listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .await
        .expect("Server failed");
}
