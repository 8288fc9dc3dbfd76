// API layer module (adapters for controllers)
// Follows Hexagonal Architecture - API is an adapter over the agent network

pub mod errors;
pub mod handlers;
pub mod routes;

pub use routes::router;
