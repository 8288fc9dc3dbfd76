// Infrastructure layer module
// Contains cloud provider adapters and external service integrations
// Follows Hexagonal Architecture

pub mod providers;
