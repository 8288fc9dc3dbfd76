// Domain layer module exports
// Following Hexagonal Architecture: provider ports live here,
// adapters live in infrastructure

pub mod providers;
pub mod region;
pub mod resources;
