// Provider implementations
// Adapters that implement the domain provider ports

pub mod memory_cloud;

pub use memory_cloud::InMemoryCloud;
