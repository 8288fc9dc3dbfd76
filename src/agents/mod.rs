// Agent system modules
//
// Named agents that exchange messages in-process: a coordinator that turns
// commands into intents and two resource agents backed by provider ports.

pub mod base;
pub mod compute;
pub mod coordinator;
pub mod errors;
pub mod history;
pub mod messages;
pub mod network;
pub mod params;
pub mod storage;
pub mod types;

// Re-export main types
pub use base::{Agent, AgentCore, AgentSettings, CallContext, Directory, DEFAULT_MAX_HOPS};
pub use compute::{ComputeAgent, CreateInstance};
pub use coordinator::CoordinatorAgent;
pub use errors::{AgentError, AgentResult};
pub use messages::{ActionRequest, ConversationRecord, Message, MessageKind, Payload};
pub use network::AgentNetwork;
pub use storage::StorageAgent;
pub use types::Reply;
