pub mod chat;
pub mod resources;
