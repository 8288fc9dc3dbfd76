//! Cloudmesh Library
//!
//! Natural-language management of compute and storage resources through a
//! small network of cooperating agents, plus the HTTP and chat front ends.

pub mod agents;
pub mod api;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod intent;
