//! Rally Point - Skill-based matchmaking microservice
//!
//! This crate provides HTTP-driven matchmaking with region/mode scoped
//! queues, wait-time based rating window expansion, and greedy group
//! assembly for fixed-size matches.

pub mod api;
pub mod config;
pub mod error;
pub mod matcher;
pub mod metrics;
pub mod service;
pub mod store;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{MatchmakingError, Result};
pub use types::*;

// Re-export key components
pub use matcher::{BatchMatcher, OnDemandMatcher};
pub use store::{InMemoryQueueStore, QueueStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
