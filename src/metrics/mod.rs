//! Metrics collection for the matchmaking service

pub mod collector;

pub use collector::{MatchSource, MetricsCollector};
