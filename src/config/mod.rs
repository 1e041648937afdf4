//! Configuration management for the matchmaking service

pub mod app;

pub use app::{ApiSettings, AppConfig, MatchingSettings, ServiceSettings};
