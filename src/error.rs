//! Error types for the matchmaking service
//!
//! This module defines all error types using anyhow for consistent error
//! handling throughout the application.

use crate::types::PlayerId;

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific matchmaking scenarios
///
/// `NoMatchFound` and `StoreUnavailable` are deliberately distinct: the
/// former means "retry later", the latter means the backing store failed
/// and the caller should surface an error.
#[derive(Debug, thiserror::Error)]
pub enum MatchmakingError {
    #[error("player not found in queue: {player_id}")]
    PlayerNotFound { player_id: PlayerId },

    #[error("no match recorded for player: {player_id}")]
    MatchNotFound { player_id: PlayerId },

    #[error("no suitable match found for player: {player_id}")]
    NoMatchFound { player_id: PlayerId },

    #[error("queue store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("invalid queue request: {reason}")]
    InvalidQueueRequest { reason: String },

    #[error("configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("internal service error: {message}")]
    InternalError { message: String },
}
