//! Common types used throughout the matchmaking service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Unique identifier for players
pub type PlayerId = Uuid;

/// Unique identifier for matches
pub type MatchId = Uuid;

/// Geographic region a player queues in
///
/// Regions partition the matchmaking pool: players never match across
/// regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    Eu,
    Us,
    Asia,
}

impl Region {
    /// All regions the batch sweep iterates over
    pub const ALL: [Region; 3] = [Region::Eu, Region::Us, Region::Asia];
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Region::Eu => write!(f, "EU"),
            Region::Us => write!(f, "US"),
            Region::Asia => write!(f, "ASIA"),
        }
    }
}

/// Game mode a player queues for
///
/// The mode selects both the compatibility partition and the required group
/// size. Unrecognized mode strings collapse into `Unknown`, which keeps the
/// documented default group size of 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GameMode {
    OneVsOne,
    ThreeVsThree,
    Unknown,
}

impl GameMode {
    /// Modes the batch sweep iterates over
    pub const SWEPT: [GameMode; 2] = [GameMode::OneVsOne, GameMode::ThreeVsThree];

    /// Number of players required for a full match in this mode
    pub fn players_per_match(&self) -> usize {
        match self {
            GameMode::OneVsOne => 2,
            GameMode::ThreeVsThree => 6,
            GameMode::Unknown => 6,
        }
    }
}

impl From<String> for GameMode {
    fn from(value: String) -> Self {
        match value.as_str() {
            "1v1" => GameMode::OneVsOne,
            "3v3" => GameMode::ThreeVsThree,
            _ => GameMode::Unknown,
        }
    }
}

impl From<GameMode> for String {
    fn from(mode: GameMode) -> Self {
        mode.to_string()
    }
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameMode::OneVsOne => write!(f, "1v1"),
            GameMode::ThreeVsThree => write!(f, "3v3"),
            GameMode::Unknown => write!(f, "unknown"),
        }
    }
}

/// A player waiting in the matchmaking queue
///
/// Queue entries are immutable after creation: a player who wants different
/// parameters must leave and rejoin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// Integer skill score (MMR); given, never derived here
    pub rating: i32,
    pub region: Region,
    pub mode: GameMode,
    /// Informational only, not used in matching
    pub level: u32,
    /// Origin of the wait-time calculation, set once at queue-join time
    pub joined_at: DateTime<Utc>,
}

impl Player {
    /// Create a new queue entry with a fresh id and join timestamp
    pub fn new(rating: i32, region: Region, mode: GameMode, level: u32) -> Self {
        Self {
            id: crate::utils::generate_player_id(),
            rating,
            region,
            mode,
            level,
            joined_at: crate::utils::current_timestamp(),
        }
    }

    /// How long this player has been waiting in the queue
    pub fn wait_time(&self) -> Duration {
        (Utc::now() - self.joined_at).to_std().unwrap_or_default()
    }
}

/// A completed match of exactly `players_per_match` players
///
/// Players are snapshots taken at assembly time, not live queue references.
/// A match is created once and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub players: Vec<Player>,
    pub created_at: DateTime<Utc>,
}

impl Match {
    /// Create a match from an assembled group of player snapshots
    pub fn new(players: Vec<Player>) -> Self {
        Self {
            id: crate::utils::generate_match_id(),
            players,
            created_at: crate::utils::current_timestamp(),
        }
    }
}

/// Request body for joining the matchmaking queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueRequest {
    pub rating: i32,
    pub region: Region,
    #[serde(rename = "game_mode")]
    pub mode: GameMode,
    #[serde(default)]
    pub player_level: u32,
}
