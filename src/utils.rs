//! Utility functions for the matchmaking service

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique player ID
pub fn generate_player_id() -> Uuid {
    Uuid::new_v4()
}

/// Generate a new unique match ID
pub fn generate_match_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Calculate the absolute difference between two ratings
///
/// Widened to i64 so extreme i32 ratings cannot overflow.
pub fn rating_difference(rating1: i32, rating2: i32) -> i64 {
    (i64::from(rating1) - i64::from(rating2)).abs()
}
