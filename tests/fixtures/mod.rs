//! Shared fixtures for integration tests

use chrono::Utc;
use rally_point::config::MatchingSettings;
use rally_point::metrics::MetricsCollector;
use rally_point::types::{GameMode, Player, Region};
use rally_point::{InMemoryQueueStore, QueueStore};
use std::sync::Arc;

/// Default matching settings used across integration tests
pub fn test_settings() -> MatchingSettings {
    MatchingSettings::default()
}

/// Fresh in-memory store behind the engine's store seam
pub fn test_store() -> Arc<InMemoryQueueStore> {
    Arc::new(InMemoryQueueStore::default())
}

/// Fresh metrics collector with its own registry
pub fn test_metrics() -> Arc<MetricsCollector> {
    Arc::new(MetricsCollector::new().expect("Failed to create metrics collector"))
}

/// A player who joined the queue `waited_secs` seconds ago
pub fn player_with_wait(rating: i32, region: Region, mode: GameMode, waited_secs: i64) -> Player {
    let mut player = Player::new(rating, region, mode, 1);
    player.joined_at = Utc::now() - chrono::Duration::seconds(waited_secs);
    player
}

/// Enqueue a batch of players
pub async fn enqueue_all(store: &Arc<InMemoryQueueStore>, players: &[Player]) {
    for player in players {
        store.enqueue(player).await.expect("Failed to enqueue");
    }
}
