//! On-demand single-player matching
//!
//! Driven by an inbound "find match for player P" request: look up the
//! player's queue entry, fetch candidates inside the current rating window,
//! and greedily assemble one full group.

use crate::config::MatchingSettings;
use crate::error::{MatchmakingError, Result};
use crate::matcher::{assembly, compatible, rating_window};
use crate::metrics::collector::MatchSource;
use crate::metrics::MetricsCollector;
use crate::store::QueueStore;
use crate::types::{Match, PlayerId};
use std::sync::Arc;
use tracing::{debug, info};

/// Matcher for the request-driven path
#[derive(Clone)]
pub struct OnDemandMatcher {
    store: Arc<dyn QueueStore>,
    settings: MatchingSettings,
    metrics: Arc<MetricsCollector>,
}

impl OnDemandMatcher {
    pub fn new(
        store: Arc<dyn QueueStore>,
        settings: MatchingSettings,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            store,
            settings,
            metrics,
        }
    }

    /// Try to assemble a match around the given player
    ///
    /// Idempotent for an already-matched player: re-querying returns the
    /// persisted match instead of erroring. Fails with `PlayerNotFound` when
    /// the player has no queue entry and `NoMatchFound` when not enough
    /// compatible candidates are waiting; the caller may retry the latter.
    pub async fn find_match(&self, player_id: PlayerId) -> Result<Match> {
        if let Some(existing) = self.store.match_for_player(player_id).await? {
            info!(
                match_id = %existing.id,
                player_id = %player_id,
                "Returning already persisted match"
            );
            return Ok(existing);
        }

        let player = self
            .store
            .get_by_id(player_id)
            .await?
            .ok_or(MatchmakingError::PlayerNotFound { player_id })?;

        let required = player.mode.players_per_match();
        let window = rating_window(&self.settings, player.wait_time());

        // Oversample: identity and compatibility filtering below can drop
        // candidates from the returned range
        let candidates = self
            .store
            .range_by_rating(
                player.region,
                player.mode,
                player.rating.saturating_sub(window),
                player.rating.saturating_add(window),
                required * 2,
            )
            .await?;

        debug!(
            player_id = %player_id,
            window,
            candidates = candidates.len(),
            required,
            "Scanning candidates for on-demand match"
        );

        let mut group = Vec::with_capacity(required);
        group.push(player.clone());

        for candidate in candidates {
            if candidate.id == player.id {
                continue;
            }
            if compatible(&player, &candidate, window) {
                group.push(candidate);
                if group.len() >= required {
                    break;
                }
            }
        }

        if group.len() < required {
            return Err(MatchmakingError::NoMatchFound { player_id }.into());
        }

        let matched = assembly::commit_group(self.store.as_ref(), group).await?;
        self.metrics
            .record_match_created(player.mode, MatchSource::OnDemand, matched.players.len());
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MatchmakingError;
    use crate::store::MockQueueStore;
    use crate::types::{GameMode, Player, Region};
    use crate::InMemoryQueueStore;

    fn matcher(store: Arc<dyn QueueStore>) -> OnDemandMatcher {
        OnDemandMatcher::new(
            store,
            MatchingSettings::default(),
            Arc::new(MetricsCollector::new().unwrap()),
        )
    }

    #[tokio::test]
    async fn test_find_match_pairs_two_duel_players() {
        let store = Arc::new(InMemoryQueueStore::default());
        let a = Player::new(1500, Region::Eu, GameMode::OneVsOne, 1);
        let b = Player::new(1550, Region::Eu, GameMode::OneVsOne, 1);
        store.enqueue(&a).await.unwrap();
        store.enqueue(&b).await.unwrap();

        let matched = matcher(store.clone()).find_match(a.id).await.unwrap();

        assert_eq!(matched.players.len(), 2);
        let ids: Vec<PlayerId> = matched.players.iter().map(|p| p.id).collect();
        assert!(ids.contains(&a.id));
        assert!(ids.contains(&b.id));

        // Both members left the queue
        assert!(store.get_by_id(a.id).await.unwrap().is_none());
        assert!(store.get_by_id(b.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_player_is_not_found() {
        let store = Arc::new(InMemoryQueueStore::default());

        let err = matcher(store)
            .find_match(crate::utils::generate_player_id())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MatchmakingError>(),
            Some(MatchmakingError::PlayerNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_lone_player_gets_no_match_and_stays_queued() {
        let store = Arc::new(InMemoryQueueStore::default());
        let a = Player::new(1500, Region::Eu, GameMode::OneVsOne, 1);
        store.enqueue(&a).await.unwrap();

        let err = matcher(store.clone()).find_match(a.id).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MatchmakingError>(),
            Some(MatchmakingError::NoMatchFound { .. })
        ));

        // No partial group was persisted or removed
        assert!(store.get_by_id(a.id).await.unwrap().is_some());
        assert!(store.match_for_player(a.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_candidates_outside_window_rejected() {
        let store = Arc::new(InMemoryQueueStore::default());
        let a = Player::new(1500, Region::Eu, GameMode::OneVsOne, 1);
        // 201 above the anchor, just past the 200-wide base window
        let far = Player::new(1500 + 201, Region::Eu, GameMode::OneVsOne, 1);
        store.enqueue(&a).await.unwrap();
        store.enqueue(&far).await.unwrap();

        let err = matcher(store).find_match(a.id).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MatchmakingError>(),
            Some(MatchmakingError::NoMatchFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_repeated_find_match_is_idempotent() {
        let store = Arc::new(InMemoryQueueStore::default());
        let a = Player::new(1500, Region::Eu, GameMode::OneVsOne, 1);
        let b = Player::new(1520, Region::Eu, GameMode::OneVsOne, 1);
        store.enqueue(&a).await.unwrap();
        store.enqueue(&b).await.unwrap();

        let matcher = matcher(store);
        let first = matcher.find_match(a.id).await.unwrap();
        let second = matcher.find_match(a.id).await.unwrap();
        let by_partner = matcher.find_match(b.id).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.id, by_partner.id);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut store = MockQueueStore::new();
        store
            .expect_match_for_player()
            .returning(|_| Ok(None));
        store.expect_get_by_id().returning(|_| {
            Err(MatchmakingError::StoreUnavailable {
                message: "timeout".to_string(),
            }
            .into())
        });

        let err = matcher(Arc::new(store))
            .find_match(crate::utils::generate_player_id())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MatchmakingError>(),
            Some(MatchmakingError::StoreUnavailable { .. })
        ));
    }
}
