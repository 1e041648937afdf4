//! In-memory queue store implementation
//!
//! Backs the service with per-partition ordered maps keyed by (rating, id),
//! which gives the ascending-by-rating range scans the engine relies on.
//! Queue entries expire lazily once their TTL elapses.

use crate::error::{MatchmakingError, Result};
use crate::store::QueueStore;
use crate::types::{GameMode, Match, MatchId, Player, PlayerId, Region};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::time::Duration;
use uuid::Uuid;

type PartitionKey = (Region, GameMode);

#[derive(Debug, Default)]
struct StoreInner {
    /// Ordered membership per partition; (rating, id) keys keep range scans
    /// ascending by rating with a stable tie-break
    partitions: HashMap<PartitionKey, BTreeMap<(i32, PlayerId), ()>>,
    /// Direct lookup of queued players
    players: HashMap<PlayerId, Player>,
    /// Persisted matches
    matches: HashMap<MatchId, Match>,
    /// Which match each matched player belongs to
    match_index: HashMap<PlayerId, MatchId>,
}

/// In-memory queue store
///
/// All operations are atomic under a single process-wide lock, which is the
/// per-call atomicity the engine's contract asks for.
#[derive(Debug)]
pub struct InMemoryQueueStore {
    inner: RwLock<StoreInner>,
    entry_ttl: Duration,
}

impl InMemoryQueueStore {
    /// Create a store whose queue entries expire after `entry_ttl`
    pub fn new(entry_ttl: Duration) -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            entry_ttl,
        }
    }

    fn write_lock(&self) -> Result<std::sync::RwLockWriteGuard<'_, StoreInner>> {
        Ok(self
            .inner
            .write()
            .map_err(|_| MatchmakingError::InternalError {
                message: "Failed to acquire queue store write lock".to_string(),
            })?)
    }

    fn is_expired(&self, player: &Player) -> bool {
        match (Utc::now() - player.joined_at).to_std() {
            Ok(age) => age > self.entry_ttl,
            // joined_at in the future; treat as fresh
            Err(_) => false,
        }
    }

    /// Drop an expired entry from both indexes
    fn evict(inner: &mut StoreInner, player: &Player) {
        inner.players.remove(&player.id);
        if let Some(partition) = inner.partitions.get_mut(&(player.region, player.mode)) {
            partition.remove(&(player.rating, player.id));
        }
    }
}

impl Default for InMemoryQueueStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(1800)) // 30 minute entry TTL
    }
}

#[async_trait]
impl QueueStore for InMemoryQueueStore {
    async fn enqueue(&self, player: &Player) -> Result<()> {
        let mut inner = self.write_lock()?;

        // Re-enqueue under the same id replaces the previous entry
        if let Some(existing) = inner.players.remove(&player.id) {
            if let Some(partition) = inner
                .partitions
                .get_mut(&(existing.region, existing.mode))
            {
                partition.remove(&(existing.rating, existing.id));
            }
        }

        inner
            .partitions
            .entry((player.region, player.mode))
            .or_default()
            .insert((player.rating, player.id), ());
        inner.players.insert(player.id, player.clone());

        Ok(())
    }

    async fn dequeue(&self, player_id: PlayerId) -> Result<()> {
        let mut inner = self.write_lock()?;

        // Conditional removal: absent entry means someone else claimed it
        let player = inner
            .players
            .remove(&player_id)
            .ok_or(MatchmakingError::PlayerNotFound { player_id })?;

        if let Some(partition) = inner.partitions.get_mut(&(player.region, player.mode)) {
            partition.remove(&(player.rating, player.id));
        }

        Ok(())
    }

    async fn range_by_rating(
        &self,
        region: Region,
        mode: GameMode,
        min_rating: i32,
        max_rating: i32,
        limit: usize,
    ) -> Result<Vec<Player>> {
        if min_rating > max_rating || limit == 0 {
            return Ok(Vec::new());
        }

        let mut inner = self.write_lock()?;

        let keys: Vec<(i32, PlayerId)> = match inner.partitions.get(&(region, mode)) {
            Some(partition) => partition
                .range((min_rating, Uuid::nil())..=(max_rating, Uuid::max()))
                .map(|(key, _)| *key)
                .collect(),
            None => return Ok(Vec::new()),
        };

        let mut results = Vec::with_capacity(limit.min(keys.len()));
        for (_, player_id) in keys {
            let Some(player) = inner.players.get(&player_id).cloned() else {
                continue;
            };
            if self.is_expired(&player) {
                Self::evict(&mut inner, &player);
                continue;
            }
            results.push(player);
            if results.len() >= limit {
                break;
            }
        }

        Ok(results)
    }

    async fn get_by_id(&self, player_id: PlayerId) -> Result<Option<Player>> {
        let mut inner = self.write_lock()?;

        match inner.players.get(&player_id).cloned() {
            Some(player) if self.is_expired(&player) => {
                Self::evict(&mut inner, &player);
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn match_for_player(&self, player_id: PlayerId) -> Result<Option<Match>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| MatchmakingError::InternalError {
                message: "Failed to acquire queue store read lock".to_string(),
            })?;

        Ok(inner
            .match_index
            .get(&player_id)
            .and_then(|match_id| inner.matches.get(match_id))
            .cloned())
    }

    async fn save_match(&self, matched: &Match) -> Result<()> {
        let mut inner = self.write_lock()?;

        for player in &matched.players {
            inner.match_index.insert(player.id, matched.id);
        }
        inner.matches.insert(matched.id, matched.clone());

        Ok(())
    }

    async fn partition_size(&self, region: Region, mode: GameMode) -> Result<usize> {
        let mut inner = self.write_lock()?;

        let keys: Vec<(i32, PlayerId)> = match inner.partitions.get(&(region, mode)) {
            Some(partition) => partition.keys().copied().collect(),
            None => return Ok(0),
        };

        let mut count = 0;
        for (_, player_id) in keys {
            let Some(player) = inner.players.get(&player_id).cloned() else {
                continue;
            };
            if self.is_expired(&player) {
                Self::evict(&mut inner, &player);
            } else {
                count += 1;
            }
        }

        Ok(count)
    }
}
