//! Queue store interface and implementations
//!
//! The matching engine only consumes the `QueueStore` contract; everything
//! about persistence lives behind this seam.

pub mod memory;

use crate::error::Result;
use crate::types::{GameMode, Match, Player, PlayerId, Region};
use async_trait::async_trait;

/// Storage contract consumed by the matching engine
///
/// A partition is the queue scoped to one (region, mode) pair, ordered by
/// rating. Implementations must make each call atomic on its own: the engine
/// performs no cross-call locking.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Insert or overwrite a player entry in its partition
    ///
    /// Idempotent for a duplicate identical insert. The entry carries a
    /// bounded expiry independent of matching logic.
    async fn enqueue(&self, player: &Player) -> Result<()>;

    /// Conditionally remove a player from its partition and direct lookup
    ///
    /// Fails with `PlayerNotFound` if the entry is already gone; callers in
    /// the match-commit path treat that as "this player was already claimed"
    /// rather than a fatal error.
    async fn dequeue(&self, player_id: PlayerId) -> Result<()>;

    /// Players in the partition with rating in `[min, max]`, ascending by
    /// rating, at most `limit` entries
    async fn range_by_rating(
        &self,
        region: Region,
        mode: GameMode,
        min_rating: i32,
        max_rating: i32,
        limit: usize,
    ) -> Result<Vec<Player>>;

    /// Direct lookup of a queued player by id
    async fn get_by_id(&self, player_id: PlayerId) -> Result<Option<Player>>;

    /// The persisted match containing this player, if any
    ///
    /// Supports idempotent re-query of `find_match`.
    async fn match_for_player(&self, player_id: PlayerId) -> Result<Option<Match>>;

    /// Durably record a completed match for every member
    async fn save_match(&self, matched: &Match) -> Result<()>;

    /// Number of players currently waiting in the partition
    async fn partition_size(&self, region: Region, mode: GameMode) -> Result<usize>;
}

pub use memory::InMemoryQueueStore;
