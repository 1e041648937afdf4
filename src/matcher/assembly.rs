//! Shared group commit logic
//!
//! Both matching strategies finish the same way: snapshot the assembled
//! group into a match, persist it, then dequeue every member.

use crate::error::Result;
use crate::store::QueueStore;
use crate::types::{Match, Player};
use tracing::{info, warn};

/// Persist a full group as a match, then remove its members from the queue
///
/// Ordering invariant: the match is persisted before any member is removed,
/// so a crash in between can only leave a stale queue entry, never lose a
/// match. A persist failure aborts and propagates; dequeue failures after
/// the match is durable are logged and tolerated, since an absent entry
/// means the player was already claimed or expired.
pub(crate) async fn commit_group(store: &dyn QueueStore, group: Vec<Player>) -> Result<Match> {
    let matched = Match::new(group);

    store.save_match(&matched).await?;

    for player in &matched.players {
        if let Err(e) = store.dequeue(player.id).await {
            warn!(
                player_id = %player.id,
                match_id = %matched.id,
                error = %e,
                "Failed to dequeue matched player; entry already claimed or expired"
            );
        }
    }

    info!(
        match_id = %matched.id,
        players = matched.players.len(),
        "Match persisted"
    );

    Ok(matched)
}
