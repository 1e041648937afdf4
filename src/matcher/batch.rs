//! Periodic batch matching over one partition
//!
//! A timer drives one `process_queue` call per (region, mode) pair. Each
//! call scans the whole partition once and greedily carves out as many
//! disjoint full-size groups as it can.

use crate::config::MatchingSettings;
use crate::error::Result;
use crate::matcher::{assembly, compatible, rating_window};
use crate::metrics::collector::MatchSource;
use crate::metrics::MetricsCollector;
use crate::store::QueueStore;
use crate::types::{GameMode, Match, Region};
use std::sync::Arc;
use tracing::{debug, info};

/// Matcher for the timer-driven path
#[derive(Clone)]
pub struct BatchMatcher {
    store: Arc<dyn QueueStore>,
    settings: MatchingSettings,
    metrics: Arc<MetricsCollector>,
}

impl BatchMatcher {
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

    /// Sweep one partition, forming as many full groups as possible
    ///
    /// Single-linkage greedy clustering: each unused player in fetch order
    /// becomes an anchor, and later unused players are accepted against the
    /// anchor only (transitivity is assumed, not verified). An anchor whose
    /// group falls short releases all its markers, so those players stay
    /// eligible for differently-centered groups later in the same pass.
    ///
    /// Returns the matches formed. Fewer than a full group's worth of
    /// waiting players is not an error.
    pub async fn process_queue(&self, region: Region, mode: GameMode) -> Result<Vec<Match>> {
        let required = mode.players_per_match();

        let players = self
            .store
            .range_by_rating(region, mode, i32::MIN, i32::MAX, self.settings.batch_fetch_cap)
            .await?;

        if players.len() < required {
            return Ok(Vec::new());
        }

        debug!(
            %region,
            %mode,
            waiting = players.len(),
            required,
            "Sweeping partition"
        );

        // Per-invocation scratch markers; no state leaks across sweeps
        let mut used = vec![false; players.len()];
        let mut matches = Vec::new();

        for anchor_idx in 0..players.len() {
            if used[anchor_idx] {
                continue;
            }

            let anchor = &players[anchor_idx];
            let window = rating_window(&self.settings, anchor.wait_time());

            let mut member_idxs = vec![anchor_idx];
            used[anchor_idx] = true;

            for candidate_idx in 0..players.len() {
                if member_idxs.len() >= required {
                    break;
                }
                if used[candidate_idx] {
                    continue;
                }
                if compatible(anchor, &players[candidate_idx], window) {
                    member_idxs.push(candidate_idx);
                    used[candidate_idx] = true;
                }
            }

            if member_idxs.len() < required {
                // Release the whole attempted group, anchor included, so a
                // differently-centered anchor can still pick these players up
                for idx in member_idxs {
                    used[idx] = false;
                }
                continue;
            }

            let group = member_idxs.iter().map(|&idx| players[idx].clone()).collect();
            let matched = assembly::commit_group(self.store.as_ref(), group).await?;
            self.metrics
                .record_match_created(mode, MatchSource::Batch, matched.players.len());

            info!(
                match_id = %matched.id,
                %region,
                %mode,
                players = matched.players.len(),
                "Match created from queue sweep"
            );
            matches.push(matched);
        }

        Ok(matches)
    }
}
