//! Application state and orchestration
//!
//! This module wires the queue store, matchers and metrics together and
//! drives the recurring batch sweep over every (region, mode) partition.

use crate::config::AppConfig;
use crate::error::{MatchmakingError, Result};
use crate::matcher::{BatchMatcher, OnDemandMatcher};
use crate::metrics::MetricsCollector;
use crate::store::{InMemoryQueueStore, QueueStore};
use crate::types::{GameMode, Match, Player, PlayerId, QueueRequest, Region};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

/// Central application state shared across the HTTP surface and the
/// background sweep task
pub struct AppState {
    config: AppConfig,
    store: Arc<dyn QueueStore>,
    on_demand: OnDemandMatcher,
    batch: BatchMatcher,
    metrics: Arc<MetricsCollector>,
    running: Arc<RwLock<bool>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl AppState {
    /// Initialize all service components
    pub async fn new(config: AppConfig) -> Result<Self> {
        let metrics = Arc::new(MetricsCollector::new()?);
        let store: Arc<dyn QueueStore> =
            Arc::new(InMemoryQueueStore::new(config.matchmaking.queue_ttl()));

        let on_demand = OnDemandMatcher::new(
            store.clone(),
            config.matchmaking.clone(),
            metrics.clone(),
        );
        let batch = BatchMatcher::new(store.clone(), config.matchmaking.clone(), metrics.clone());

        let (shutdown_tx, _) = broadcast::channel(1);

        Ok(Self {
            config,
            store,
            on_demand,
            batch,
            metrics,
            running: Arc::new(RwLock::new(false)),
            shutdown_tx,
        })
    }

    /// Start the background queue sweep task
    pub async fn start(&self) -> Result<()> {
        {
            let mut running = self.running.write().await;
            if *running {
                return Err(MatchmakingError::InternalError {
                    message: "Service already started".to_string(),
                }
                .into());
            }
            *running = true;
        }

        let batch = self.batch.clone();
        let store = self.store.clone();
        let metrics = self.metrics.clone();
        let interval = self.config.matchmaking.sweep_interval();
        let shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            sweep_task(batch, store, metrics, interval, shutdown_rx).await;
        });

        info!(
            interval_seconds = self.config.matchmaking.sweep_interval_seconds,
            "Queue sweep task started"
        );
        Ok(())
    }

    /// Stop background tasks
    pub async fn stop(&self) {
        *self.running.write().await = false;
        let _ = self.shutdown_tx.send(());
        info!("Service stopping");
    }

    /// Whether the service has been started and not yet stopped
    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn QueueStore> {
        self.store.clone()
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// Create a queue entry for a new player and enqueue it
    pub async fn join_queue(&self, request: QueueRequest) -> Result<Player> {
        if request.rating < 0 {
            return Err(MatchmakingError::InvalidQueueRequest {
                reason: format!("rating cannot be negative: {}", request.rating),
            }
            .into());
        }

        let player = Player::new(
            request.rating,
            request.region,
            request.mode,
            request.player_level,
        );
        self.store.enqueue(&player).await?;
        self.metrics
            .record_player_queued(player.region, player.mode);

        info!(
            player_id = %player.id,
            region = %player.region,
            mode = %player.mode,
            rating = player.rating,
            "Player joined queue"
        );
        Ok(player)
    }

    /// Remove a player from the queue on explicit leave
    pub async fn leave_queue(&self, player_id: PlayerId) -> Result<()> {
        let player = self
            .store
            .get_by_id(player_id)
            .await?
            .ok_or(MatchmakingError::PlayerNotFound { player_id })?;

        self.store.dequeue(player_id).await?;
        self.metrics.record_player_left(player.region, player.mode);

        info!(player_id = %player_id, "Player left queue");
        Ok(())
    }

    /// Run the on-demand matching path for one player
    pub async fn find_match(&self, player_id: PlayerId) -> Result<Match> {
        self.on_demand.find_match(player_id).await
    }

    /// Number of players waiting in one partition
    pub async fn queue_status(&self, region: Region, mode: GameMode) -> Result<usize> {
        self.store.partition_size(region, mode).await
    }
}

/// Recurring sweep over the cross product of regions and swept modes
///
/// Ticks run sequentially; a slow tick delays the next one rather than
/// overlapping it, so store operations must only be idempotent per call.
async fn sweep_task(
    batch: BatchMatcher,
    store: Arc<dyn QueueStore>,
    metrics: Arc<MetricsCollector>,
    interval: std::time::Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let started = Instant::now();

                for region in Region::ALL {
                    for mode in GameMode::SWEPT {
                        if let Err(e) = batch.process_queue(region, mode).await {
                            warn!(
                                %region,
                                %mode,
                                error = %e,
                                "Failed to process queue partition"
                            );
                        }

                        match store.partition_size(region, mode).await {
                            Ok(size) => metrics.set_players_waiting(region, mode, size),
                            Err(e) => debug!(%region, %mode, error = %e, "Failed to read partition size"),
                        }
                    }
                }

                metrics.observe_sweep_duration(started.elapsed());
            }
            _ = shutdown_rx.recv() => {
                info!("Queue sweep task stopping");
                break;
            }
        }
    }
}
