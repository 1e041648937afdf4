//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for the rally-point matchmaking
//! service using Prometheus metrics.

use crate::types::{GameMode, Region};
use anyhow::Result;
use prometheus::{
    Histogram, HistogramOpts, IntCounterVec, IntGaugeVec, Opts, Registry,
};
use std::sync::Arc;
use std::time::Duration;

/// Main metrics collector for the matchmaking service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Total players that joined a queue, by partition
    players_queued_total: IntCounterVec,

    /// Total players that explicitly left a queue, by partition
    players_left_total: IntCounterVec,

    /// Players currently waiting, by partition
    players_waiting: IntGaugeVec,

    /// Total matches created, by mode and matching path
    matches_created_total: IntCounterVec,

    /// Total players placed into matches, by mode
    players_matched_total: IntCounterVec,

    /// Duration of one full batch sweep over all partitions
    sweep_duration_seconds: Histogram,
}

/// Which matching strategy produced a match
#[derive(Debug, Clone, Copy)]
pub enum MatchSource {
    OnDemand,
    Batch,
}

impl MatchSource {
    fn as_label(&self) -> &'static str {
        match self {
            MatchSource::OnDemand => "on_demand",
            MatchSource::Batch => "batch",
        }
    }
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let players_queued_total = IntCounterVec::new(
            Opts::new(
                "rally_point_players_queued_total",
                "Total players that joined a matchmaking queue",
            ),
            &["region", "mode"],
        )?;
        registry.register(Box::new(players_queued_total.clone()))?;

        let players_left_total = IntCounterVec::new(
            Opts::new(
                "rally_point_players_left_total",
                "Total players that explicitly left a matchmaking queue",
            ),
            &["region", "mode"],
        )?;
        registry.register(Box::new(players_left_total.clone()))?;

        let players_waiting = IntGaugeVec::new(
            Opts::new(
                "rally_point_players_waiting",
                "Players currently waiting in a matchmaking queue",
            ),
            &["region", "mode"],
        )?;
        registry.register(Box::new(players_waiting.clone()))?;

        let matches_created_total = IntCounterVec::new(
            Opts::new(
                "rally_point_matches_created_total",
                "Total matches created",
            ),
            &["mode", "source"],
        )?;
        registry.register(Box::new(matches_created_total.clone()))?;

        let players_matched_total = IntCounterVec::new(
            Opts::new(
                "rally_point_players_matched_total",
                "Total players placed into matches",
            ),
            &["mode"],
        )?;
        registry.register(Box::new(players_matched_total.clone()))?;

        let sweep_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "rally_point_sweep_duration_seconds",
            "Duration of one batch sweep over all partitions",
        ))?;
        registry.register(Box::new(sweep_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            players_queued_total,
            players_left_total,
            players_waiting,
            matches_created_total,
            players_matched_total,
            sweep_duration_seconds,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn record_player_queued(&self, region: Region, mode: GameMode) {
        let (region, mode) = (region.to_string(), mode.to_string());
        self.players_queued_total
            .with_label_values(&[region.as_str(), mode.as_str()])
            .inc();
    }

    pub fn record_player_left(&self, region: Region, mode: GameMode) {
        let (region, mode) = (region.to_string(), mode.to_string());
        self.players_left_total
            .with_label_values(&[region.as_str(), mode.as_str()])
            .inc();
    }

    pub fn set_players_waiting(&self, region: Region, mode: GameMode, count: usize) {
        let (region, mode) = (region.to_string(), mode.to_string());
        self.players_waiting
            .with_label_values(&[region.as_str(), mode.as_str()])
            .set(count as i64);
    }

    pub fn record_match_created(&self, mode: GameMode, source: MatchSource, group_size: usize) {
        let mode = mode.to_string();
        self.matches_created_total
            .with_label_values(&[mode.as_str(), source.as_label()])
            .inc();
        self.players_matched_total
            .with_label_values(&[mode.as_str()])
            .inc_by(group_size as u64);
    }

    pub fn observe_sweep_duration(&self, duration: Duration) {
        self.sweep_duration_seconds.observe(duration.as_secs_f64());
    }
}
