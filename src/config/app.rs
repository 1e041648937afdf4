//! Main application configuration
//!
//! This module defines the primary configuration structures for the
//! rally-point matchmaking service, including environment variable loading
//! and validation.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceSettings,
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub matchmaking: MatchingSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

/// HTTP API server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Host to bind to (typically "0.0.0.0" for all interfaces)
    pub host: String,
    /// Port for the HTTP API (queue endpoints, health, metrics)
    pub port: u16,
}

/// Matchmaking-specific settings
///
/// These are process-wide and read-only after startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingSettings {
    /// Base acceptable rating difference before any window expansion
    pub base_rating_diff: i32,
    /// Wait time after which the window jumps to its saturation value
    pub max_search_time_seconds: u64,
    /// Window widening added per elapsed 30-second slice
    pub expansion_per_slice: i32,
    /// Fixed window value once max search time is exceeded
    pub saturation_window: i32,
    /// Upper bound on players fetched per batch sweep of one partition
    pub batch_fetch_cap: usize,
    /// Queue entry time-to-live in seconds
    pub queue_ttl_seconds: u64,
    /// Interval between batch sweeps over all partitions
    pub sweep_interval_seconds: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "rally-point".to_string(),
            log_level: "info".to_string(),
            shutdown_timeout_seconds: 30,
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            base_rating_diff: 200,
            max_search_time_seconds: 300, // 5 minutes
            expansion_per_slice: 50,      // +50 rating every 30 seconds
            saturation_window: 1000,
            batch_fetch_cap: 100,
            queue_ttl_seconds: 1800, // 30 minutes
            sweep_interval_seconds: 10,
        }
    }
}

impl MatchingSettings {
    /// Get the maximum search time as a Duration
    pub fn max_search_time(&self) -> Duration {
        Duration::from_secs(self.max_search_time_seconds)
    }

    /// Get the queue entry TTL as a Duration
    pub fn queue_ttl(&self) -> Duration {
        Duration::from_secs(self.queue_ttl_seconds)
    }

    /// Get the batch sweep interval as a Duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            config.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.service.log_level = log_level;
        }
        if let Ok(timeout) = env::var("SHUTDOWN_TIMEOUT_SECONDS") {
            config.service.shutdown_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid SHUTDOWN_TIMEOUT_SECONDS value: {}", timeout))?;
        }

        // API settings
        if let Ok(host) = env::var("API_HOST") {
            config.api.host = host;
        }
        if let Ok(port) = env::var("API_PORT") {
            config.api.port = port
                .parse()
                .map_err(|_| anyhow!("Invalid API_PORT value: {}", port))?;
        }

        // Matchmaking settings
        if let Ok(diff) = env::var("BASE_RATING_DIFF") {
            config.matchmaking.base_rating_diff = diff
                .parse()
                .map_err(|_| anyhow!("Invalid BASE_RATING_DIFF value: {}", diff))?;
        }
        if let Ok(search) = env::var("MAX_SEARCH_TIME_SECONDS") {
            config.matchmaking.max_search_time_seconds = search
                .parse()
                .map_err(|_| anyhow!("Invalid MAX_SEARCH_TIME_SECONDS value: {}", search))?;
        }
        if let Ok(expansion) = env::var("EXPANSION_PER_SLICE") {
            config.matchmaking.expansion_per_slice = expansion
                .parse()
                .map_err(|_| anyhow!("Invalid EXPANSION_PER_SLICE value: {}", expansion))?;
        }
        if let Ok(ttl) = env::var("QUEUE_TTL_SECONDS") {
            config.matchmaking.queue_ttl_seconds = ttl
                .parse()
                .map_err(|_| anyhow!("Invalid QUEUE_TTL_SECONDS value: {}", ttl))?;
        }
        if let Ok(interval) = env::var("SWEEP_INTERVAL_SECONDS") {
            config.matchmaking.sweep_interval_seconds = interval
                .parse()
                .map_err(|_| anyhow!("Invalid SWEEP_INTERVAL_SECONDS value: {}", interval))?;
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Validate ports
    if config.api.port == 0 {
        return Err(anyhow!("API port cannot be 0"));
    }

    // Validate timeouts
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }

    // Validate matchmaking settings
    if config.matchmaking.base_rating_diff < 0 {
        return Err(anyhow!("Base rating diff cannot be negative"));
    }
    if config.matchmaking.expansion_per_slice < 0 {
        return Err(anyhow!("Expansion per slice cannot be negative"));
    }
    if config.matchmaking.saturation_window < 0 {
        return Err(anyhow!("Saturation window cannot be negative"));
    }
    if config.matchmaking.max_search_time_seconds == 0 {
        return Err(anyhow!("Max search time must be greater than 0"));
    }
    if config.matchmaking.batch_fetch_cap == 0 {
        return Err(anyhow!("Batch fetch cap must be greater than 0"));
    }
    if config.matchmaking.queue_ttl_seconds == 0 {
        return Err(anyhow!("Queue TTL must be greater than 0"));
    }
    if config.matchmaking.sweep_interval_seconds == 0 {
        return Err(anyhow!("Sweep interval must be greater than 0"));
    }

    Ok(())
}
