//! Axum HTTP server and request handlers
//!
//! Translates engine-level outcomes into caller-visible responses. The
//! mapping keeps "retry later" (`no_match_found`) distinguishable from a
//! store failure (503): the two require different client behavior.

use crate::error::MatchmakingError;
use crate::service::{AppState, HealthCheck, HealthStatus};
use crate::types::{GameMode, PlayerId, QueueRequest, Region};
use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Host to bind to (typically "0.0.0.0" for all interfaces)
    pub host: String,
    /// Port to bind the API server to
    pub port: u16,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// HTTP server exposing the matchmaking API
pub struct ApiServer {
    config: ApiServerConfig,
    app_state: Arc<AppState>,
    shutdown_tx: broadcast::Sender<()>,
}

impl ApiServer {
    /// Create a new API server over the shared application state
    pub fn new(config: ApiServerConfig, app_state: Arc<AppState>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            app_state,
            shutdown_tx,
        }
    }

    /// Start serving and block until shutdown is requested
    pub async fn start(&self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .context("Invalid API server address")?;

        let app = self.create_router();
        let listener = TcpListener::bind(addr).await?;

        info!("API server listening on http://{}", addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("API server shutdown signal received");
            })
            .await?;

        info!("API server stopped");
        Ok(())
    }

    /// Create the Axum router with all endpoints
    pub fn create_router(&self) -> Router {
        Router::new()
            .route("/api/v1/queue/join", post(join_queue_handler))
            .route(
                "/api/v1/queue/leave/{player_id}",
                delete(leave_queue_handler),
            )
            .route("/api/v1/queue/match/{player_id}", get(find_match_handler))
            .route("/api/v1/queue/status", get(queue_status_handler))
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .with_state(self.app_state.clone())
    }

    /// Request a graceful stop
    pub fn stop(&self) {
        if self.shutdown_tx.send(()).is_err() {
            warn!("API server shutdown receiver already dropped");
        }
    }
}

/// Map an engine error to an HTTP response
fn error_response(err: anyhow::Error) -> Response {
    let (status, code, retry) = match err.downcast_ref::<MatchmakingError>() {
        Some(MatchmakingError::PlayerNotFound { .. }) => {
            (StatusCode::NOT_FOUND, "player_not_found", false)
        }
        Some(MatchmakingError::MatchNotFound { .. }) => {
            (StatusCode::NOT_FOUND, "match_not_found", false)
        }
        Some(MatchmakingError::NoMatchFound { .. }) => {
            (StatusCode::NOT_FOUND, "no_match_found", true)
        }
        Some(MatchmakingError::StoreUnavailable { .. }) => {
            (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", true)
        }
        Some(MatchmakingError::InvalidQueueRequest { .. }) => {
            (StatusCode::BAD_REQUEST, "invalid_request", false)
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", false),
    };

    warn!(status = %status, error = %err, "Request failed");

    (
        status,
        Json(json!({
            "error": code,
            "details": err.to_string(),
            "retry": retry,
        })),
    )
        .into_response()
}

/// POST /api/v1/queue/join
async fn join_queue_handler(
    State(app): State<Arc<AppState>>,
    Json(request): Json<QueueRequest>,
) -> Response {
    match app.join_queue(request).await {
        Ok(player) => (
            StatusCode::OK,
            Json(json!({
                "player_id": player.id,
                "status": "queued",
                "message": "Player added to queue",
            })),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

/// DELETE /api/v1/queue/leave/{player_id}
async fn leave_queue_handler(
    State(app): State<Arc<AppState>>,
    Path(player_id): Path<PlayerId>,
) -> Response {
    match app.leave_queue(player_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "player_id": player_id,
                "status": "removed",
                "message": "Player removed from queue",
            })),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

/// GET /api/v1/queue/match/{player_id}
async fn find_match_handler(
    State(app): State<Arc<AppState>>,
    Path(player_id): Path<PlayerId>,
) -> Response {
    match app.find_match(player_id).await {
        Ok(matched) => (StatusCode::OK, Json(matched)).into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct StatusQuery {
    region: Region,
    #[serde(rename = "game_mode")]
    mode: GameMode,
}

/// GET /api/v1/queue/status?region=EU&game_mode=1v1
async fn queue_status_handler(
    State(app): State<Arc<AppState>>,
    Query(query): Query<StatusQuery>,
) -> Response {
    match app.queue_status(query.region, query.mode).await {
        Ok(queue_size) => (
            StatusCode::OK,
            Json(json!({
                "region": query.region,
                "game_mode": query.mode,
                "queue_size": queue_size,
                "timestamp": chrono::Utc::now().timestamp(),
            })),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

/// GET /health
async fn health_handler(State(app): State<Arc<AppState>>) -> Response {
    match HealthCheck::liveness_check(app.clone()).await {
        Ok(HealthStatus::Healthy) | Ok(HealthStatus::Degraded) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "service": app.config().service.name,
                "version": crate::VERSION,
            })),
        )
            .into_response(),
        _ => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "service": app.config().service.name,
                "version": crate::VERSION,
            })),
        )
            .into_response(),
    }
}

/// GET /metrics
async fn metrics_handler(State(app): State<Arc<AppState>>) -> Response {
    let registry = app.metrics().registry();
    let metric_families = registry.gather();
    let encoder = TextEncoder::new();

    match encoder.encode_to_string(&metric_families) {
        Ok(output) => Response::builder()
            .status(StatusCode::OK)
            .header("content-type", encoder.format_type())
            .body(output.into())
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        Err(e) => {
            warn!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
