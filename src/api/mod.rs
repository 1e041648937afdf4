//! HTTP API surface
//!
//! Thin request-facing layer over the matchmaking engine: queue join/leave,
//! on-demand match lookup, queue status, plus health and metrics endpoints.

pub mod server;

pub use server::{ApiServer, ApiServerConfig};
