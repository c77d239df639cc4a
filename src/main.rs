//! CyberQuest · Security Training Backend
//!
//! - Axum HTTP API for missions, submissions and user progress
//! - Mission catalog from built-in seeds plus an optional TOML mission bank
//! - In-memory user progression with at-most-once XP credit per mission
//!
//! Important env variables:
//!   PORT               : u16 (default 3000)
//!   MISSION_BANK_PATH  : path to TOML mission bank (optional)
//!   LOG_LEVEL          : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT         : "pretty" (default) or "json"

mod catalog;
mod config;
mod domain;
mod error;
mod grading;
mod logic;
mod progression;
mod protocol;
mod routes;
mod seeds;
mod state;
mod store;
mod telemetry;
mod util;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (mission catalog, user store).
  let state = Arc::new(AppState::from_env());

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state);

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "cyberquest", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "cyberquest", "Server stopped");
  Ok(())
}

/// Resolves on Ctrl-C so in-flight requests can finish.
async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "cyberquest", error = %e, "Failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  info!(target: "cyberquest", "Shutdown signal received");
}
