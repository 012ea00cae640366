//! Logger module
//!
//! Process-wide logging built on `tracing`:
//! - Subscriber setup from `[logging]` config (text or JSON, `RUST_LOG` aware)
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging

mod format;

pub use format::AccessLogEntry;

use std::net::SocketAddr;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, LoggingConfig};
use crate::error::ServiceError;
use crate::routing::RouteTable;

/// Initialize the global subscriber
///
/// Should be called once at application startup.
pub fn init(config: &LoggingConfig) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init()
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, routes: &RouteTable) {
    tracing::info!("Server started, listening on http://{addr}");
    match config.server.workers {
        Some(workers) => tracing::info!("Worker threads: {workers}"),
        None => tracing::info!("Worker threads: one per CPU core"),
    }
    for (method, pattern) in routes.patterns() {
        tracing::info!("Route: {method} {pattern}");
    }
    tracing::info!("Secret config: {}", config.secret.config_path);
    if config.http.expose_error_details {
        tracing::warn!("Error details are exposed to clients");
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log a handler failure; client mistakes are warnings, the rest errors
pub fn log_request_failed(path: &str, err: &ServiceError) {
    if err.is_client_error() {
        tracing::warn!(path, kind = err.kind(), "{err}");
    } else {
        tracing::error!(path, kind = err.kind(), "{err}");
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: "access", "{}", entry.format(format));
}

pub fn log_shutdown_started(active_connections: usize) {
    tracing::info!("Shutdown requested, {active_connections} connection(s) in flight");
}

pub fn log_shutdown_complete(remaining: usize) {
    if remaining == 0 {
        tracing::info!("All connections closed, exiting");
    } else {
        tracing::warn!("Shutdown timeout reached with {remaining} connection(s) still open");
    }
}
