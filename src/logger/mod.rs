//! Logger module
//!
//! Thin facade over `tracing` so call sites stay one-liners:
//! - Server lifecycle logging
//! - Access logging (request line and response status)
//! - Error and warning logging, including the unhandled-error line

use hyper::{Method, StatusCode};
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, LogFormat, LoggingConfig, StoreBackend};

/// Initialize the global subscriber
///
/// Should be called once at application startup. `RUST_LOG` takes
/// precedence over `logging.level`.
pub fn init(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!(
        address = %addr,
        table = %config.store.table_name,
        backend = %config.store.backend,
        workers = ?config.server.workers,
        "todo handler listening on http://{addr}"
    );
}

pub fn log_store_ready(backend: StoreBackend, table_name: &str) {
    tracing::info!(%backend, table = table_name, "store client initialized");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!(peer = %peer_addr, "connection accepted");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!(error = ?err, "failed to serve connection");
}

pub fn log_request(method: &Method, path: &str) {
    tracing::info!(%method, path, "request");
}

pub fn log_response(method: &Method, path: &str, status: StatusCode) {
    tracing::info!(%method, path, status = status.as_u16(), "response");
}

/// The one diagnostic line for failures that are not the caller's fault
pub fn log_unhandled_error(err: &dyn std::error::Error) {
    tracing::error!(error = %err, "Unhandled error");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

pub fn log_shutdown_requested(signal: &str) {
    tracing::info!(signal, "shutdown requested, no longer accepting connections");
}

pub fn log_shutdown_complete(remaining: usize) {
    if remaining == 0 {
        tracing::info!("all connections closed, server stopped");
    } else {
        tracing::warn!(remaining, "server stopped with connections still open");
    }
}
