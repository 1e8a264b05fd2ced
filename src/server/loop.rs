// Server loop module
// Accepts connections until shutdown, then waits for in-flight ones

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Accept connections until `shutdown` is notified
///
/// After shutdown the listener is closed right away; open connections get up
/// to one connection timeout to finish.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: Arc<Notify>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Live connection count, shared with every connection task
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        // Accept errors (e.g. EMFILE) are transient; keep serving
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown.notified() => break,
        }
    }

    // Stop accepting before draining
    drop(listener);

    // Give in-flight connections up to one connection timeout
    let deadline = Duration::from_secs(state.config.performance.connection_timeout);
    let remaining = drain_connections(&active_connections, deadline).await;
    logger::log_shutdown_complete(remaining);
    Ok(())
}

/// Wait until `active` drops to zero or `deadline` passes; returns what is left
async fn drain_connections(active: &AtomicUsize, deadline: Duration) -> usize {
    let deadline = tokio::time::Instant::now() + deadline;
    loop {
        let remaining = active.load(Ordering::SeqCst);
        if remaining == 0 || tokio::time::Instant::now() >= deadline {
            return remaining;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}
