//! Serve/watch state tracking.
//!
//! Two flags:
//! - `SERVING`: the initial build finished, rebuilds may run
//! - `SHUTDOWN`: Ctrl+C received

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tiny_http::Server;

/// Initial build finished; the watcher only forwards events after this.
static SERVING: AtomicBool = AtomicBool::new(false);

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// HTTP server reference for graceful shutdown
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

/// Shutdown signal sender for the actor system
static SHUTDOWN_TX: OnceLock<crossbeam::channel::Sender<()>> = OnceLock::new();

pub fn is_serving() -> bool {
    SERVING.load(Ordering::SeqCst)
}

/// Mark the initial build as done.
pub fn set_serving() {
    SERVING.store(true, Ordering::SeqCst);
}

/// Install the global Ctrl+C handler. Call once at program start.
///
/// - nothing registered: exit immediately
/// - actors registered: signal them to stop
/// - server registered: also unblock its request loop
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        let tx = SHUTDOWN_TX.get();
        if let Some(tx) = tx {
            let _ = tx.send(());
        }

        if let Some(server) = SERVER.get() {
            crate::log!("serve"; "shutting down...");
            server.unblock();
        } else if tx.is_none() {
            std::process::exit(0);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the HTTP server and the actor shutdown channel.
pub fn register_server(server: Arc<Server>, shutdown_tx: crossbeam::channel::Sender<()>) {
    let _ = SERVER.set(server);
    register_shutdown(shutdown_tx);
}

/// Register the actor shutdown channel (watch mode without a server).
pub fn register_shutdown(shutdown_tx: crossbeam::channel::Sender<()>) {
    let _ = SHUTDOWN_TX.set(shutdown_tx);
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}
