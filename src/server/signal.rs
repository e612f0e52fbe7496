// Signal handling module
//
// Supported signals:
// - SIGINT:  Stop accepting and exit (Ctrl+C)
// - SIGTERM: Stop accepting and exit
//
// Player processes already started are not waited for.

use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Start signal handlers (Unix)
///
/// Handlers are registered before this returns, so a signal that arrives
/// before the listening task first runs is still caught. The spawned task
/// notifies `shutdown` once on the first SIGINT or SIGTERM.
#[cfg(unix)]
pub fn start_signal_handler(shutdown: Arc<Notify>) {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigint, mut sigterm) =
        match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
            (Err(e), _) | (_, Err(e)) => {
                logger::log_error(&format!("Failed to register signal handlers: {e}"));
                return;
            }
        };

    tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => logger::log_signal("SIGINT"),
            _ = sigterm.recv() => logger::log_signal("SIGTERM"),
        }
        shutdown.notify_one();
    });
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(shutdown: Arc<Notify>) {
    use tokio::signal::windows::ctrl_c;

    let mut ctrl_c = match ctrl_c() {
        Ok(listener) => listener,
        Err(e) => {
            logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
            return;
        }
    };

    tokio::spawn(async move {
        if ctrl_c.recv().await.is_some() {
            logger::log_signal("Ctrl+C");
            shutdown.notify_one();
        }
    });
}
