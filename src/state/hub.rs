//! Hub: shared server state handed to every task.

use crate::config::Config;
use crate::state::roster::Roster;
use crate::state::session::SessionIdGen;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

/// Shared state for the whole server.
///
/// One hub is created at startup and passed around in an `Arc`. It owns
/// the roster, the session id allocator, the shared password, and the
/// shutdown signal.
#[derive(Debug)]
pub struct Hub {
    /// Live sessions and claimed usernames.
    pub roster: Roster,
    /// Session id allocator.
    pub ids: SessionIdGen,
    /// Shared password every client must present.
    pub password: String,
    /// Shutdown signal broadcaster.
    shutdown_tx: broadcast::Sender<()>,
    /// Set before the shutdown signal is sent, so a session that
    /// subscribes after the send still notices.
    shutting_down: AtomicBool,
}

impl Hub {
    /// Build the hub from configuration.
    pub fn new(config: &Config) -> Self {
        // Capacity 16 provides buffer for slow subscribers during shutdown
        let (shutdown_tx, _) = broadcast::channel(16);

        Self {
            roster: Roster::new(),
            ids: SessionIdGen::new(),
            password: config.server.password.clone(),
            shutdown_tx,
            shutting_down: AtomicBool::new(false),
        }
    }

    /// Subscribe to the shutdown signal.
    ///
    /// Check [`Hub::is_shutting_down`] after subscribing; a signal sent
    /// before the subscription is not replayed by the channel.
    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Whether shutdown has been signalled.
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }

    /// Broadcast the shutdown signal. Safe to call more than once; a send
    /// with no live subscribers is ignored.
    pub fn shutdown(&self) {
        self.shutting_down.store(true, Ordering::SeqCst);
        let _ = self.shutdown_tx.send(());
    }
}
