//! Session identity and lifecycle phases.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque identifier for one client connection.
///
/// Ids are process-local, allocated sequentially, and never reused within
/// a server run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generates sequential session ids.
#[derive(Debug)]
pub struct SessionIdGen {
    counter: AtomicU64,
}

impl SessionIdGen {
    /// Create a generator starting at id 1.
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(1),
        }
    }

    /// Allocate the next id.
    pub fn next(&self) -> SessionId {
        SessionId(self.counter.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SessionIdGen {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle phase of a session.
///
/// Sessions move strictly forward: PasswordWait, then LoginWait, then
/// Chatting, then Closed. Closed sessions are removed from the roster
/// rather than stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for a valid `PASS:` record.
    PasswordWait,
    /// Password accepted, waiting for `LOGIN:`.
    LoginWait,
    /// Logged in; the session receives broadcasts.
    Chatting,
    /// Terminal; the connection is being torn down.
    Closed,
}
