//! State management module.
//!
//! Contains the Hub (shared server state), the session roster, and
//! session identity types.

mod hub;
mod roster;
mod session;

pub use hub::Hub;
pub use roster::{ClaimOutcome, Peer, Roster};
pub use session::{Phase, SessionId, SessionIdGen};
