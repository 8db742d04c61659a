//! natterd: a password-gated broadcast chat server.
//!
//! Clients connect over TCP, pass the password gate, claim a username,
//! and then exchange newline-delimited records. Every message a logged-in
//! user sends is fanned out to everyone else in the room (sender
//! included) in a single global order.
//!
//! The crate is a library so integration tests can boot a full server
//! in-process on an ephemeral port; the `natterd` and `natter` binaries
//! are thin wrappers over these modules.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod network;
pub mod state;
