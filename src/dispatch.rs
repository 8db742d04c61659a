//! Dispatcher: single consumer of the broadcast queue.
//!
//! Every published record funnels through one unbounded queue and one
//! consumer task, which gives the service a total delivery order: the
//! order records are dequeued here is the order every session sees them.

use crate::state::Hub;
use natter_proto::{Reply, SERVER_SENDER};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// One record queued for fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Broadcast {
    /// Display name shown before the body.
    pub sender: String,
    /// Body text. Publishers truncate it to the wire cap before enqueueing.
    pub body: String,
}

impl Broadcast {
    /// Record published when a user sends a message.
    pub fn new(sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            body: body.into(),
        }
    }

    /// Announcement published when a user enters the chat.
    pub fn joined(name: &str) -> Self {
        Self::new(SERVER_SENDER, format!("*** {name} has joined the chat ***"))
    }

    /// Announcement published when a user leaves the chat.
    pub fn left(name: &str) -> Self {
        Self::new(SERVER_SENDER, format!("*** {name} has left the chat ***"))
    }
}

/// Drain the queue, fanning each record out to every Chatting session.
///
/// Runs until all queue senders are dropped and the backlog is empty, so
/// shutdown is simply "close the queue": records already accepted still
/// reach the sessions that remain. Send failures mean the peer left after
/// the snapshot was taken; they are swallowed and never abort the loop.
pub async fn run(mut queue: mpsc::UnboundedReceiver<Broadcast>, hub: Arc<Hub>) {
    debug!("Dispatcher started");
    while let Some(record) = queue.recv().await {
        let reply = Reply::broadcast(record.sender, record.body);
        for peer in hub.roster.snapshot_chatting() {
            let _ = peer.tx.send(reply.clone());
        }
    }
    debug!("Dispatcher stopped");
}
