//! Gateway: TCP listener that accepts incoming connections.
//!
//! The gateway binds the listen socket, runs the broadcast dispatcher,
//! and spawns a [`Connection`] task per accepted client. On shutdown it
//! stops accepting, closes the listen socket, and waits for the
//! dispatcher to drain whatever is still queued.

use crate::dispatch::{self, Broadcast};
use crate::network::Connection;
use crate::state::Hub;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info, instrument};

/// Accepts incoming connections and spawns session handlers.
pub struct Gateway {
    listener: TcpListener,
    hub: Arc<Hub>,
}

impl Gateway {
    /// Bind the gateway to the given address.
    pub async fn bind(addr: &str, hub: Arc<Hub>) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "Listener bound");
        Ok(Self { listener, hub })
    }

    /// The address the listener actually bound to.
    ///
    /// Useful when binding to port 0 and letting the OS pick.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the accept loop until shutdown is signalled.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        let Gateway { listener, hub } = self;

        let (queue_tx, queue_rx) = mpsc::unbounded_channel::<Broadcast>();
        let dispatcher = tokio::spawn(dispatch::run(queue_rx, Arc::clone(&hub)));
        let mut shutdown_rx = hub.subscribe_shutdown();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        let id = hub.ids.next();
                        let (tx, rx) = mpsc::unbounded_channel();
                        hub.roster.insert(id, tx);
                        info!(%id, %addr, "Connection accepted");

                        let hub = Arc::clone(&hub);
                        let queue = queue_tx.clone();
                        tokio::spawn(async move {
                            let connection = Connection::new(id, addr, stream, hub, queue, rx);
                            if let Err(e) = connection.run().await {
                                error!(%id, %addr, error = %e, "Connection error");
                            }
                            info!(%id, %addr, "Connection closed");
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to accept connection");
                    }
                },
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signalled, no longer accepting connections");
                    break;
                }
            }
        }

        // Close the listen socket, then let the dispatcher drain. It exits
        // once every session task has dropped its queue sender and the
        // backlog is delivered.
        drop(listener);
        drop(queue_tx);
        dispatcher.await?;
        info!("Broadcast queue drained");

        Ok(())
    }
}
