//! Connection: drives a single client session.
//!
//! Each connection runs in its own Tokio task and walks the session
//! through its phases in order:
//!
//! ```text
//! PasswordWait --PASS ok--> LoginWait --claim ok--> Chatting --> Closed
//!      |                        |                       |
//!      | 5 failures             | any failure           | QUIT / EOF /
//!      v                        v                       v   shutdown
//!    Closed                   Closed                  Closed
//! ```
//!
//! The handshake phases are sequential request/reply exchanges written
//! directly to the socket. Chatting switches to a `tokio::select!` loop
//! over the socket, the session's outgoing channel (filled by the
//! dispatcher), and the shutdown signal. This task is the only writer to
//! its socket, so records are never interleaved. Every write races the
//! shutdown signal, so a peer that stops reading cannot hold its session
//! open across shutdown.

use crate::dispatch::Broadcast;
use crate::error::SessionError;
use crate::state::{ClaimOutcome, Hub, Phase, SessionId};
use futures_util::{SinkExt, StreamExt};
use natter_proto::{Command, CommandCodec, MAX_PASSWORD_ATTEMPTS, Reply, truncate_body};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{broadcast, mpsc};
use tokio_util::codec::Framed;
use tracing::{debug, info, instrument};

/// A client session handler.
///
/// Generic over the byte stream so tests can drive it over an in-memory
/// duplex pipe instead of a TCP socket.
pub struct Connection<S> {
    id: SessionId,
    addr: SocketAddr,
    hub: Arc<Hub>,
    framed: Framed<S, CommandCodec>,
    queue: mpsc::UnboundedSender<Broadcast>,
    outgoing_rx: mpsc::UnboundedReceiver<Reply>,
    shutdown_rx: broadcast::Receiver<()>,
    username: Option<String>,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    /// Create a handler for a freshly accepted stream.
    ///
    /// The session must already be registered in the roster under `id`;
    /// `outgoing_rx` is the receiving end of the sender stored there.
    pub fn new(
        id: SessionId,
        addr: SocketAddr,
        stream: S,
        hub: Arc<Hub>,
        queue: mpsc::UnboundedSender<Broadcast>,
        outgoing_rx: mpsc::UnboundedReceiver<Reply>,
    ) -> Self {
        let shutdown_rx = hub.subscribe_shutdown();
        Self {
            id,
            addr,
            hub,
            framed: Framed::new(stream, CommandCodec::new()),
            queue,
            outgoing_rx,
            shutdown_rx,
            username: None,
        }
    }

    /// Drive the session to completion.
    ///
    /// However the session ends, the leave announcement (if the user ever
    /// reached Chatting) is published before the roster entry is dropped.
    #[instrument(skip(self), fields(id = %self.id, addr = %self.addr), name = "session")]
    pub async fn run(mut self) -> anyhow::Result<()> {
        let result = self.serve().await;

        if let Some(name) = self.username.take() {
            let _ = self.queue.send(Broadcast::left(&name));
            info!(username = %name, "User left the chat");
        }
        let _ = self.hub.roster.remove(self.id);

        result
    }

    async fn serve(&mut self) -> anyhow::Result<()> {
        // The shutdown receiver only sees signals sent after it subscribed,
        // so a session accepted mid-shutdown has to check the flag itself.
        if self.hub.is_shutting_down() {
            return Ok(());
        }
        if !self.password_phase().await? {
            return Ok(());
        }
        if !self.login_phase().await? {
            return Ok(());
        }
        self.chat_loop().await
    }

    /// Read the next record, or `None` when the peer is gone (close or
    /// read error) or shutdown was signalled.
    async fn next_command(&mut self) -> Option<Command> {
        tokio::select! {
            maybe = self.framed.next() => match maybe {
                Some(Ok(cmd)) => Some(cmd),
                Some(Err(e)) => {
                    debug!(error = %e, "Read error");
                    None
                }
                None => None,
            },
            _ = self.shutdown_rx.recv() => None,
        }
    }

    /// Write one reply record. A peer that has stopped reading leaves the
    /// send pending indefinitely, so the write races the shutdown signal;
    /// `Ok(false)` means shutdown fired before the write completed and the
    /// session must close.
    async fn send_reply(&mut self, reply: Reply) -> anyhow::Result<bool> {
        tokio::select! {
            res = self.framed.send(reply) => {
                res?;
                Ok(true)
            }
            _ = self.shutdown_rx.recv() => Ok(false),
        }
    }

    /// Run the password gate. `Ok(true)` means the client advanced to the
    /// login step.
    async fn password_phase(&mut self) -> anyhow::Result<bool> {
        let mut attempts = 0u8;
        loop {
            if !self.send_reply(Reply::Password).await? {
                return Ok(false);
            }

            let Some(cmd) = self.next_command().await else {
                return Ok(false);
            };

            let failure = match cmd {
                Command::Pass(pw) if pw == self.hub.password => {
                    debug!("Password accepted");
                    if !self.send_reply(Reply::OkPass).await? {
                        return Ok(false);
                    }
                    self.hub.roster.set_phase(self.id, Phase::LoginWait);
                    return Ok(true);
                }
                Command::Pass(_) => SessionError::BadPassword,
                _ => SessionError::ExpectedPass,
            };

            attempts += 1;
            debug!(attempts, error = %failure, "Password attempt failed");
            if !self.send_reply(failure.to_reply()).await? {
                return Ok(false);
            }

            if attempts >= MAX_PASSWORD_ATTEMPTS {
                self.send_reply(SessionError::TooManyAttempts.to_reply())
                    .await?;
                return Ok(false);
            }
        }
    }

    /// Run the login step. `Ok(true)` means the username was claimed and
    /// the join announcement published. Every failure here is terminal.
    async fn login_phase(&mut self) -> anyhow::Result<bool> {
        let Some(cmd) = self.next_command().await else {
            return Ok(false);
        };

        let failure = match cmd {
            Command::Login(name) => match self.hub.roster.claim_username(self.id, &name) {
                ClaimOutcome::Claimed => {
                    if !self.send_reply(Reply::Ok).await? {
                        return Ok(false);
                    }
                    let _ = self.queue.send(Broadcast::joined(&name));
                    info!(username = %name, "User joined the chat");
                    self.username = Some(name);
                    return Ok(true);
                }
                ClaimOutcome::Taken => SessionError::UsernameTaken,
                ClaimOutcome::Invalid if name.is_empty() => SessionError::EmptyUsername,
                ClaimOutcome::Invalid => SessionError::InvalidLogin,
            },
            _ => SessionError::InvalidLogin,
        };

        debug!(error = %failure, "Login rejected");
        self.send_reply(failure.to_reply()).await?;
        Ok(false)
    }

    /// Chatting steady state: publish incoming `MSG` records to the
    /// queue, drain the outgoing channel to the socket, and fall out on
    /// QUIT, disconnect, or shutdown.
    async fn chat_loop(&mut self) -> anyhow::Result<()> {
        let username = self.username.clone().unwrap_or_default();
        loop {
            tokio::select! {
                maybe = self.framed.next() => match maybe {
                    Some(Ok(Command::Msg(body))) => {
                        let body = truncate_body(&body).to_string();
                        let _ = self.queue.send(Broadcast::new(username.clone(), body));
                    }
                    Some(Ok(Command::Quit)) => {
                        debug!("Client quit");
                        return Ok(());
                    }
                    Some(Ok(other)) => {
                        let failure = SessionError::UnknownCommand(other.to_string());
                        debug!(error = %failure, "Rejected record");
                        if !self.send_reply(failure.to_reply()).await? {
                            return Ok(());
                        }
                    }
                    Some(Err(e)) => {
                        debug!(error = %e, "Read error");
                        return Ok(());
                    }
                    None => {
                        debug!("Client disconnected");
                        return Ok(());
                    }
                },
                maybe = self.outgoing_rx.recv() => {
                    let Some(reply) = maybe else {
                        return Ok(());
                    };
                    if !self.send_reply(reply).await? {
                        return Ok(());
                    }
                },
                _ = self.shutdown_rx.recv() => {
                    debug!("Shutdown signal received");
                    return Ok(());
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
