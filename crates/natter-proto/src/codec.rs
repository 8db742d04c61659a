//! Server-side record codec for tokio.
//!
//! This module provides the codec a server session speaks: inbound records
//! decode to [`Command`] values and outbound [`Reply`] values serialize to
//! LF-terminated lines.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::command::Command;
use crate::error;
use crate::line::LineCodec;
use crate::reply::Reply;

/// Tokio codec for one server-side session.
///
/// Wraps [`LineCodec`], so framing tolerances (split records, truncation of
/// oversize records, CRLF peers) apply before tag parsing.
#[derive(Default)]
pub struct CommandCodec {
    inner: LineCodec,
}

impl CommandCodec {
    /// Create a new codec with the default record limit.
    pub fn new() -> Self {
        Self {
            inner: LineCodec::new(),
        }
    }
}

impl Decoder for CommandCodec {
    type Item = Command;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Command>> {
        Ok(self.inner.decode(src)?.map(|line| Command::parse(&line)))
    }
}

impl Encoder<Reply> for CommandCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, reply: Reply, dst: &mut BytesMut) -> error::Result<()> {
        self.inner.encode(reply.to_string(), dst)
    }
}
