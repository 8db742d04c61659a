//! Line-based codec for tokio.
//!
//! This module provides a codec that reads/writes LF-terminated records,
//! accumulating partial reads in the framing buffer so a record split across
//! arbitrary read boundaries is reassembled intact.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error;
use crate::MAX_LINE_LEN;

/// Line-based codec that handles LF-terminated records.
///
/// By default, records are limited to [`MAX_LINE_LEN`] bytes (excluding the
/// LF). An oversize record is not an error: its head is yielded truncated at
/// the limit and the remainder up to the terminating LF is discarded, so the
/// peer stays connected and record order is preserved. A single `\r`
/// immediately before the LF is stripped for CRLF peers, and invalid UTF-8
/// is decoded lossily.
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum record length, excluding the LF
    max_len: usize,
    /// Set once an oversize head has been yielded; input is dropped until
    /// the record's terminating LF arrives
    discarding: bool,
}

impl LineCodec {
    /// Create a new codec with the default record limit.
    pub fn new() -> Self {
        Self {
            next_index: 0,
            max_len: MAX_LINE_LEN,
            discarding: false,
        }
    }

    /// Create a new codec with a custom record limit.
    pub fn with_max_len(max_len: usize) -> Self {
        let mut codec = Self::new();
        codec.max_len = max_len;
        codec
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        loop {
            if self.discarding {
                match src.iter().position(|b| *b == b'\n') {
                    Some(offset) => {
                        // Tail of the oversize record ends here
                        let _ = src.split_to(offset + 1);
                        self.discarding = false;
                        self.next_index = 0;
                    }
                    None => {
                        src.clear();
                        return Ok(None);
                    }
                }
                continue;
            }

            // Look for newline starting from where we left off
            if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
                // Found a record - extract it
                let mut line = src.split_to(self.next_index + offset + 1);
                self.next_index = 0;

                line.truncate(line.len() - 1);
                if line.last() == Some(&b'\r') {
                    line.truncate(line.len() - 1);
                }
                if line.len() > self.max_len {
                    line.truncate(self.max_len);
                }

                return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
            }

            // No complete record yet
            if src.len() > self.max_len {
                // Already past the limit: yield the truncated head now and
                // drop everything up to the record's LF
                let head = src.split_to(self.max_len);
                self.discarding = true;
                self.next_index = 0;
                return Ok(Some(String::from_utf8_lossy(&head).into_owned()));
            }

            self.next_index = src.len();
            return Ok(None);
        }
    }
}

impl<T: AsRef<str>> Encoder<T> for LineCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, line: T, dst: &mut BytesMut) -> error::Result<()> {
        let line = line.as_ref();
        dst.reserve(line.len() + 1);
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(b"\n");
        Ok(())
    }
}
