//! # natter-proto
//!
//! The wire protocol for the natter chat service.
//!
//! The protocol is line-oriented: every record is a sequence of bytes
//! terminated by a single LF. A record is a tag, optionally followed by `:`
//! and a payload. Clients send [`Command`] records (`PASS:`, `LOGIN:`,
//! `MSG:`, `QUIT`); the server answers with [`Reply`] records (`PASSWORD:`,
//! `OKPASS`, `OK`, `ERR:<reason>`) and freeform broadcast lines of the form
//! `<sender>: <body>`.
//!
//! ## Features
//!
//! - LF framing over a persistent accumulator ([`LineCodec`]), tolerant of
//!   records split across reads and of several records per read
//! - Oversize records truncated at [`MAX_LINE_LEN`] instead of killing the
//!   connection
//! - Typed command parsing and reply serialization ([`CommandCodec`])
//!
//! ## Quick Start
//!
//! ```rust
//! use natter_proto::{Command, Reply};
//!
//! assert_eq!(Command::parse("LOGIN:alice"), Command::Login("alice".into()));
//! assert_eq!(Command::Quit.to_string(), "QUIT");
//!
//! let reply = Reply::err("Username taken");
//! assert_eq!(reply.to_string(), "ERR:Username taken");
//! assert_eq!(Reply::parse("OKPASS"), Some(Reply::OkPass));
//! assert_eq!(Reply::parse("alice: hello"), None); // freeform broadcast
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod codec;
pub mod command;
pub mod error;
pub mod line;
pub mod reply;

pub use self::codec::CommandCodec;
pub use self::command::Command;
pub use self::error::ProtocolError;
pub use self::line::LineCodec;
pub use self::reply::{Reply, truncate_body};

/// Default TCP port the service listens on.
pub const DEFAULT_PORT: u16 = 12345;

/// How many password attempts the server grants before it gives up.
pub const MAX_PASSWORD_ATTEMPTS: u8 = 5;

/// Longest accepted username, in bytes.
pub const MAX_USERNAME_LEN: usize = 31;

/// Longest accepted message body, in bytes.
pub const MAX_BODY_LEN: usize = 1023;

/// Longest accepted record, in bytes, excluding the terminating LF.
///
/// Anything longer is truncated to this bound and the remainder up to the
/// next LF is discarded.
pub const MAX_LINE_LEN: usize = 1087;

/// Reserved sender name used for join/leave announcements.
pub const SERVER_SENDER: &str = "Server";
