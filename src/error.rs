//! Unified error handling for natterd.
//!
//! Session errors are conversation-level failures: each one maps to an
//! `ERR:<reason>` record on the wire. I/O failures are not represented
//! here; they propagate as `anyhow` errors at the task seams.

use natter_proto::Reply;
use thiserror::Error;

/// Errors that can occur while driving a client session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("bad password")]
    BadPassword,

    #[error("expected a PASS record")]
    ExpectedPass,

    #[error("too many password attempts")]
    TooManyAttempts,

    #[error("invalid login record")]
    InvalidLogin,

    #[error("empty username")]
    EmptyUsername,

    #[error("username taken")]
    UsernameTaken,

    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

impl SessionError {
    /// Convert to the `ERR:` reply reported to the client.
    ///
    /// The reason strings are part of the wire protocol; clients match on
    /// them, so they must stay byte-exact.
    pub fn to_reply(&self) -> Reply {
        match self {
            Self::BadPassword => Reply::err("Bad password"),
            Self::ExpectedPass => Reply::err("Expected PASS:<password>"),
            Self::TooManyAttempts => Reply::err("Too many attempts"),
            Self::InvalidLogin => Reply::err("Invalid login"),
            Self::EmptyUsername => Reply::err("Empty username"),
            Self::UsernameTaken => Reply::err("Username taken"),
            Self::UnknownCommand(_) => Reply::err("Unknown command"),
        }
    }
}
