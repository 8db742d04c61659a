//! Server-to-client reply records.

use std::fmt;

use crate::MAX_BODY_LEN;

/// A record the server sends to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `PASSWORD:` - prompt for the shared password.
    Password,
    /// `OKPASS` - password accepted.
    OkPass,
    /// `OK` - login accepted.
    Ok,
    /// `ERR:<reason>` - rejection or protocol violation.
    Err(String),
    /// `<sender>: <body>` - one broadcast chat record.
    Broadcast {
        /// Display name of the originator (the reserved name `Server` for
        /// join/leave announcements).
        sender: String,
        /// Message text, at most [`MAX_BODY_LEN`] bytes.
        body: String,
    },
}

impl Reply {
    /// Build an `ERR:` reply.
    pub fn err(reason: impl Into<String>) -> Reply {
        Reply::Err(reason.into())
    }

    /// Build a broadcast record.
    pub fn broadcast(sender: impl Into<String>, body: impl Into<String>) -> Reply {
        Reply::Broadcast {
            sender: sender.into(),
            body: body.into(),
        }
    }

    /// Classify a control reply.
    ///
    /// Returns `None` for anything that is not one of the four control
    /// forms; such records are freeform broadcast lines. Note that broadcast
    /// lines are not reliably distinguishable from control records (a sender
    /// named `ERR` would collide), so this classifier is only meant for the
    /// handshake, before broadcasts can arrive.
    pub fn parse(line: &str) -> Option<Reply> {
        match line {
            "PASSWORD:" => Some(Reply::Password),
            "OKPASS" => Some(Reply::OkPass),
            "OK" => Some(Reply::Ok),
            _ => line.strip_prefix("ERR:").map(Reply::err),
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Password => f.write_str("PASSWORD:"),
            Reply::OkPass => f.write_str("OKPASS"),
            Reply::Ok => f.write_str("OK"),
            Reply::Err(reason) => write!(f, "ERR:{reason}"),
            Reply::Broadcast { sender, body } => write!(f, "{sender}: {body}"),
        }
    }
}

/// Cap a message body at [`MAX_BODY_LEN`] bytes.
///
/// The cut lands on a character boundary, so a multi-byte character
/// straddling the limit is dropped whole.
pub fn truncate_body(body: &str) -> &str {
    if body.len() <= MAX_BODY_LEN {
        return body;
    }
    let mut end = MAX_BODY_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
