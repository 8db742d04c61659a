//! Client-to-server command records.

use std::fmt;

/// A parsed client record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `PASS:<password>` - present the shared password.
    Pass(String),
    /// `LOGIN:<username>` - claim a username after the password phase.
    Login(String),
    /// `MSG:<text>` - publish a chat message. Empty text is permitted.
    Msg(String),
    /// `QUIT` - leave the chat.
    Quit,
    /// Any other record, carried verbatim for diagnostics.
    Unknown(String),
}

impl Command {
    /// Parse one record.
    ///
    /// Never fails: records that match no known form come back as
    /// [`Command::Unknown`]. Tag comparison is case-sensitive; the tagged
    /// forms require the `:` separator (a bare `PASS` is unknown) and `QUIT`
    /// is the whole record. Payloads run to the end of the record and may
    /// themselves contain `:`.
    pub fn parse(line: &str) -> Command {
        if line == "QUIT" {
            Command::Quit
        } else if let Some(password) = line.strip_prefix("PASS:") {
            Command::Pass(password.to_string())
        } else if let Some(username) = line.strip_prefix("LOGIN:") {
            Command::Login(username.to_string())
        } else if let Some(text) = line.strip_prefix("MSG:") {
            Command::Msg(text.to_string())
        } else {
            Command::Unknown(line.to_string())
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Pass(password) => write!(f, "PASS:{password}"),
            Command::Login(username) => write!(f, "LOGIN:{username}"),
            Command::Msg(text) => write!(f, "MSG:{text}"),
            Command::Quit => f.write_str("QUIT"),
            Command::Unknown(line) => f.write_str(line),
        }
    }
}
