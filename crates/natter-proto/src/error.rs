//! Error types for the protocol library.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
///
/// The codecs themselves never reject input (oversize records are truncated,
/// invalid UTF-8 is decoded lossily), so in practice every error surfaced
/// through a framed transport is an I/O failure on the underlying stream.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
