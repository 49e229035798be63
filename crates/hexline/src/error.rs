//! Unified error type for hexline.

use hexline_protocol::{DecodeError, ProtocolError};
use hexline_session::SessionError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attributes let `?` convert sub-crate errors, so code
/// using the `hexline` crate only has to deal with this one type.
#[derive(Debug, thiserror::Error)]
pub enum HexlineError {
    /// A message couldn't be built, registered, or sent to a peer.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A line couldn't be parsed.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A peer-tracking error (unknown or duplicate connection).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Reading or writing the underlying stream failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file couldn't be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
