//! Error types for the session layer.

use crate::PeerId;

/// Errors that can occur while tracking peers or preparing lines for them.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No peer is registered under this id. Either it never connected or
    /// it already disconnected.
    #[error("no peer {0}")]
    NotFound(PeerId),

    /// A peer with this id is already connected.
    #[error("peer {0} is already connected")]
    AlreadyConnected(PeerId),

    /// The message itself couldn't be prepared, e.g. its lookup key isn't
    /// valid text. This is a bug at the sender.
    #[error(transparent)]
    Protocol(#[from] hexline_protocol::ProtocolError),
}
