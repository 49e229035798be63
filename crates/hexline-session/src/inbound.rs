//! The receive path: dispatch, then check the sender may send it.

use hexline_catalog::{registry, GameMessage};
use hexline_protocol::{Capabilities, Message, Registry};

use crate::PeerInfo;

/// Decodes lines from peers and drops the ones we shouldn't act on.
#[derive(Debug, Clone, Copy)]
pub struct Inbound<'r> {
    registry: &'r Registry<GameMessage>,
}

impl Inbound<'static> {
    /// Uses the shared catalog registry.
    pub fn new() -> Self {
        Self::with_registry(registry())
    }
}

impl Default for Inbound<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> Inbound<'r> {
    pub fn with_registry(registry: &'r Registry<GameMessage>) -> Self {
        Self { registry }
    }

    /// Decodes one line from `peer`.
    ///
    /// Returns `None` for anything the handler shouldn't see: malformed
    /// lines, unknown types, and, before login, every type not flagged
    /// [`Capabilities::FROM_UNAUTHENTICATED`].
    pub fn accept(&self, line: &str, peer: &PeerInfo) -> Option<GameMessage> {
        let msg = self.registry.dispatch(line)?;
        if !peer.authenticated && !msg.caps().contains(Capabilities::FROM_UNAUTHENTICATED) {
            tracing::debug!(
                message = msg.name(),
                type_id = msg.type_id(),
                "dropped message from unauthenticated peer"
            );
            return None;
        }
        Some(msg)
    }
}
