//! Per-peer state and the rules for talking to each peer.
//!
//! The protocol crate knows how to turn a message into a line. This crate
//! knows which line a particular peer should get:
//!
//! - [`PeerDirectory`] tracks each connection's negotiated [`PeerInfo`]
//!   (version, locale, login state).
//! - [`Outbound`] applies the version gate, resolves localized text in the
//!   peer's locale, and encodes at the peer's version.
//! - [`Inbound`] dispatches received lines and drops game traffic from
//!   peers that haven't logged in.
//!
//! ```rust
//! use std::sync::Arc;
//! use hexline_catalog::{GameMessage, SetTurn};
//! use hexline_protocol::MemoryStrings;
//! use hexline_session::{Outbound, PeerDirectory, PeerId};
//!
//! let mut peers = PeerDirectory::new();
//! peers.connect(PeerId(1)).unwrap();
//!
//! let outbound = Outbound::new(Arc::new(MemoryStrings::new("en_US")));
//! let msg = GameMessage::SetTurn(SetTurn::new("Game1", 2).unwrap());
//! let lines = outbound.broadcast(&msg, peers.iter());
//! assert_eq!(lines, vec![(PeerId(1), "1055|Game1,2".to_string())]);
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod error;
mod inbound;
mod outbound;
mod peer;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use error::SessionError;
pub use inbound::Inbound;
pub use outbound::Outbound;
pub use peer::{PeerDirectory, PeerId, PeerInfo};
