//! The traits every message type implements.
//!
//! Two traits, split by what they're used for:
//!
//! - [`MessageType`] is *static*: the type id, name, version gate and
//!   decoder of a type. The registry stores one decoder per type and
//!   needs these without having a value in hand.
//! - [`Message`] is *object-safe*: what you can do with a value you
//!   already have. Encode it for a peer, ask which game it belongs to,
//!   print it for a log line. `&dyn Message` works.

use std::fmt;
use std::ops::BitOr;

use crate::field::FieldReader;
use crate::version::{Version, VersionGate};
use crate::DecodeError;

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// Per-type flags the registry and session layer care about.
///
/// A tiny bit set; combine with `|` at runtime or [`union`](Self::union)
/// in a `const`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    pub const NONE: Capabilities = Capabilities(0);

    /// May be accepted from a peer that hasn't authenticated yet.
    pub const FROM_UNAUTHENTICATED: Capabilities = Capabilities(1);

    /// Carries a lookup key that must be resolved per recipient.
    pub const LOCALIZED: Capabilities = Capabilities(1 << 1);

    pub const fn union(self, other: Capabilities) -> Capabilities {
        Capabilities(self.0 | other.0)
    }

    pub const fn contains(self, other: Capabilities) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Capabilities {
    type Output = Capabilities;

    fn bitor(self, rhs: Capabilities) -> Capabilities {
        self.union(rhs)
    }
}

// ---------------------------------------------------------------------------
// MessageType
// ---------------------------------------------------------------------------

/// Static description of a message type, plus its decoder.
///
/// Only `TYPE_ID`, `NAME` and `decode` are required; gate and
/// capabilities have defaults.
///
/// `decode` receives a [`FieldReader`] positioned at the first body field
/// (the game name, for game-scoped types). It must not panic: every parse
/// problem is a [`DecodeError`], and the registry turns that into
/// "ignore this line".
pub trait MessageType: Sized {
    const TYPE_ID: u32;
    const NAME: &'static str;
    const GATE: VersionGate = VersionGate::BASELINE;
    const CAPS: Capabilities = Capabilities::NONE;

    fn decode(fields: &mut FieldReader<'_>) -> Result<Self, DecodeError>;
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// Behavior of a message value.
///
/// `Display` is the diagnostic form (`Name:game=...|field=...`) used in
/// logs; it is never sent.
pub trait Message: fmt::Display {
    fn type_id(&self) -> u32;

    /// The game this message is scoped to, if any.
    fn game(&self) -> Option<&str>;

    fn gate(&self) -> VersionGate;

    /// Encodes for a peer at `peer`, leaving off optional trailing fields
    /// it doesn't understand.
    ///
    /// Doesn't check the gate itself; that's the sender's job (see
    /// [`VersionGate::check`]).
    fn encode_for(&self, peer: Version) -> String;

    /// Encodes with every field this build knows.
    fn encode(&self) -> String {
        self.encode_for(Version::CURRENT)
    }
}
