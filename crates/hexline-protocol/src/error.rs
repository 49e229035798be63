//! Error types for the protocol layer.
//!
//! There are two failure channels here, and they are deliberately kept
//! apart:
//!
//! - [`ProtocolError`] is loud. It is returned when *our own* code tries to
//!   build something invalid: a field outside its domain, a duplicate
//!   registry entry, a message sent to a peer too old to read it. The
//!   sender has a bug and must not transmit.
//! - [`DecodeError`] is quiet. It describes a line received from a peer
//!   that could not be turned into a message. The dispatcher logs it at
//!   `debug` and drops the line; the connection stays up.

use crate::version::Version;

/// Errors raised while constructing, registering, or sending messages.
///
/// `#[derive(thiserror::Error)]` generates the `std::error::Error` impl;
/// each `#[error("...")]` is the text shown when the error is printed.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Structured serialization failed (the optional JSON path).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Structured deserialization failed (the optional JSON path).
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A field value violates its declared domain: a negative coordinate,
    /// an unknown action code, text containing a separator, etc.
    #[error("invalid field `{field}`: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },

    /// Two registry entries claimed the same type identifier.
    /// Detected while building the registry, before any traffic.
    #[error("message type {0} registered twice")]
    DuplicateType(u32),

    /// The peer's negotiated version can't read this message type.
    #[error("message type {type_id} needs version {required}, peer has {peer}")]
    VersionTooOld {
        type_id: u32,
        required: Version,
        peer: Version,
    },

    /// The message type was retired before the peer's version.
    #[error("message type {type_id} is obsolete after version {max}, peer has {peer}")]
    Obsolete {
        type_id: u32,
        max: Version,
        peer: Version,
    },
}

impl ProtocolError {
    /// Shorthand for [`ProtocolError::InvalidField`].
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Why a received line could not be decoded.
///
/// Every variant means the same thing to the caller: discard the line.
/// The detail only exists for `debug` logs and tests.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("empty line")]
    Empty,

    #[error("line too long: {len} bytes (max {max})")]
    TooLong { len: usize, max: usize },

    #[error("line contains a line break")]
    LineBreak,

    /// The leading token isn't a non-negative decimal integer.
    #[error("invalid type id {0:?}")]
    BadTypeId(String),

    /// The primary separator appeared inside the message body.
    #[error("unexpected primary separator in message body")]
    StraySeparator,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is not an integer: {value:?}")]
    BadInt { field: &'static str, value: String },

    #[error("field `{field}` is not a boolean: {value:?}")]
    BadBool { field: &'static str, value: String },

    /// The field count doesn't fit the message shape.
    #[error("wrong field count: expected {expected}, got {actual}")]
    FieldCount { expected: String, actual: usize },

    /// A `<name> <count>` group marker couldn't be parsed.
    #[error("malformed group marker {0:?}")]
    BadGroupMarker(String),

    /// A group declared more items than the line still holds.
    #[error("group `{name}` declares {declared} items, only {available} remain")]
    GroupOverrun {
        name: String,
        declared: usize,
        available: usize,
    },

    #[error("unknown group `{0}`")]
    UnknownGroup(String),

    #[error("duplicate group `{0}`")]
    DuplicateGroup(String),

    /// The fields parsed, but the values failed the type's own
    /// construction checks. Same outcome as a structural failure.
    #[error("invalid message: {0}")]
    Invalid(#[from] ProtocolError),
}
