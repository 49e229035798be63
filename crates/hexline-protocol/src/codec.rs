//! Structured serialization, as an alternative to the line format.
//!
//! The line format is what peers speak. A [`Codec`] turns the same message
//! values into a structured form instead: useful for logs, test fixtures,
//! or tooling that would rather not parse separators. Every catalog type
//! derives serde traits, so any of them can take either path.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Converts values to bytes and back.
///
/// `Send + Sync + 'static` so a codec can be shared by every connection
/// task.
pub trait Codec: Send + Sync + 'static {
    /// # Errors
    /// [`ProtocolError::Encode`] if the value can't be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// # Errors
    /// [`ProtocolError::Decode`] if the bytes are malformed or don't match
    /// `T`.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] using JSON (via `serde_json`).
///
/// Behind the `json` feature, on by default.
///
/// ```rust
/// use hexline_protocol::{Codec, JsonCodec, Version};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&Version(2000)).unwrap();
/// assert_eq!(bytes, b"2000");
///
/// let back: Version = codec.decode(&bytes).unwrap();
/// assert_eq!(back, Version(2000));
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::ProtocolConfig;

    #[test]
    fn test_json_round_trips_config() {
        let codec = JsonCodec;
        let config = ProtocolConfig::default();
        let bytes = codec.encode(&config).unwrap();
        let back: ProtocolConfig = codec.decode(&bytes).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_json_decode_garbage_fails() {
        let result: Result<ProtocolConfig, _> = JsonCodec.decode(b"not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
