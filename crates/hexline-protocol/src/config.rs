//! Protocol-level configuration.

use serde::{Deserialize, Serialize};

use crate::field::DEFAULT_MAX_LINE_LEN;
use crate::version::Version;

/// Settings shared by everything that reads or writes lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Longest line, in bytes, the dispatcher will try to decode.
    /// Anything longer is dropped as malformed.
    pub max_line_len: usize,

    /// The version this side announces. The session send path also caps
    /// every encoding at it. [`Message::encode`](crate::Message::encode)
    /// on its own always writes the [`Version::CURRENT`] form.
    pub local_version: Version,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            max_line_len: DEFAULT_MAX_LINE_LEN,
            local_version: Version::CURRENT,
        }
    }
}
