//! Top-level configuration.

use std::path::Path;
use std::sync::Arc;

use hexline_catalog::{build_registry_with, GameMessage, VersionMsg};
use hexline_protocol::{ProtocolConfig, Registry, StringTable};
use hexline_session::Outbound;
use serde::{Deserialize, Serialize};

use crate::HexlineError;

/// Everything a hexline endpoint needs to start.
///
/// Every field has a default, so a config file only lists what it
/// changes:
///
/// ```json
/// { "default_locale": "es", "protocol": { "max_line_len": 4096 } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HexlineConfig {
    /// Line limit and local version.
    pub protocol: ProtocolConfig,

    /// Locale used for peers that don't ask for one, and for every peer
    /// older than 2.0.00.
    pub default_locale: String,

    /// `tracing` filter directive used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for HexlineConfig {
    fn default() -> Self {
        Self {
            protocol: ProtocolConfig::default(),
            default_locale: "en_US".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl HexlineConfig {
    /// Parses a config from JSON text.
    ///
    /// # Errors
    /// [`HexlineError::Config`] if the JSON is malformed or a field has
    /// the wrong type.
    pub fn from_json(json: &str) -> Result<Self, HexlineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON config file.
    ///
    /// # Errors
    /// [`HexlineError::Io`] if the file can't be read, or
    /// [`HexlineError::Config`] if it doesn't parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HexlineError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// A catalog registry using this config's line limit.
    ///
    /// # Errors
    /// [`HexlineError::Protocol`] if the catalog is inconsistent.
    pub fn registry(&self) -> Result<Registry<GameMessage>, HexlineError> {
        Ok(build_registry_with(self.protocol.clone())?)
    }

    /// A send path capped at this config's local version.
    pub fn outbound(&self, strings: Arc<dyn StringTable>) -> Outbound {
        Outbound::new(strings).with_local_version(self.protocol.local_version)
    }

    /// The version message this side sends on connect.
    ///
    /// # Errors
    /// [`HexlineError::Protocol`] if `locale` isn't a valid field.
    pub fn announcement(&self, locale: Option<String>) -> Result<VersionMsg, HexlineError> {
        let version = self.protocol.local_version;
        Ok(VersionMsg::new(version, version.to_string(), None, None, locale)?)
    }
}
