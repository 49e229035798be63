//! Type id → decoder mapping, and the dispatcher built on it.
//!
//! The registry is generic over the message enum `M` it produces. Each
//! registered type contributes a decoder plus a function wrapping the
//! decoded value into `M`:
//!
//! ```rust
//! # use hexline_protocol::{DecodeError, FieldReader, MessageType, Registry};
//! #[derive(Debug, PartialEq)]
//! struct Ping;
//!
//! impl MessageType for Ping {
//!     const TYPE_ID: u32 = 9999;
//!     const NAME: &'static str = "Ping";
//!     fn decode(_fields: &mut FieldReader<'_>) -> Result<Self, DecodeError> {
//!         Ok(Ping)
//!     }
//! }
//!
//! #[derive(Debug, PartialEq)]
//! enum Msg {
//!     Ping(Ping),
//! }
//!
//! let registry = Registry::builder().register::<Ping>(Msg::Ping).build().unwrap();
//! assert_eq!(registry.dispatch("9999"), Some(Msg::Ping(Ping)));
//! assert_eq!(registry.dispatch("12345|x"), None);
//! ```
//!
//! Build it once at startup. After [`RegistryBuilder::build`] it is
//! read-only, so a shared `&Registry` can decode from any number of
//! connections at once without locking.
//!
//! # Decoding a line
//!
//! ```text
//! "1055|Game1,2"
//!      │
//!      ▼ split_line()           too long, line break, bad id ──→ Err
//! type id 1055, body "Game1,2"
//!      │
//!      ▼ lookup                 nobody registered 1055 ──→ Ok(None)
//! SetTurn's decoder
//!      │
//!      ▼ T::decode(fields)      missing or bad field ──→ Err
//! SetTurn { game: "Game1", player_number: 2 }
//!      │
//!      ▼ wrap
//! GameMessage::SetTurn(..)                              ──→ Ok(Some)
//! ```
//!
//! [`Registry::decode`] reports all three outcomes. [`Registry::dispatch`]
//! folds the two failures into `None` and logs the malformed case, which
//! is what a read loop wants.
//!
//! Gates and capabilities aren't checked here. They're recorded in each
//! [`EntryInfo`] for the session layer, which knows who sent the line.

use std::collections::HashMap;

use crate::config::ProtocolConfig;
use crate::field::{split_line, FieldReader};
use crate::message::{Capabilities, MessageType};
use crate::version::VersionGate;
use crate::{DecodeError, ProtocolError};

type DecodeFn<M> = Box<dyn Fn(&mut FieldReader<'_>) -> Result<M, DecodeError> + Send + Sync>;

/// Metadata about one registered type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryInfo {
    pub type_id: u32,
    /// Name used in logs, e.g. `"SetTurn"`.
    pub name: &'static str,
    /// Oldest peer version that understands the type.
    pub gate: VersionGate,
    pub caps: Capabilities,
}

struct Entry<M> {
    info: EntryInfo,
    decode: DecodeFn<M>,
}

// ---------------------------------------------------------------------------
// RegistryBuilder
// ---------------------------------------------------------------------------

/// Collects registrations. Duplicate ids are remembered, not rejected on
/// the spot, so `register` calls chain; [`build`](Self::build) reports
/// the first one.
pub struct RegistryBuilder<M> {
    entries: HashMap<u32, Entry<M>>,
    duplicate: Option<u32>,
    config: ProtocolConfig,
}

impl<M: 'static> RegistryBuilder<M> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            duplicate: None,
            config: ProtocolConfig::default(),
        }
    }

    /// Uses `config` for line limits.
    pub fn config(mut self, config: ProtocolConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers `T`, wrapping decoded values with `wrap`.
    ///
    /// `wrap` is a plain function pointer, usually an enum variant
    /// constructor like `GameMessage::SetTurn`.
    pub fn register<T>(mut self, wrap: fn(T) -> M) -> Self
    where
        T: MessageType + 'static,
    {
        let info = EntryInfo {
            type_id: T::TYPE_ID,
            name: T::NAME,
            gate: T::GATE,
            caps: T::CAPS,
        };
        if self.entries.contains_key(&info.type_id) {
            tracing::error!(type_id = info.type_id, name = info.name, "duplicate message type");
            self.duplicate.get_or_insert(info.type_id);
            return self;
        }
        let decode: DecodeFn<M> = Box::new(move |fields| T::decode(fields).map(wrap));
        self.entries.insert(info.type_id, Entry { info, decode });
        self
    }

    /// Finishes the registry.
    ///
    /// # Errors
    /// [`ProtocolError::DuplicateType`] if any id was registered twice.
    pub fn build(self) -> Result<Registry<M>, ProtocolError> {
        if let Some(type_id) = self.duplicate {
            return Err(ProtocolError::DuplicateType(type_id));
        }
        tracing::debug!(types = self.entries.len(), "message registry built");
        Ok(Registry {
            entries: self.entries,
            config: self.config,
        })
    }
}

impl<M: 'static> Default for RegistryBuilder<M> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The finished, read-only registry.
pub struct Registry<M> {
    entries: HashMap<u32, Entry<M>>,
    config: ProtocolConfig,
}

impl<M> std::fmt::Debug for Registry<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.entries.len())
            .field("config", &self.config)
            .finish()
    }
}

impl<M: 'static> Registry<M> {
    pub fn builder() -> RegistryBuilder<M> {
        RegistryBuilder::new()
    }

    /// Decodes one line.
    ///
    /// - `Ok(Some(m))`: a known type, decoded.
    /// - `Ok(None)`: a type id nobody registered. Peers on newer versions
    ///   send types we don't know; that's normal, not an error.
    /// - `Err(_)`: the line is malformed, or a known type's fields didn't
    ///   parse.
    pub fn decode(&self, line: &str) -> Result<Option<M>, DecodeError> {
        let raw = split_line(line, self.config.max_line_len)?;
        let Some(entry) = self.entries.get(&raw.type_id) else {
            tracing::trace!(type_id = raw.type_id, "ignoring unknown message type");
            return Ok(None);
        };
        let mut fields = raw.fields();
        (entry.decode)(&mut fields).map(Some)
    }

    /// Decodes one line, discarding anything that isn't a known,
    /// well-formed message.
    ///
    /// This is what a connection's read loop calls. Malformed lines are
    /// logged at `debug`; unknown types aren't logged above `trace`.
    pub fn dispatch(&self, line: &str) -> Option<M> {
        match self.decode(line) {
            Ok(msg) => msg,
            Err(err) => {
                tracing::debug!(error = %err, line_len = line.len(), "discarding malformed line");
                None
            }
        }
    }

    /// Metadata for a registered type id.
    pub fn info(&self, type_id: u32) -> Option<&EntryInfo> {
        self.entries.get(&type_id).map(|entry| &entry.info)
    }

    pub fn contains(&self, type_id: u32) -> bool {
        self.entries.contains_key(&type_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Every registered entry, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = &EntryInfo> {
        self.entries.values().map(|entry| &entry.info)
    }
}
