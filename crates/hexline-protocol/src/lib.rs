//! Wire protocol for hexline.
//!
//! This crate defines how messages become lines of text and back:
//!
//! - **Field codec** ([`LineBuilder`], [`split_line`], [`FieldReader`]):
//!   the separator rules and the empty-string sentinel.
//! - **Templates** ([`Templated`], [`Shape`]): shared encode/decode for
//!   the common "game plus integers" and list shapes.
//! - **Groups** ([`encode_group`], [`parse_groups`]): named sub-lists
//!   inside a string list.
//! - **Registry** ([`Registry`]): type id → decoder, and the dispatcher
//!   that drops what it can't decode.
//! - **Versions** ([`Version`], [`VersionGate`]): who may receive what.
//! - **Localization** ([`Localizable`], [`resolve`]): keyed text
//!   resolved per recipient.
//! - **Codec** ([`Codec`], [`JsonCodec`]): an optional structured path.
//!
//! # Architecture
//!
//! ```text
//! line ──split_line──→ RawLine ──Registry──→ M (message enum)
//! M ──Message::encode_for(peer)──→ line
//! ```
//!
//! Nothing here does I/O or holds mutable shared state. A built
//! [`Registry`] is read-only and can be shared across threads.

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod config;
mod error;
pub mod field;
mod groups;
mod localize;
mod message;
mod registry;
mod template;
mod version;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use config::ProtocolConfig;
pub use error::{DecodeError, ProtocolError};
pub use field::{
    decode, encode, is_single_line_and_safe, split_line, Field, FieldReader, LineBuilder,
    RawLine, EMPTY_STR, GAME_NONE, SEP, SEP2,
};
pub use groups::{encode_group, parse_groups, push_group, Group};
pub use localize::{format_text, resolve, LocalText, Localizable, MemoryStrings, StringTable};
pub use message::{Capabilities, Message, MessageType};
pub use registry::{EntryInfo, Registry, RegistryBuilder};
pub use template::{
    decode_body, encode_body, fmt_template, Body, Scope, Shape, TemplateSpec, Templated,
};
pub use version::{OptionalField, Version, VersionGate};
