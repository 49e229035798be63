//! Concrete message types for hexline.
//!
//! A representative catalog, covering every template shape and every
//! compatibility rule the protocol supports:
//!
//! | Shape | Types |
//! |---|---|
//! | game + 1..4 ints | [`LongestRoad`], [`SetTurn`], [`MoveRobber`], [`RevealFogHex`], [`PutPiece`] |
//! | game + int list | [`DiceResultResources`], [`PlayerElements`] |
//! | string list | [`GameMembers`], [`LocalizedStrings`], [`ChangeGameOptions`] (with groups) |
//! | custom, free text | [`GameTextMsg`], [`GameServerText`], [`SvpTextMessage`], [`UndoNotAllowedReasonText`] |
//! | custom, optional trailing fields | [`VersionMsg`] |
//!
//! [`GameMessage`] is the enum over all of them, and [`registry()`] the
//! shared decoder:
//!
//! ```rust
//! use hexline_catalog::{registry, GameMessage};
//!
//! let msg = registry().dispatch("1055|Game1,2");
//! assert!(matches!(msg, Some(GameMessage::SetTurn(_))));
//!
//! // Unknown types and garbage are both just `None`.
//! assert!(registry().dispatch("99999|whatever").is_none());
//! assert!(registry().dispatch("not a message").is_none());
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod checked;
pub mod ids;
mod message;
mod templates;
mod text;
mod version;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use message::{build_registry, build_registry_with, registry, GameMessage};
pub use templates::{
    ChangeGameOptions, DiceResultResources, ElementAction, GameMembers, LocalizedStrings,
    LongestRoad, MoveRobber, PlayerElements, PlayerGain, PutPiece, RevealFogHex, SetTurn,
};
pub use text::{GameServerText, GameTextMsg, SvpTextMessage, UndoNotAllowedReasonText};
pub use version::VersionMsg;
