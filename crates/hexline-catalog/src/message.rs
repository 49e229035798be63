//! The closed set of catalog messages and the built-in registry.

use std::fmt;
use std::sync::OnceLock;

use hexline_protocol::{
    Capabilities, Localizable, Message, MessageType, ProtocolConfig, ProtocolError, Registry,
    Version, VersionGate,
};
use serde::{Deserialize, Serialize};

use crate::templates::{
    ChangeGameOptions, DiceResultResources, GameMembers, LocalizedStrings, LongestRoad,
    MoveRobber, PlayerElements, PutPiece, RevealFogHex, SetTurn,
};
use crate::text::{GameServerText, GameTextMsg, SvpTextMessage, UndoNotAllowedReasonText};
use crate::version::VersionMsg;

/// Every message type the catalog knows.
///
/// Serializes with an explicit tag for the structured path:
///
/// ```json
/// { "type": "SetTurn", "body": { "game": "Game1", "player_number": 2 } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "body")]
pub enum GameMessage {
    LongestRoad(LongestRoad),
    SetTurn(SetTurn),
    MoveRobber(MoveRobber),
    RevealFogHex(RevealFogHex),
    PutPiece(PutPiece),
    DiceResultResources(DiceResultResources),
    PlayerElements(PlayerElements),
    GameMembers(GameMembers),
    LocalizedStrings(LocalizedStrings),
    ChangeGameOptions(ChangeGameOptions),
    GameTextMsg(GameTextMsg),
    GameServerText(GameServerText),
    SvpTextMessage(SvpTextMessage),
    UndoNotAllowedReasonText(UndoNotAllowedReasonText),
    Version(VersionMsg),
}

/// Runs `$body` with `$m` bound to the inner message of any variant.
macro_rules! each_variant {
    ($value:expr, $m:ident => $body:expr) => {
        match $value {
            GameMessage::LongestRoad($m) => $body,
            GameMessage::SetTurn($m) => $body,
            GameMessage::MoveRobber($m) => $body,
            GameMessage::RevealFogHex($m) => $body,
            GameMessage::PutPiece($m) => $body,
            GameMessage::DiceResultResources($m) => $body,
            GameMessage::PlayerElements($m) => $body,
            GameMessage::GameMembers($m) => $body,
            GameMessage::LocalizedStrings($m) => $body,
            GameMessage::ChangeGameOptions($m) => $body,
            GameMessage::GameTextMsg($m) => $body,
            GameMessage::GameServerText($m) => $body,
            GameMessage::SvpTextMessage($m) => $body,
            GameMessage::UndoNotAllowedReasonText($m) => $body,
            GameMessage::Version($m) => $body,
        }
    };
}

impl GameMessage {
    /// Capability flags of this message's type.
    pub fn caps(&self) -> Capabilities {
        fn caps_of<T: MessageType>(_: &T) -> Capabilities {
            T::CAPS
        }
        each_variant!(self, m => caps_of(m))
    }

    /// Short type name, as used in diagnostics.
    pub fn name(&self) -> &'static str {
        fn name_of<T: MessageType>(_: &T) -> &'static str {
            T::NAME
        }
        each_variant!(self, m => name_of(m))
    }
}

impl Message for GameMessage {
    fn type_id(&self) -> u32 {
        each_variant!(self, m => m.type_id())
    }

    fn game(&self) -> Option<&str> {
        each_variant!(self, m => Message::game(m))
    }

    fn gate(&self) -> VersionGate {
        each_variant!(self, m => m.gate())
    }

    fn encode_for(&self, peer: Version) -> String {
        each_variant!(self, m => m.encode_for(peer))
    }
}

impl fmt::Display for GameMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        each_variant!(self, m => fmt::Display::fmt(m, f))
    }
}

/// Only the two keyed types have anything to resolve; everything else is
/// passed through unchanged.
impl Localizable for GameMessage {
    fn key(&self) -> Option<&str> {
        match self {
            GameMessage::SvpTextMessage(m) => m.key(),
            GameMessage::UndoNotAllowedReasonText(m) => m.key(),
            _ => None,
        }
    }

    fn args(&self) -> Vec<String> {
        match self {
            GameMessage::SvpTextMessage(m) => m.args(),
            GameMessage::UndoNotAllowedReasonText(m) => m.args(),
            _ => Vec::new(),
        }
    }

    fn localize(&self, text: &str) -> Result<Self, ProtocolError> {
        match self {
            GameMessage::SvpTextMessage(m) => m.localize(text).map(GameMessage::SvpTextMessage),
            GameMessage::UndoNotAllowedReasonText(m) => m
                .localize(text)
                .map(GameMessage::UndoNotAllowedReasonText),
            other => Ok(other.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Builds a fresh registry with every catalog type and default settings.
///
/// # Errors
/// [`ProtocolError::DuplicateType`] if two catalog types share an id.
pub fn build_registry() -> Result<Registry<GameMessage>, ProtocolError> {
    build_registry_with(ProtocolConfig::default())
}

/// Like [`build_registry`], with a caller-supplied line limit and version.
///
/// # Errors
/// [`ProtocolError::DuplicateType`] if two catalog types share an id.
pub fn build_registry_with(config: ProtocolConfig) -> Result<Registry<GameMessage>, ProtocolError> {
    Registry::builder()
        .config(config)
        .register::<LongestRoad>(GameMessage::LongestRoad)
        .register::<SetTurn>(GameMessage::SetTurn)
        .register::<MoveRobber>(GameMessage::MoveRobber)
        .register::<RevealFogHex>(GameMessage::RevealFogHex)
        .register::<PutPiece>(GameMessage::PutPiece)
        .register::<DiceResultResources>(GameMessage::DiceResultResources)
        .register::<PlayerElements>(GameMessage::PlayerElements)
        .register::<GameMembers>(GameMessage::GameMembers)
        .register::<LocalizedStrings>(GameMessage::LocalizedStrings)
        .register::<ChangeGameOptions>(GameMessage::ChangeGameOptions)
        .register::<GameTextMsg>(GameMessage::GameTextMsg)
        .register::<GameServerText>(GameMessage::GameServerText)
        .register::<SvpTextMessage>(GameMessage::SvpTextMessage)
        .register::<UndoNotAllowedReasonText>(GameMessage::UndoNotAllowedReasonText)
        .register::<VersionMsg>(GameMessage::Version)
        .build()
}

/// The process-wide registry, built on first use.
///
/// # Panics
/// If the catalog registers one id twice. That is a bug in this crate,
/// and no traffic could be decoded correctly anyway.
pub fn registry() -> &'static Registry<GameMessage> {
    static REGISTRY: OnceLock<Registry<GameMessage>> = OnceLock::new();
    REGISTRY.get_or_init(|| match build_registry() {
        Ok(registry) => {
            tracing::debug!(types = registry.len(), "message catalog loaded");
            registry
        }
        Err(err) => {
            tracing::error!(error = %err, "built-in message catalog is inconsistent");
            panic!("built-in message catalog is inconsistent: {err}")
        }
    })
}
