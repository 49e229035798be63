//! Text-carrying message types.
//!
//! Each of these ends with a free-text field read verbatim to the end of
//! the line, so the text may contain commas. Two of them carry lookup
//! keys and implement [`Localizable`].

use std::fmt;

use hexline_protocol::field::{check_game, check_str, check_text};
use hexline_protocol::{
    Capabilities, DecodeError, FieldReader, LineBuilder, LocalText, Localizable, Message,
    MessageType, ProtocolError, Version, VersionGate,
};
use serde::{Deserialize, Serialize};

use crate::checked::deserialize_checked;
use crate::ids;

// ---------------------------------------------------------------------------
// GameTextMsg
// ---------------------------------------------------------------------------

/// Chat text from a player in a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GameTextMsgFields")]
pub struct GameTextMsg {
    game: String,
    nickname: String,
    text: String,
}

deserialize_checked!(GameTextMsg via GameTextMsgFields {
    game: String,
    nickname: String,
    text: String,
} => |raw| GameTextMsg::new(raw.game, raw.nickname, raw.text));

impl GameTextMsg {
    /// Nickname used for text the server itself sends.
    pub const SERVER_NAME: &'static str = "Server";

    pub fn new(
        game: impl Into<String>,
        nickname: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<Self, ProtocolError> {
        let (game, nickname, text) = (game.into(), nickname.into(), text.into());
        check_game(&game)?;
        if nickname.is_empty() {
            return Err(ProtocolError::invalid("nickname", "empty"));
        }
        check_str("nickname", &nickname)?;
        check_text("text", &text)?;
        Ok(Self {
            game,
            nickname,
            text,
        })
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl MessageType for GameTextMsg {
    const TYPE_ID: u32 = ids::GAMETEXTMSG;
    const NAME: &'static str = "GameTextMsg";

    fn decode(fields: &mut FieldReader<'_>) -> Result<Self, DecodeError> {
        let game = fields.next_str("game")?;
        let nickname = fields.next_str("nickname")?;
        let text = fields.remainder("text")?;
        Ok(Self::new(game, nickname, text)?)
    }
}

impl Message for GameTextMsg {
    fn type_id(&self) -> u32 {
        Self::TYPE_ID
    }

    fn game(&self) -> Option<&str> {
        Some(&self.game)
    }

    fn gate(&self) -> VersionGate {
        Self::GATE
    }

    fn encode_for(&self, _peer: Version) -> String {
        LineBuilder::new(Self::TYPE_ID)
            .str(&self.game)
            .str(&self.nickname)
            .text(&self.text)
            .finish()
    }
}

impl fmt::Display for GameTextMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GameTextMsg:game={}|nickname={}|text={}",
            self.game, self.nickname, self.text
        )
    }
}

// ---------------------------------------------------------------------------
// GameServerText
// ---------------------------------------------------------------------------

/// Text from the server to everyone in a game. Replaced `GameTextMsg` with
/// the server's nickname in 2.0.00.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GameServerTextFields")]
pub struct GameServerText {
    game: String,
    text: String,
}

deserialize_checked!(GameServerText via GameServerTextFields {
    game: String,
    text: String,
} => |raw| GameServerText::new(raw.game, raw.text));

impl GameServerText {
    pub fn new(game: impl Into<String>, text: impl Into<String>) -> Result<Self, ProtocolError> {
        let (game, text) = (game.into(), text.into());
        check_game(&game)?;
        check_text("text", &text)?;
        Ok(Self { game, text })
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl MessageType for GameServerText {
    const TYPE_ID: u32 = ids::GAMESERVERTEXT;
    const NAME: &'static str = "GameServerText";
    const GATE: VersionGate = VersionGate::since(Version::I18N);

    fn decode(fields: &mut FieldReader<'_>) -> Result<Self, DecodeError> {
        let game = fields.next_str("game")?;
        let text = fields.remainder("text")?;
        Ok(Self::new(game, text)?)
    }
}

impl Message for GameServerText {
    fn type_id(&self) -> u32 {
        Self::TYPE_ID
    }

    fn game(&self) -> Option<&str> {
        Some(&self.game)
    }

    fn gate(&self) -> VersionGate {
        Self::GATE
    }

    fn encode_for(&self, _peer: Version) -> String {
        LineBuilder::new(Self::TYPE_ID)
            .str(&self.game)
            .text(&self.text)
            .finish()
    }
}

impl fmt::Display for GameServerText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GameServerText:game={}|text={}", self.game, self.text)
    }
}

// ---------------------------------------------------------------------------
// SvpTextMessage
// ---------------------------------------------------------------------------

/// A player earned Special Victory Points; `description` says why.
///
/// Built with a lookup key as the description, resolved per recipient.
/// The translated text may use `{0}` for the point count. A decoded
/// description is already in the sender's chosen language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SvpTextMessageFields")]
pub struct SvpTextMessage {
    game: String,
    player_number: i32,
    svp: i32,
    description: LocalText,
}

deserialize_checked!(SvpTextMessage via SvpTextMessageFields {
    game: String,
    player_number: i32,
    svp: i32,
    description: LocalText,
} => |raw| SvpTextMessage::build(raw.game, raw.player_number, raw.svp, raw.description));

impl SvpTextMessage {
    /// Builds a message whose description is a lookup key.
    pub fn new(
        game: impl Into<String>,
        player_number: i32,
        svp: i32,
        description: impl Into<String>,
    ) -> Result<Self, ProtocolError> {
        Self::build(
            game.into(),
            player_number,
            svp,
            LocalText::Key(description.into()),
        )
    }

    fn build(
        game: String,
        player_number: i32,
        svp: i32,
        description: LocalText,
    ) -> Result<Self, ProtocolError> {
        check_game(&game)?;
        if description.as_str().is_empty() {
            return Err(ProtocolError::invalid("description", "empty"));
        }
        check_text("description", description.as_str())?;
        Ok(Self {
            game,
            player_number,
            svp,
            description,
        })
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn player_number(&self) -> i32 {
        self.player_number
    }

    pub fn svp(&self) -> i32 {
        self.svp
    }

    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    pub fn is_localized(&self) -> bool {
        self.description.is_literal()
    }
}

impl MessageType for SvpTextMessage {
    const TYPE_ID: u32 = ids::SVPTEXTMSG;
    const NAME: &'static str = "SvpTextMessage";
    const GATE: VersionGate = VersionGate::since(Version::I18N);
    const CAPS: Capabilities = Capabilities::LOCALIZED;

    fn decode(fields: &mut FieldReader<'_>) -> Result<Self, DecodeError> {
        let game = fields.next_str("game")?;
        let player_number = fields.next_int("pn")?;
        let svp = fields.next_int("svp")?;
        let description = LocalText::Literal(fields.remainder("desc")?);
        Ok(Self::build(game, player_number, svp, description)?)
    }
}

impl Message for SvpTextMessage {
    fn type_id(&self) -> u32 {
        Self::TYPE_ID
    }

    fn game(&self) -> Option<&str> {
        Some(&self.game)
    }

    fn gate(&self) -> VersionGate {
        Self::GATE
    }

    fn encode_for(&self, _peer: Version) -> String {
        LineBuilder::new(Self::TYPE_ID)
            .str(&self.game)
            .int(self.player_number)
            .int(self.svp)
            .text(self.description.as_str())
            .finish()
    }
}

impl Localizable for SvpTextMessage {
    fn key(&self) -> Option<&str> {
        self.description.key()
    }

    fn args(&self) -> Vec<String> {
        vec![self.svp.to_string()]
    }

    fn localize(&self, text: &str) -> Result<Self, ProtocolError> {
        Self::build(
            self.game.clone(),
            self.player_number,
            self.svp,
            LocalText::Literal(text.to_string()),
        )
    }
}

impl fmt::Display for SvpTextMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SvpTextMessage:game={}|pn={}|svp={}|desc={}",
            self.game,
            self.player_number,
            self.svp,
            self.description.as_str()
        )
    }
}

// ---------------------------------------------------------------------------
// UndoNotAllowedReasonText
// ---------------------------------------------------------------------------

/// Whether undo is allowed in a game, and optionally why not.
///
/// The reason is a lookup key until localized. Values decoded off the wire
/// are already localized; their [`key`](Localizable::key) is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UndoNotAllowedReasonTextFields")]
pub struct UndoNotAllowedReasonText {
    game: String,
    not_allowed: bool,
    reason: Option<LocalText>,
}

deserialize_checked!(UndoNotAllowedReasonText via UndoNotAllowedReasonTextFields {
    game: String,
    not_allowed: bool,
    reason: Option<LocalText>,
} => |raw| UndoNotAllowedReasonText::build(raw.game, raw.not_allowed, raw.reason));

impl UndoNotAllowedReasonText {
    /// Builds a message whose reason, if any, is a lookup key.
    pub fn new(
        game: impl Into<String>,
        not_allowed: bool,
        reason: Option<String>,
    ) -> Result<Self, ProtocolError> {
        Self::build(game.into(), not_allowed, reason.map(LocalText::Key))
    }

    fn build(
        game: String,
        not_allowed: bool,
        reason: Option<LocalText>,
    ) -> Result<Self, ProtocolError> {
        check_game(&game)?;
        if let Some(reason) = &reason {
            if reason.as_str().is_empty() {
                return Err(ProtocolError::invalid("reason", "empty when present"));
            }
            check_text("reason", reason.as_str())?;
        }
        Ok(Self {
            game,
            not_allowed,
            reason,
        })
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn is_not_allowed(&self) -> bool {
        self.not_allowed
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_ref().map(LocalText::as_str)
    }

    /// `true` unless the reason is still a lookup key.
    pub fn is_localized(&self) -> bool {
        !matches!(self.reason, Some(LocalText::Key(_)))
    }
}

impl MessageType for UndoNotAllowedReasonText {
    const TYPE_ID: u32 = ids::UNDONOTALLOWEDREASONTEXT;
    const NAME: &'static str = "UndoNotAllowedReasonText";
    const GATE: VersionGate = VersionGate::since(Version(2700));
    const CAPS: Capabilities = Capabilities::LOCALIZED;

    fn decode(fields: &mut FieldReader<'_>) -> Result<Self, DecodeError> {
        let game = fields.next_str("game")?;
        let not_allowed = match fields.next_int("isNotAllowed")? {
            0 => false,
            1 => true,
            other => {
                return Err(DecodeError::BadBool {
                    field: "isNotAllowed",
                    value: other.to_string(),
                });
            }
        };
        let reason = fields
            .opt_remainder()
            .filter(|r| !r.is_empty())
            .map(LocalText::Literal);
        Ok(Self::build(game, not_allowed, reason)?)
    }
}

impl Message for UndoNotAllowedReasonText {
    fn type_id(&self) -> u32 {
        Self::TYPE_ID
    }

    fn game(&self) -> Option<&str> {
        Some(&self.game)
    }

    fn gate(&self) -> VersionGate {
        Self::GATE
    }

    fn encode_for(&self, _peer: Version) -> String {
        let line = LineBuilder::new(Self::TYPE_ID)
            .str(&self.game)
            .bool(self.not_allowed);
        match &self.reason {
            Some(reason) => line.text(reason.as_str()).finish(),
            None => line.finish(),
        }
    }
}

impl Localizable for UndoNotAllowedReasonText {
    fn key(&self) -> Option<&str> {
        self.reason.as_ref().and_then(LocalText::key)
    }

    fn localize(&self, text: &str) -> Result<Self, ProtocolError> {
        Self::build(
            self.game.clone(),
            self.not_allowed,
            Some(LocalText::Literal(text.to_string())),
        )
    }
}

impl fmt::Display for UndoNotAllowedReasonText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UndoNotAllowedReasonText:game={}|isNotAllowed={}",
            self.game, self.not_allowed as u8
        )?;
        if let Some(reason) = &self.reason {
            write!(f, "|reason={}", reason.as_str())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexline_protocol::{resolve, split_line, MemoryStrings, EMPTY_STR};

    fn decode<T: MessageType>(line: &str) -> Result<T, DecodeError> {
        let raw = split_line(line, 4096)?;
        assert_eq!(raw.type_id, T::TYPE_ID, "line {line:?}");
        T::decode(&mut raw.fields())
    }

    #[test]
    fn test_game_text_with_commas_round_trips() {
        let msg = GameTextMsg::new("Game1", "alice", "hi, all, ready?").unwrap();
        let line = msg.encode();
        assert_eq!(line, "1010|Game1,alice,hi, all, ready?");
        assert_eq!(decode::<GameTextMsg>(&line).unwrap(), msg);
    }

    #[test]
    fn test_game_text_keeps_commas_at_either_end() {
        let registry = crate::registry();
        for text in [",", ",x", "a,,", ", hi", ",,"] {
            let msg = GameTextMsg::new("Game1", "alice", text).unwrap();
            let line = msg.encode();
            assert_eq!(decode::<GameTextMsg>(&line).unwrap(), msg, "{line:?}");
            assert_eq!(
                registry.dispatch(&line),
                Some(crate::GameMessage::GameTextMsg(msg)),
                "{line:?}"
            );
        }
    }

    #[test]
    fn test_undo_reason_keeps_leading_comma() {
        let msg = decode::<UndoNotAllowedReasonText>("1105|g,1,, not now").unwrap();
        assert_eq!(msg.reason(), Some(", not now"));
    }

    #[test]
    fn test_game_text_empty_uses_sentinel() {
        let msg = GameTextMsg::new("Game1", "alice", "").unwrap();
        let line = msg.encode();
        assert_eq!(line, format!("1010|Game1,alice,{EMPTY_STR}"));
        let back = decode::<GameTextMsg>(&line).unwrap();
        assert_eq!(back.text(), "");
    }

    #[test]
    fn test_game_text_missing_text_fails() {
        assert!(matches!(
            decode::<GameTextMsg>("1010|Game1,alice"),
            Err(DecodeError::MissingField("text"))
        ));
    }

    #[test]
    fn test_text_rejects_separator_and_newline() {
        assert!(GameTextMsg::new("g", "alice", "a|b").is_err());
        assert!(GameServerText::new("g", "line\nbreak").is_err());
        assert!(GameTextMsg::new("g", "a,b", "hi").is_err());
    }

    #[test]
    fn test_game_server_text_round_trip() {
        let msg = GameServerText::new("g", "alice rolled a 7, robber moves").unwrap();
        assert_eq!(decode::<GameServerText>(&msg.encode()).unwrap(), msg);
        assert_eq!(GameServerText::GATE.min, Version::I18N);
    }

    #[test]
    fn test_svp_text_localizes_per_locale() {
        let strings = MemoryStrings::new("en")
            .with("en", "event.svp.island", "{0} VP for settling a new island")
            .with("es", "event.svp.island", "{0} PV por asentar una isla nueva");
        let keyed = SvpTextMessage::new("g", 2, 2, "event.svp.island").unwrap();

        let en = resolve(&keyed, Some("en_US"), Version::CURRENT, &strings).unwrap();
        let es = resolve(&keyed, Some("es_ES"), Version::CURRENT, &strings).unwrap();

        assert_eq!(en.description(), "2 VP for settling a new island");
        assert_eq!(es.description(), "2 PV por asentar una isla nueva");
        assert_eq!(en.player_number(), es.player_number());
        assert_eq!(en.svp(), es.svp());
        assert_eq!(en.game(), es.game());
        assert_eq!(keyed.description(), "event.svp.island");
    }

    #[test]
    fn test_svp_text_round_trip() {
        let msg = SvpTextMessage::new("g", 1, 2, "settled a new island, far away").unwrap();
        let line = msg.encode();
        assert_eq!(line, "1099|g,1,2,settled a new island, far away");
        assert_eq!(decode::<SvpTextMessage>(&line).unwrap(), msg);
    }

    #[test]
    fn test_undo_reason_optional_trailing_field() {
        let with_reason = decode::<UndoNotAllowedReasonText>("1105|g,1,Not in this scenario").unwrap();
        assert!(with_reason.is_not_allowed());
        assert_eq!(with_reason.reason(), Some("Not in this scenario"));

        let without = decode::<UndoNotAllowedReasonText>("1105|g,0").unwrap();
        assert!(!without.is_not_allowed());
        assert_eq!(without.reason(), None);

        assert!(decode::<UndoNotAllowedReasonText>("1105|g,2").is_err());
    }

    #[test]
    fn test_undo_reason_key_only_before_localizing() {
        let keyed = UndoNotAllowedReasonText::new("g", true, Some("undo.no.sc".into())).unwrap();
        assert_eq!(keyed.key(), Some("undo.no.sc"));

        let local = keyed.localize("Can't undo here").unwrap();
        assert_eq!(local.key(), None);
        assert!(local.is_localized());
        assert_eq!(local.encode(), "1105|g,1,Can't undo here");

        // Decoded values count as localized.
        let decoded = decode::<UndoNotAllowedReasonText>(&local.encode()).unwrap();
        assert_eq!(decoded.key(), None);
    }

    #[test]
    fn test_undo_reason_without_key_resolves_to_itself() {
        let msg = UndoNotAllowedReasonText::new("g", false, None).unwrap();
        let strings = MemoryStrings::new("en");
        let out = resolve(&msg, Some("en"), Version::CURRENT, &strings).unwrap();
        assert_eq!(out, msg);
        assert_eq!(out.encode(), "1105|g,0");
    }
}
