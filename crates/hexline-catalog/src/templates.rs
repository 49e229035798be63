//! Message types built on the template shapes.
//!
//! Every type here validates in its constructor and again, through the
//! same constructor, when decoded. A value that exists is a value that
//! could be sent.

use std::fmt;

use hexline_protocol::field::{check_game, check_str};
use hexline_protocol::{
    fmt_template, parse_groups, push_group, Body, Capabilities, DecodeError, ProtocolError,
    Scope, Shape, TemplateSpec, Templated, Version, VersionGate,
};
use serde::{Deserialize, Serialize};

use crate::checked::deserialize_checked;
use crate::ids;

/// `Display` through [`fmt_template`].
macro_rules! template_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    fmt_template(self, f)
                }
            }
        )*
    };
}

template_display!(
    LongestRoad,
    SetTurn,
    MoveRobber,
    RevealFogHex,
    PutPiece,
    DiceResultResources,
    GameMembers,
);

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn take_game(game: Option<String>) -> Result<String, DecodeError> {
    game.ok_or(DecodeError::MissingField("game"))
}

/// The `N` integers of a fixed-size body.
fn fixed<const N: usize>(body: Body) -> Result<[i32; N], DecodeError> {
    let ints = body.into_ints();
    let actual = ints.len();
    <[i32; N]>::try_from(ints).map_err(|_| DecodeError::FieldCount {
        expected: N.to_string(),
        actual,
    })
}

fn non_negative(field: &'static str, value: i32) -> Result<(), ProtocolError> {
    if value < 0 {
        Err(ProtocolError::invalid(field, format!("must be >= 0, got {value}")))
    } else {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Ints(1)
// ---------------------------------------------------------------------------

/// Who holds the Longest Road. `-1` when nobody does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LongestRoadFields")]
pub struct LongestRoad {
    game: String,
    player_number: i32,
}

deserialize_checked!(LongestRoad via LongestRoadFields {
    game: String,
    player_number: i32,
} => |raw| LongestRoad::new(raw.game, raw.player_number));

impl LongestRoad {
    pub fn new(game: impl Into<String>, player_number: i32) -> Result<Self, ProtocolError> {
        let game = game.into();
        check_game(&game)?;
        if player_number < -1 {
            return Err(ProtocolError::invalid(
                "playerNumber",
                format!("must be -1 or a seat number, got {player_number}"),
            ));
        }
        Ok(Self {
            game,
            player_number,
        })
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    /// The holder's seat, or `None` if nobody has it.
    pub fn player_number(&self) -> Option<i32> {
        (self.player_number >= 0).then_some(self.player_number)
    }
}

impl Templated for LongestRoad {
    const SPEC: TemplateSpec = TemplateSpec::new(ids::LONGESTROAD, "LongestRoad", Shape::Ints(1))
        .with_field_names(&["playerNumber"]);

    fn game_name(&self) -> Option<&str> {
        Some(&self.game)
    }

    fn body(&self) -> Body {
        Body::Ints(vec![self.player_number])
    }

    fn from_parts(game: Option<String>, body: Body) -> Result<Self, DecodeError> {
        let [player_number] = fixed(body)?;
        Ok(Self::new(take_game(game)?, player_number)?)
    }
}

/// Whose turn it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SetTurnFields")]
pub struct SetTurn {
    game: String,
    player_number: i32,
}

deserialize_checked!(SetTurn via SetTurnFields {
    game: String,
    player_number: i32,
} => |raw| SetTurn::new(raw.game, raw.player_number));

impl SetTurn {
    pub fn new(game: impl Into<String>, player_number: i32) -> Result<Self, ProtocolError> {
        let game = game.into();
        check_game(&game)?;
        non_negative("playerNumber", player_number)?;
        Ok(Self {
            game,
            player_number,
        })
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn player_number(&self) -> i32 {
        self.player_number
    }
}

impl Templated for SetTurn {
    const SPEC: TemplateSpec = TemplateSpec::new(ids::SETTURN, "SetTurn", Shape::Ints(1))
        .with_field_names(&["playerNumber"]);

    fn game_name(&self) -> Option<&str> {
        Some(&self.game)
    }

    fn body(&self) -> Body {
        Body::Ints(vec![self.player_number])
    }

    fn from_parts(game: Option<String>, body: Body) -> Result<Self, DecodeError> {
        let [player_number] = fixed(body)?;
        Ok(Self::new(take_game(game)?, player_number)?)
    }
}

// ---------------------------------------------------------------------------
// Ints(2)
// ---------------------------------------------------------------------------

/// Moves the robber, or the pirate ship when the coordinate is negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MoveRobberFields")]
pub struct MoveRobber {
    game: String,
    player_number: i32,
    coord: i32,
}

deserialize_checked!(MoveRobber via MoveRobberFields {
    game: String,
    player_number: i32,
    coord: i32,
} => |raw| MoveRobber::new(raw.game, raw.player_number, raw.coord));

impl MoveRobber {
    pub fn new(
        game: impl Into<String>,
        player_number: i32,
        coord: i32,
    ) -> Result<Self, ProtocolError> {
        let game = game.into();
        check_game(&game)?;
        non_negative("playerNumber", player_number)?;
        Ok(Self {
            game,
            player_number,
            coord,
        })
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn player_number(&self) -> i32 {
        self.player_number
    }

    /// The hex to move to. Negative means the pirate moves to `-coord`.
    pub fn coord(&self) -> i32 {
        self.coord
    }

    pub fn is_pirate(&self) -> bool {
        self.coord < 0
    }
}

impl Templated for MoveRobber {
    const SPEC: TemplateSpec = TemplateSpec::new(ids::MOVEROBBER, "MoveRobber", Shape::Ints(2))
        .with_field_names(&["playerNumber", "coord"]);

    fn game_name(&self) -> Option<&str> {
        Some(&self.game)
    }

    fn body(&self) -> Body {
        Body::Ints(vec![self.player_number, self.coord])
    }

    fn from_parts(game: Option<String>, body: Body) -> Result<Self, DecodeError> {
        let [player_number, coord] = fixed(body)?;
        Ok(Self::new(take_game(game)?, player_number, coord)?)
    }
}

// ---------------------------------------------------------------------------
// Ints(3)
// ---------------------------------------------------------------------------

/// Uncovers a hex hidden by fog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RevealFogHexFields")]
pub struct RevealFogHex {
    game: String,
    hex_coord: i32,
    hex_type: i32,
    dice_number: i32,
}

deserialize_checked!(RevealFogHex via RevealFogHexFields {
    game: String,
    hex_coord: i32,
    hex_type: i32,
    dice_number: i32,
} => |raw| RevealFogHex::new(raw.game, raw.hex_coord, raw.hex_type, raw.dice_number));

impl RevealFogHex {
    pub fn new(
        game: impl Into<String>,
        hex_coord: i32,
        hex_type: i32,
        dice_number: i32,
    ) -> Result<Self, ProtocolError> {
        let game = game.into();
        check_game(&game)?;
        non_negative("hexCoord", hex_coord)?;
        Ok(Self {
            game,
            hex_coord,
            hex_type,
            dice_number,
        })
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn hex_coord(&self) -> i32 {
        self.hex_coord
    }

    pub fn hex_type(&self) -> i32 {
        self.hex_type
    }

    pub fn dice_number(&self) -> i32 {
        self.dice_number
    }
}

impl Templated for RevealFogHex {
    const SPEC: TemplateSpec =
        TemplateSpec::new(ids::REVEALFOGHEX, "RevealFogHex", Shape::Ints(3))
            .with_field_names(&["hexCoord", "hexType", "diceNum"])
            .with_gate(VersionGate::since(Version::I18N));

    fn game_name(&self) -> Option<&str> {
        Some(&self.game)
    }

    fn body(&self) -> Body {
        Body::Ints(vec![self.hex_coord, self.hex_type, self.dice_number])
    }

    fn from_parts(game: Option<String>, body: Body) -> Result<Self, DecodeError> {
        let [hex_coord, hex_type, dice_number] = fixed(body)?;
        Ok(Self::new(take_game(game)?, hex_coord, hex_type, dice_number)?)
    }
}

// ---------------------------------------------------------------------------
// Ints(4)
// ---------------------------------------------------------------------------

/// Places a piece on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PutPieceFields")]
pub struct PutPiece {
    game: String,
    player_number: i32,
    piece_type: i32,
    coord: i32,
}

deserialize_checked!(PutPiece via PutPieceFields {
    game: String,
    player_number: i32,
    piece_type: i32,
    coord: i32,
} => |raw| PutPiece::new(raw.game, raw.player_number, raw.piece_type, raw.coord));

impl PutPiece {
    pub const ROAD: i32 = 0;
    pub const SETTLEMENT: i32 = 1;
    pub const CITY: i32 = 2;
    pub const SHIP: i32 = 3;

    pub fn new(
        game: impl Into<String>,
        player_number: i32,
        piece_type: i32,
        coord: i32,
    ) -> Result<Self, ProtocolError> {
        let game = game.into();
        check_game(&game)?;
        non_negative("playerNumber", player_number)?;
        non_negative("pieceType", piece_type)?;
        non_negative("coord", coord)?;
        Ok(Self {
            game,
            player_number,
            piece_type,
            coord,
        })
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn player_number(&self) -> i32 {
        self.player_number
    }

    pub fn piece_type(&self) -> i32 {
        self.piece_type
    }

    pub fn coord(&self) -> i32 {
        self.coord
    }
}

impl Templated for PutPiece {
    const SPEC: TemplateSpec = TemplateSpec::new(ids::PUTPIECE, "PutPiece", Shape::Ints(4))
        .with_field_names(&["playerNumber", "pieceType", "coord"]);

    fn game_name(&self) -> Option<&str> {
        Some(&self.game)
    }

    fn body(&self) -> Body {
        Body::Ints(vec![self.player_number, self.piece_type, self.coord])
    }

    fn from_parts(game: Option<String>, body: Body) -> Result<Self, DecodeError> {
        let [player_number, piece_type, coord] = fixed(body)?;
        Ok(Self::new(
            take_game(game)?,
            player_number,
            piece_type,
            coord,
        )?)
    }
}

// ---------------------------------------------------------------------------
// IntList(Game)
// ---------------------------------------------------------------------------

/// One player's haul from a dice roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerGain {
    pub player_number: i32,
    /// Total resources in hand after the roll.
    pub total: i32,
    /// `(amount, resource type)` pairs. Amounts are non-zero.
    pub resources: Vec<(i32, i32)>,
}

/// Resources each player gained from a roll.
///
/// Wire body: player count, then per player its number, new total, and
/// `(amount, type)` pairs. A `0` amount ends one player's pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DiceResultResourcesFields")]
pub struct DiceResultResources {
    game: String,
    gains: Vec<PlayerGain>,
}

deserialize_checked!(DiceResultResources via DiceResultResourcesFields {
    game: String,
    gains: Vec<PlayerGain>,
} => |raw| DiceResultResources::new(raw.game, raw.gains));

impl DiceResultResources {
    pub fn new(game: impl Into<String>, gains: Vec<PlayerGain>) -> Result<Self, ProtocolError> {
        let game = game.into();
        check_game(&game)?;
        if gains.is_empty() {
            return Err(ProtocolError::invalid("gains", "at least one player"));
        }
        for gain in &gains {
            non_negative("playerNumber", gain.player_number)?;
            if gain.resources.iter().any(|&(amount, _)| amount == 0) {
                return Err(ProtocolError::invalid("amount", "must be non-zero"));
            }
        }
        Ok(Self { game, gains })
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn gains(&self) -> &[PlayerGain] {
        &self.gains
    }

    fn parse(ints: &[i32]) -> Result<Vec<PlayerGain>, DecodeError> {
        let missing = DecodeError::MissingField;
        let (&count, mut rest) = ints.split_first().ok_or(missing("playerCount"))?;

        let mut gains = Vec::new();
        while !rest.is_empty() {
            let [player_number, total, ref tail @ ..] = *rest else {
                return Err(missing("total"));
            };
            rest = tail;
            let mut resources = Vec::new();
            while let [amount, ref tail @ ..] = *rest {
                rest = tail;
                if amount == 0 {
                    break;
                }
                let [rtype, ref tail @ ..] = *rest else {
                    return Err(missing("resourceType"));
                };
                rest = tail;
                resources.push((amount, rtype));
            }
            gains.push(PlayerGain {
                player_number,
                total,
                resources,
            });
        }

        if usize::try_from(count).ok() != Some(gains.len()) {
            return Err(DecodeError::FieldCount {
                expected: format!("{count} players"),
                actual: gains.len(),
            });
        }
        Ok(gains)
    }
}

impl Templated for DiceResultResources {
    const SPEC: TemplateSpec = TemplateSpec::new(
        ids::DICERESULTRESOURCES,
        "DiceResultResources",
        Shape::IntList(Scope::Game),
    )
    .with_gate(VersionGate::since(Version::I18N));

    fn game_name(&self) -> Option<&str> {
        Some(&self.game)
    }

    fn body(&self) -> Body {
        let mut ints = vec![self.gains.len() as i32];
        for (i, gain) in self.gains.iter().enumerate() {
            ints.push(gain.player_number);
            ints.push(gain.total);
            for &(amount, rtype) in &gain.resources {
                ints.push(amount);
                ints.push(rtype);
            }
            if i + 1 < self.gains.len() {
                ints.push(0);
            }
        }
        Body::Ints(ints)
    }

    fn from_parts(game: Option<String>, body: Body) -> Result<Self, DecodeError> {
        let gains = Self::parse(&body.into_ints())?;
        Ok(Self::new(take_game(game)?, gains)?)
    }
}

/// What a [`PlayerElements`] message does to each element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementAction {
    Set,
    Gain,
    Lose,
}

impl ElementAction {
    pub fn code(self) -> i32 {
        match self {
            ElementAction::Set => 100,
            ElementAction::Gain => 101,
            ElementAction::Lose => 102,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            100 => Some(ElementAction::Set),
            101 => Some(ElementAction::Gain),
            102 => Some(ElementAction::Lose),
            _ => None,
        }
    }
}

impl fmt::Display for ElementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementAction::Set => "SET",
            ElementAction::Gain => "GAIN",
            ElementAction::Lose => "LOSE",
        };
        f.write_str(name)
    }
}

/// Sets, adds to or subtracts from several of one player's counters at
/// once (resources, knights, ships left, …).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PlayerElementsFields")]
pub struct PlayerElements {
    game: String,
    player_number: i32,
    action: ElementAction,
    /// `(element type, amount)` pairs.
    elements: Vec<(i32, i32)>,
}

deserialize_checked!(PlayerElements via PlayerElementsFields {
    game: String,
    player_number: i32,
    action: ElementAction,
    elements: Vec<(i32, i32)>,
} => |raw| PlayerElements::new(raw.game, raw.player_number, raw.action, raw.elements));

impl PlayerElements {
    pub fn new(
        game: impl Into<String>,
        player_number: i32,
        action: ElementAction,
        elements: Vec<(i32, i32)>,
    ) -> Result<Self, ProtocolError> {
        let game = game.into();
        check_game(&game)?;
        non_negative("playerNumber", player_number)?;
        if elements.is_empty() {
            return Err(ProtocolError::invalid("elements", "at least one element"));
        }
        Ok(Self {
            game,
            player_number,
            action,
            elements,
        })
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn player_number(&self) -> i32 {
        self.player_number
    }

    pub fn action(&self) -> ElementAction {
        self.action
    }

    pub fn elements(&self) -> &[(i32, i32)] {
        &self.elements
    }
}

impl Templated for PlayerElements {
    const SPEC: TemplateSpec = TemplateSpec::new(
        ids::PLAYERELEMENTS,
        "PlayerElements",
        Shape::IntList(Scope::Game),
    )
    .with_field_names(&["playerNum", "actionType"])
    .with_gate(VersionGate::since(Version::I18N));

    fn game_name(&self) -> Option<&str> {
        Some(&self.game)
    }

    fn body(&self) -> Body {
        let mut ints = vec![self.player_number, self.action.code()];
        for &(element, amount) in &self.elements {
            ints.push(element);
            ints.push(amount);
        }
        Body::Ints(ints)
    }

    fn from_parts(game: Option<String>, body: Body) -> Result<Self, DecodeError> {
        let ints = body.into_ints();
        let [player_number, action, ref pairs @ ..] = ints[..] else {
            return Err(DecodeError::MissingField("actionType"));
        };
        if pairs.len() % 2 != 0 {
            return Err(DecodeError::FieldCount {
                expected: "element/amount pairs".to_string(),
                actual: ints.len(),
            });
        }
        let action = ElementAction::from_code(action)
            .ok_or_else(|| ProtocolError::invalid("actionType", format!("unknown action {action}")))?;
        let elements = pairs.chunks_exact(2).map(|p| (p[0], p[1])).collect();
        Ok(Self::new(take_game(game)?, player_number, action, elements)?)
    }
}

impl fmt::Display for PlayerElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PlayerElements:game={}|playerNum={}|actionType={}|",
            self.game, self.player_number, self.action
        )?;
        for (i, (element, amount)) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "e{element}={amount}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// StrList
// ---------------------------------------------------------------------------

/// Nicknames of everyone in a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GameMembersFields")]
pub struct GameMembers {
    game: String,
    members: Vec<String>,
}

deserialize_checked!(GameMembers via GameMembersFields {
    game: String,
    members: Vec<String>,
} => |raw| GameMembers::new(raw.game, raw.members));

impl GameMembers {
    pub fn new(game: impl Into<String>, members: Vec<String>) -> Result<Self, ProtocolError> {
        let game = game.into();
        check_game(&game)?;
        for member in &members {
            if member.is_empty() {
                return Err(ProtocolError::invalid("member", "empty nickname"));
            }
            check_str("member", member)?;
        }
        Ok(Self { game, members })
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }
}

impl Templated for GameMembers {
    const SPEC: TemplateSpec = TemplateSpec::new(
        ids::GAMEMEMBERS,
        "GameMembers",
        Shape::StrList(Scope::Game),
    );

    fn game_name(&self) -> Option<&str> {
        Some(&self.game)
    }

    fn body(&self) -> Body {
        Body::Strs(self.members.clone())
    }

    fn from_parts(game: Option<String>, body: Body) -> Result<Self, DecodeError> {
        Ok(Self::new(take_game(game)?, body.into_strs())?)
    }
}

/// Localized names for game options or scenarios, requested before login.
///
/// Body: a type (`O` or `S`), flags in hex, then strings. An entry may be
/// [`LocalizedStrings::KEY_UNKNOWN`] when the server has no such key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LocalizedStringsFields")]
pub struct LocalizedStrings {
    string_type: String,
    flags: i32,
    strings: Vec<String>,
}

deserialize_checked!(LocalizedStrings via LocalizedStringsFields {
    string_type: String,
    flags: i32,
    strings: Vec<String>,
} => |raw| LocalizedStrings::new(raw.string_type, raw.flags, raw.strings));

impl LocalizedStrings {
    pub const TYPE_GAMEOPT: &'static str = "O";
    pub const TYPE_SCENARIO: &'static str = "S";

    pub const FLAG_TYPE_UNKNOWN: i32 = 0x01;
    pub const FLAG_REQ_ALL: i32 = 0x02;
    pub const FLAG_SENT_ALL: i32 = 0x04;

    /// Marks a requested key the server doesn't know.
    pub const KEY_UNKNOWN: &'static str = "\u{16}K";

    pub fn new(
        string_type: impl Into<String>,
        flags: i32,
        strings: Vec<String>,
    ) -> Result<Self, ProtocolError> {
        let string_type = string_type.into();
        if !hexline_protocol::is_single_line_and_safe(&string_type, false) {
            return Err(ProtocolError::invalid("type", format!("bad type {string_type:?}")));
        }
        if flags < 0 {
            return Err(ProtocolError::invalid("flags", "must be >= 0"));
        }
        for item in &strings {
            if item != Self::KEY_UNKNOWN {
                check_str("string", item)?;
            }
        }
        Ok(Self {
            string_type,
            flags,
            strings,
        })
    }

    pub fn string_type(&self) -> &str {
        &self.string_type
    }

    pub fn flags(&self) -> i32 {
        self.flags
    }

    pub fn is_flag_set(&self, flag: i32) -> bool {
        self.flags & flag != 0
    }

    pub fn strings(&self) -> &[String] {
        &self.strings
    }
}

impl Templated for LocalizedStrings {
    const SPEC: TemplateSpec = TemplateSpec::new(
        ids::LOCALIZEDSTRINGS,
        "LocalizedStrings",
        Shape::StrList(Scope::Global),
    )
    .with_field_names(&["type", "flags"])
    .with_gate(VersionGate::since(Version::I18N))
    .with_caps(Capabilities::FROM_UNAUTHENTICATED);

    fn game_name(&self) -> Option<&str> {
        None
    }

    fn body(&self) -> Body {
        let mut strs = Vec::with_capacity(self.strings.len() + 2);
        strs.push(self.string_type.clone());
        strs.push(format!("{:x}", self.flags));
        strs.extend(self.strings.iter().cloned());
        Body::Strs(strs)
    }

    fn from_parts(_game: Option<String>, body: Body) -> Result<Self, DecodeError> {
        let mut strs = body.into_strs().into_iter();
        let string_type = strs.next().ok_or(DecodeError::MissingField("type"))?;
        let flags_text = strs.next().ok_or(DecodeError::MissingField("flags"))?;
        let flags = i32::from_str_radix(&flags_text, 16).map_err(|_| DecodeError::BadInt {
            field: "flags",
            value: flags_text.clone(),
        })?;
        Ok(Self::new(string_type, flags, strs.collect())?)
    }
}

impl fmt::Display for LocalizedStrings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LocalizedStrings:type={}|flags=0x{:x}",
            self.string_type, self.flags
        )?;
        if self.strings.is_empty() {
            f.write_str("|(strs empty)")
        } else {
            write!(f, "|strs={}", self.strings.join("|"))
        }
    }
}

// ---------------------------------------------------------------------------
// StrList(Game) with groups
// ---------------------------------------------------------------------------

/// Changes a game's option set after it was created. Only removal
/// exists so far.
///
/// Body after the game: the operation, then group `O` (option keys) and
/// optionally group `C` (nickname, version pairs of the clients whose
/// limits caused the change).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ChangeGameOptionsFields")]
pub struct ChangeGameOptions {
    game: String,
    operation: char,
    options: Vec<String>,
    causes: Option<Vec<(String, Version)>>,
}

deserialize_checked!(ChangeGameOptions via ChangeGameOptionsFields {
    game: String,
    operation: char,
    options: Vec<String>,
    causes: Option<Vec<(String, Version)>>,
} => |raw| ChangeGameOptions::new(raw.game, raw.operation, raw.options, raw.causes));

impl ChangeGameOptions {
    pub const OP_REMOVE: char = 'R';

    const GROUP_OPTIONS: &'static str = "O";
    const GROUP_CAUSES: &'static str = "C";

    /// Removes `options` from the game.
    pub fn remove(
        game: impl Into<String>,
        options: Vec<String>,
        causes: Option<Vec<(String, Version)>>,
    ) -> Result<Self, ProtocolError> {
        Self::new(game, Self::OP_REMOVE, options, causes)
    }

    fn new(
        game: impl Into<String>,
        operation: char,
        options: Vec<String>,
        causes: Option<Vec<(String, Version)>>,
    ) -> Result<Self, ProtocolError> {
        let game = game.into();
        check_game(&game)?;
        if operation != Self::OP_REMOVE {
            return Err(ProtocolError::invalid(
                "operation",
                format!("unknown operation {operation:?}"),
            ));
        }
        if options.is_empty() {
            return Err(ProtocolError::invalid("options", "at least one option"));
        }
        for key in &options {
            if key.is_empty() || key.contains(' ') {
                return Err(ProtocolError::invalid("options", format!("bad key {key:?}")));
            }
            check_str("options", key)?;
        }
        if let Some(causes) = &causes {
            if causes.is_empty() {
                return Err(ProtocolError::invalid("causes", "empty when present"));
            }
            for (nickname, _) in causes {
                if nickname.is_empty() {
                    return Err(ProtocolError::invalid("causes", "empty nickname"));
                }
                check_str("causes", nickname)?;
            }
        }
        Ok(Self {
            game,
            operation,
            options,
            causes,
        })
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn operation(&self) -> char {
        self.operation
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn causes(&self) -> Option<&[(String, Version)]> {
        self.causes.as_deref()
    }
}

impl Templated for ChangeGameOptions {
    const SPEC: TemplateSpec = TemplateSpec::new(
        ids::CHANGEGAMEOPTIONS,
        "ChangeGameOptions",
        Shape::StrList(Scope::Game),
    )
    .with_field_names(&["op"])
    .with_gate(VersionGate::since(Version(2700)));

    fn game_name(&self) -> Option<&str> {
        Some(&self.game)
    }

    fn body(&self) -> Body {
        let mut strs = vec![self.operation.to_string()];
        push_group(Self::GROUP_OPTIONS, &self.options, &mut strs);
        if let Some(causes) = &self.causes {
            let items: Vec<String> = causes
                .iter()
                .flat_map(|(nickname, version)| [nickname.clone(), version.number().to_string()])
                .collect();
            push_group(Self::GROUP_CAUSES, &items, &mut strs);
        }
        Body::Strs(strs)
    }

    fn from_parts(game: Option<String>, body: Body) -> Result<Self, DecodeError> {
        let strs = body.into_strs();
        let (op, rest) = strs
            .split_first()
            .ok_or(DecodeError::MissingField("op"))?;
        let mut chars = op.chars();
        let operation = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => {
                return Err(ProtocolError::invalid("operation", format!("bad operation {op:?}")).into());
            }
        };

        let mut options = None;
        let mut causes = None;
        for group in parse_groups(rest, &[Self::GROUP_OPTIONS, Self::GROUP_CAUSES])? {
            if group.name == Self::GROUP_OPTIONS {
                options = Some(group.items);
            } else {
                causes = Some(parse_causes(&group.items)?);
            }
        }
        let options = options.ok_or(DecodeError::MissingField("O"))?;
        Ok(Self::new(take_game(game)?, operation, options, causes)?)
    }
}

/// `[nickname, version, nickname, version, …]` into pairs.
fn parse_causes(items: &[String]) -> Result<Vec<(String, Version)>, DecodeError> {
    if items.len() % 2 != 0 {
        return Err(DecodeError::FieldCount {
            expected: "nickname/version pairs".to_string(),
            actual: items.len(),
        });
    }
    items
        .chunks_exact(2)
        .map(|pair| {
            let version: u32 = pair[1].parse().map_err(|_| DecodeError::BadInt {
                field: "C",
                value: pair[1].clone(),
            })?;
            Ok((pair[0].clone(), Version(version)))
        })
        .collect()
}

impl fmt::Display for ChangeGameOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ChangeGameOptions:game={}|op={}|opts=[{}]",
            self.game,
            self.operation,
            self.options.join(", ")
        )?;
        if let Some(causes) = &self.causes {
            let causes: Vec<String> = causes
                .iter()
                .map(|(nickname, version)| format!("{nickname}={}", version.number()))
                .collect();
            write!(f, "|causes=[{}]", causes.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexline_protocol::{split_line, Message, MessageType};

    fn decode<T: MessageType>(line: &str) -> Result<T, DecodeError> {
        let raw = split_line(line, 4096)?;
        assert_eq!(raw.type_id, T::TYPE_ID, "line {line:?}");
        T::decode(&mut raw.fields())
    }

    // =====================================================================
    // Fixed-int shapes
    // =====================================================================

    #[test]
    fn test_longest_road_nobody() {
        let msg = LongestRoad::new("g", -1).unwrap();
        assert_eq!(msg.player_number(), None);
        assert_eq!(msg.encode(), "1066|g,-1");
        assert_eq!(decode::<LongestRoad>("1066|g,-1").unwrap(), msg);
        assert!(LongestRoad::new("g", -2).is_err());
    }

    #[test]
    fn test_set_turn_rejects_negative_on_decode() {
        assert!(SetTurn::new("g", -1).is_err());
        assert!(matches!(
            decode::<SetTurn>("1055|g,-1"),
            Err(DecodeError::Invalid(_))
        ));
    }

    #[test]
    fn test_move_robber_pirate() {
        let msg = MoveRobber::new("g", 2, -0x0907).unwrap();
        assert!(msg.is_pirate());
        let back = decode::<MoveRobber>(&msg.encode()).unwrap();
        assert_eq!(back, msg);
        assert_eq!(back.to_string(), "MoveRobber:game=g|playerNumber=2|coord=-2311");
    }

    #[test]
    fn test_reveal_fog_hex_needs_i18n_peer() {
        let msg = RevealFogHex::new("g", 0x0a05, 2, 8).unwrap();
        assert_eq!(msg.encode(), "1097|g,2565,2,8");
        assert!(msg.gate().check(ids::REVEALFOGHEX, Version(1118)).is_err());
        assert!(RevealFogHex::new("g", -1, 2, 8).is_err());
    }

    #[test]
    fn test_put_piece_round_trip_and_missing_field() {
        let msg = PutPiece::new("Game1", 1, PutPiece::CITY, 0x45).unwrap();
        assert_eq!(msg.encode(), "1009|Game1,1,2,69");
        assert_eq!(decode::<PutPiece>("1009|Game1,1,2,69").unwrap(), msg);
        assert!(matches!(
            decode::<PutPiece>("1009|Game1,1,2"),
            Err(DecodeError::MissingField(_))
        ));
    }

    // =====================================================================
    // Int lists
    // =====================================================================

    fn dice_gains() -> Vec<PlayerGain> {
        vec![
            PlayerGain {
                player_number: 1,
                total: 7,
                resources: vec![(1, 2), (2, 5)],
            },
            PlayerGain {
                player_number: 3,
                total: 4,
                resources: vec![(1, 3)],
            },
        ]
    }

    #[test]
    fn test_dice_result_resources_layout() {
        let msg = DiceResultResources::new("g", dice_gains()).unwrap();
        let line = msg.encode();
        assert_eq!(line, "1092|g,2,1,7,1,2,2,5,0,3,4,1,3");
        assert_eq!(decode::<DiceResultResources>(&line).unwrap(), msg);
    }

    #[test]
    fn test_dice_result_resources_count_mismatch() {
        assert!(decode::<DiceResultResources>("1092|g,3,1,7,1,2").is_err());
        assert!(decode::<DiceResultResources>("1092|g,1,1").is_err());
        assert!(decode::<DiceResultResources>("1092|g,1,1,7,1").is_err());
    }

    #[test]
    fn test_player_elements() {
        let msg = PlayerElements::new("g", 2, ElementAction::Gain, vec![(1, 3), (5, 1)]).unwrap();
        let line = msg.encode();
        assert_eq!(line, "1086|g,2,101,1,3,5,1");
        assert_eq!(decode::<PlayerElements>(&line).unwrap(), msg);
        assert_eq!(
            msg.to_string(),
            "PlayerElements:game=g|playerNum=2|actionType=GAIN|e1=3,e5=1"
        );
    }

    #[test]
    fn test_player_elements_bad_bodies() {
        // Odd pair count, unknown action, no elements.
        assert!(decode::<PlayerElements>("1086|g,2,101,1").is_err());
        assert!(decode::<PlayerElements>("1086|g,2,999,1,3").is_err());
        assert!(decode::<PlayerElements>("1086|g,2,101").is_err());
    }

    // =====================================================================
    // String lists
    // =====================================================================

    #[test]
    fn test_game_members() {
        let msg = GameMembers::new("g", vec!["alice".into(), "bob".into()]).unwrap();
        assert_eq!(msg.encode(), "1017|g,alice,bob");
        assert_eq!(decode::<GameMembers>("1017|g,alice,bob").unwrap(), msg);
        assert!(GameMembers::new("g", vec!["a,b".into()]).is_err());
    }

    #[test]
    fn test_localized_strings_hex_flags_and_unknown_marker() {
        let msg = LocalizedStrings::new(
            LocalizedStrings::TYPE_SCENARIO,
            LocalizedStrings::FLAG_REQ_ALL | LocalizedStrings::FLAG_SENT_ALL,
            vec!["SC_FOG".into(), LocalizedStrings::KEY_UNKNOWN.into(), String::new()],
        )
        .unwrap();
        let line = msg.encode();
        assert_eq!(line, "1102|S,6,SC_FOG,\u{16}K,\t");

        let back = decode::<LocalizedStrings>(&line).unwrap();
        assert_eq!(back, msg);
        assert!(back.is_flag_set(LocalizedStrings::FLAG_SENT_ALL));
        assert!(!back.is_flag_set(LocalizedStrings::FLAG_TYPE_UNKNOWN));
    }

    #[test]
    fn test_localized_strings_needs_type_and_flags() {
        assert!(decode::<LocalizedStrings>("1102|O").is_err());
        assert!(decode::<LocalizedStrings>("1102|O,zz").is_err());
        assert!(decode::<LocalizedStrings>("1102|O,0").is_ok());
    }

    #[test]
    fn test_change_game_options_with_causes() {
        let msg = ChangeGameOptions::remove(
            "Game1",
            vec!["PLB".into(), "VP".into()],
            Some(vec![("alice".into(), Version(1118))]),
        )
        .unwrap();
        let line = msg.encode();
        assert_eq!(line, "1114|Game1,R,O 2,PLB,VP,C 2,alice,1118");
        assert_eq!(decode::<ChangeGameOptions>(&line).unwrap(), msg);
    }

    #[test]
    fn test_change_game_options_group_errors() {
        // Overrun, unknown group, duplicate group, missing O, bad op.
        for line in [
            "1114|g,R,O 5,PLB",
            "1114|g,R,O 1,PLB,X 0",
            "1114|g,R,O 1,PLB,O 1,VP",
            "1114|g,R,C 2,alice,1118",
            "1114|g,X,O 1,PLB",
            "1114|g,RR,O 1,PLB",
            "1114|g,R,O 1,PLB,C 1,alice",
        ] {
            assert!(decode::<ChangeGameOptions>(line).is_err(), "{line:?}");
        }
    }
}
