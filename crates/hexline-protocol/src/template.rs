//! Reusable message shapes.
//!
//! Most message types are "a game name plus N integers" or "a list of
//! integers" or "a list of strings". Rather than write an encoder and
//! decoder for each, a type declares its [`Shape`] in a [`TemplateSpec`]
//! and implements [`Templated`]:
//!
//! ```rust
//! use std::fmt;
//! use hexline_protocol::{
//!     Body, DecodeError, Message, Shape, TemplateSpec, Templated, fmt_template,
//! };
//!
//! #[derive(Debug, PartialEq)]
//! struct SetTurn {
//!     game: String,
//!     player: i32,
//! }
//!
//! impl Templated for SetTurn {
//!     const SPEC: TemplateSpec = TemplateSpec::new(1055, "SetTurn", Shape::Ints(1))
//!         .with_field_names(&["playerNumber"]);
//!
//!     fn game_name(&self) -> Option<&str> {
//!         Some(&self.game)
//!     }
//!
//!     fn body(&self) -> Body {
//!         Body::Ints(vec![self.player])
//!     }
//!
//!     fn from_parts(game: Option<String>, body: Body) -> Result<Self, DecodeError> {
//!         let ints = body.into_ints();
//!         Ok(SetTurn { game: game.unwrap_or_default(), player: ints[0] })
//!     }
//! }
//!
//! impl fmt::Display for SetTurn {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         fmt_template(self, f)
//!     }
//! }
//!
//! let msg = SetTurn { game: "Game1".into(), player: 2 };
//! assert_eq!(msg.encode(), "1055|Game1,2");
//! assert_eq!(msg.to_string(), "SetTurn:game=Game1|playerNumber=2");
//! ```
//!
//! Blanket impls then make every `Templated` type a [`MessageType`] and,
//! once it has `Display`, a [`Message`].

use std::fmt;

use crate::field::{check_game, FieldReader, LineBuilder, GAME_NONE};
use crate::message::{Capabilities, Message, MessageType};
use crate::version::{Version, VersionGate};
use crate::DecodeError;

// ---------------------------------------------------------------------------
// Shape descriptors
// ---------------------------------------------------------------------------

/// Whether a list shape starts with a game name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Game,
    Global,
}

/// The closed set of field shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Game name, then exactly this many integers (1 to 4).
    Ints(usize),
    /// Optional game name, then any number of integers.
    IntList(Scope),
    /// Optional game name, then any number of strings. Empty items travel
    /// as the sentinel.
    StrList(Scope),
}

impl Shape {
    pub fn scope(self) -> Scope {
        match self {
            Shape::Ints(_) => Scope::Game,
            Shape::IntList(scope) | Shape::StrList(scope) => scope,
        }
    }
}

/// Everything the generic code needs to know about one templated type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateSpec {
    pub type_id: u32,
    pub name: &'static str,
    pub shape: Shape,
    /// Names for the body positions, used only by `Display`.
    pub field_names: &'static [&'static str],
    pub gate: VersionGate,
    pub caps: Capabilities,
}

impl TemplateSpec {
    /// # Panics
    /// If `shape` is [`Shape::Ints`] with a count outside 1 to 4. In a
    /// `const SPEC` that is a compile error.
    pub const fn new(type_id: u32, name: &'static str, shape: Shape) -> Self {
        if let Shape::Ints(n) = shape {
            assert!(matches!(n, 1..=4), "Shape::Ints takes 1 to 4 integers");
        }
        Self {
            type_id,
            name,
            shape,
            field_names: &[],
            gate: VersionGate::BASELINE,
            caps: Capabilities::NONE,
        }
    }

    pub const fn with_field_names(self, field_names: &'static [&'static str]) -> Self {
        Self {
            field_names,
            ..self
        }
    }

    pub const fn with_gate(self, gate: VersionGate) -> Self {
        Self { gate, ..self }
    }

    pub const fn with_caps(self, caps: Capabilities) -> Self {
        Self { caps, ..self }
    }
}

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

/// The decoded fields after the game name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Ints(Vec<i32>),
    Strs(Vec<String>),
}

impl Body {
    /// Unwraps an integer body. A string body yields an empty list; the
    /// decoder only ever hands a type the variant its shape produces.
    pub fn into_ints(self) -> Vec<i32> {
        match self {
            Body::Ints(ints) => ints,
            Body::Strs(_) => Vec::new(),
        }
    }

    /// Unwraps a string body. Same caveat as [`into_ints`](Self::into_ints).
    pub fn into_strs(self) -> Vec<String> {
        match self {
            Body::Strs(strs) => strs,
            Body::Ints(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Body::Ints(ints) => ints.len(),
            Body::Strs(strs) => strs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Templated
// ---------------------------------------------------------------------------

/// A message type whose wire form is one of the template shapes.
///
/// Implementors write two conversions; encoding, decoding, field counting
/// and diagnostics come from the shape.
pub trait Templated: Sized {
    const SPEC: TemplateSpec;

    /// The game name, for game-scoped shapes.
    ///
    /// Named apart from [`Message::game`] so both traits can be in scope.
    fn game_name(&self) -> Option<&str>;

    /// The fields after the game name.
    fn body(&self) -> Body;

    /// Builds a value from decoded parts. This is where the type's own
    /// domain checks run; a failure here discards the line just like a
    /// structural error.
    ///
    /// For [`Shape::Ints`] the body always has exactly `n` integers.
    fn from_parts(game: Option<String>, body: Body) -> Result<Self, DecodeError>;
}

/// Encodes a templated body.
///
/// Game-scoped shapes without a game get [`GAME_NONE`].
pub fn encode_body(spec: &TemplateSpec, game: Option<&str>, body: &Body) -> String {
    let mut line = LineBuilder::new(spec.type_id);
    if spec.shape.scope() == Scope::Game {
        line = line.str(game.unwrap_or(GAME_NONE));
    }
    match body {
        Body::Ints(ints) => {
            for v in ints {
                line = line.int(*v);
            }
        }
        Body::Strs(strs) => {
            for s in strs {
                line = line.str(s);
            }
        }
    }
    line.finish()
}

/// Decodes a templated body from a reader positioned after the type id.
///
/// [`Shape::Ints`] requires exactly its count (extra trailing fields are
/// ignored); list shapes take everything that's left.
pub fn decode_body(
    spec: &TemplateSpec,
    fields: &mut FieldReader<'_>,
) -> Result<(Option<String>, Body), DecodeError> {
    let game = match spec.shape.scope() {
        Scope::Game => {
            let game = fields.next_str("game")?;
            check_game(&game)?;
            Some(game)
        }
        Scope::Global => None,
    };

    let body = match spec.shape {
        Shape::Ints(n) => {
            let mut ints = Vec::with_capacity(n);
            for i in 0..n {
                let name = spec.field_names.get(i).copied().unwrap_or("p");
                ints.push(fields.next_int(name)?);
            }
            Body::Ints(ints)
        }
        Shape::IntList(_) => Body::Ints(fields.rest_ints("p")?),
        Shape::StrList(_) => Body::Strs(fields.rest_strs()),
    };

    Ok((game, body))
}

/// Writes the diagnostic form `Name:game=G|a=1|b=2`.
///
/// Positions past the declared field names print as `p=`.
pub fn fmt_template<T: Templated>(msg: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let spec = &T::SPEC;
    write!(f, "{}:", spec.name)?;
    let mut first = true;
    if let Some(game) = msg.game_name() {
        write!(f, "game={game}")?;
        first = false;
    }

    let values: Vec<String> = match msg.body() {
        Body::Ints(ints) => ints.iter().map(i32::to_string).collect(),
        Body::Strs(strs) => strs,
    };
    for (i, value) in values.iter().enumerate() {
        if !first {
            f.write_str("|")?;
        }
        first = false;
        let name = spec.field_names.get(i).copied().unwrap_or("p");
        write!(f, "{name}={value}")?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Blanket impls
// ---------------------------------------------------------------------------

impl<T: Templated> MessageType for T {
    const TYPE_ID: u32 = T::SPEC.type_id;
    const NAME: &'static str = T::SPEC.name;
    const GATE: VersionGate = T::SPEC.gate;
    const CAPS: Capabilities = T::SPEC.caps;

    fn decode(fields: &mut FieldReader<'_>) -> Result<Self, DecodeError> {
        let (game, body) = decode_body(&T::SPEC, fields)?;
        T::from_parts(game, body)
    }
}

impl<T: Templated + fmt::Display> Message for T {
    fn type_id(&self) -> u32 {
        T::SPEC.type_id
    }

    fn game(&self) -> Option<&str> {
        self.game_name()
    }

    fn gate(&self) -> VersionGate {
        T::SPEC.gate
    }

    // Template shapes have no optional trailing fields.
    fn encode_for(&self, _peer: Version) -> String {
        encode_body(&T::SPEC, self.game_name(), &self.body())
    }
}
