//! The field codec: how one message becomes one line, and back.
//!
//! ```text
//! <typeId>|[<game>,]<field1>,<field2>,...,<fieldN>
//!         ^ SEP          ^ SEP2
//! ```
//!
//! Rules every message type shares:
//!
//! - [`SEP`] appears once, right after the type id. [`SEP2`] separates
//!   everything after it.
//! - The splitter skips zero-length tokens, so an empty string can't be
//!   sent as two adjacent separators. It travels as [`EMPTY_STR`] instead.
//! - Neither separator, nor a line break, may appear inside a field. The
//!   one exception is a trailing free-text field read with
//!   [`FieldReader::remainder`], which may contain [`SEP2`].
//!
//! Encoding goes through [`LineBuilder`]; decoding through [`split_line`]
//! and a [`FieldReader`] cursor over the body.

use crate::{DecodeError, ProtocolError};

/// Primary separator: between the type id and the body.
pub const SEP: char = '|';

/// Secondary separator: between fields of the body.
pub const SEP2: char = ',';

/// Stands in for an empty string field on the wire.
///
/// A tab fails [`is_single_line_and_safe`], so no real field value can
/// collide with it.
pub const EMPTY_STR: &str = "\t";

/// "Not for any game" marker for game-scoped shapes used by session-wide
/// messages. Also fails [`is_single_line_and_safe`], so no real game can
/// have this name.
pub const GAME_NONE: &str = "\u{16}";

/// Default cap on a single line, in bytes.
pub const DEFAULT_MAX_LINE_LEN: usize = 65_535;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Tests whether `s` is non-empty and safe to send as a single field.
///
/// Rejects control characters (which includes line breaks and the
/// [`EMPTY_STR`] sentinel), Unicode line and paragraph separators, and,
/// unless `allow_sep` is set, both separators.
pub fn is_single_line_and_safe(s: &str, allow_sep: bool) -> bool {
    if s.is_empty() {
        return false;
    }
    if !allow_sep && s.contains([SEP, SEP2]) {
        return false;
    }
    !s.chars()
        .any(|c| c.is_control() || c == '\u{2028}' || c == '\u{2029}')
}

/// Checks a plain string field. Empty is allowed (sent as [`EMPTY_STR`]).
pub fn check_str(field: &'static str, value: &str) -> Result<(), ProtocolError> {
    if value.is_empty() || is_single_line_and_safe(value, false) {
        Ok(())
    } else {
        Err(ProtocolError::invalid(
            field,
            format!("not single-line or contains a separator: {value:?}"),
        ))
    }
}

/// Checks a trailing free-text field: [`SEP2`] is fine, [`SEP`] and line
/// breaks are not. Empty is allowed.
pub fn check_text(field: &'static str, value: &str) -> Result<(), ProtocolError> {
    if value.is_empty() || (is_single_line_and_safe(value, true) && !value.contains(SEP)) {
        Ok(())
    } else {
        Err(ProtocolError::invalid(
            field,
            format!("text must be a single line without {SEP:?}: {value:?}"),
        ))
    }
}

/// Checks a game name: non-empty and safe, or exactly [`GAME_NONE`].
pub fn check_game(value: &str) -> Result<(), ProtocolError> {
    if value == GAME_NONE || is_single_line_and_safe(value, false) {
        Ok(())
    } else {
        Err(ProtocolError::invalid(
            "game",
            format!("invalid game name {value:?}"),
        ))
    }
}

// ---------------------------------------------------------------------------
// Field values
// ---------------------------------------------------------------------------

/// One typed value in a message body, for the generic [`encode`] path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Int(i32),
    Str(String),
    Bool(bool),
    /// Free text that must be the last field; read back verbatim.
    Text(String),
    /// A named sub-list, sent as a `<name> <count>` marker then its items.
    Group(String, Vec<String>),
}

/// Encodes a complete line from a type id, an optional game scope, and
/// the body fields.
///
/// Every value is checked the way typed constructors check theirs, so the
/// result always splits back into the same fields.
///
/// ```rust
/// use hexline_protocol::{encode, Field};
///
/// let line = encode(90, Some("Game1"), &[Field::Int(2), Field::Int(5), Field::Int(130)]).unwrap();
/// assert_eq!(line, "90|Game1,2,5,130");
/// assert!(encode(5, None, &[Field::Str("a,b".into())]).is_err());
/// ```
///
/// # Errors
/// [`ProtocolError::InvalidField`] if the game name or a string contains a
/// separator or line break, a group name is malformed, or a
/// [`Field::Text`] is not the last field.
pub fn encode(type_id: u32, game: Option<&str>, fields: &[Field]) -> Result<String, ProtocolError> {
    let mut line = LineBuilder::new(type_id);
    if let Some(game) = game {
        check_game(game)?;
        line = line.str(game);
    }
    for (i, field) in fields.iter().enumerate() {
        line = match field {
            Field::Int(v) => line.int(*v),
            Field::Str(s) => {
                check_str("str", s)?;
                line.str(s)
            }
            Field::Bool(b) => line.bool(*b),
            Field::Text(t) => {
                if i + 1 != fields.len() {
                    return Err(ProtocolError::invalid("text", "must be the last field"));
                }
                check_text("text", t)?;
                line.text(t)
            }
            Field::Group(name, items) => {
                let mut checked = Vec::with_capacity(items.len() + 1);
                crate::groups::encode_group(name, items, &mut checked)?;
                line.group(name, items)
            }
        };
    }
    Ok(line.finish())
}

/// Splits a line into its type id and its body fields, with sentinels
/// restored to `""`.
///
/// This is the shape-agnostic view of a line; typed decoders use
/// [`split_line`] and a [`FieldReader`] instead.
pub fn decode(line: &str) -> Result<(u32, Vec<String>), DecodeError> {
    let raw = split_line(line, DEFAULT_MAX_LINE_LEN)?;
    let type_id = raw.type_id;
    Ok((type_id, raw.fields().rest_strs()))
}

// ---------------------------------------------------------------------------
// LineBuilder
// ---------------------------------------------------------------------------

/// Builds one wire line field by field.
///
/// The first field written after the type id is preceded by [`SEP`],
/// every later one by [`SEP2`]. Values are assumed to be validated
/// already: constructors call [`check_str`] and friends, so the builder
/// itself never fails.
///
/// Methods take `mut self` and return `Self`, so calls chain:
///
/// ```rust
/// use hexline_protocol::LineBuilder;
///
/// let line = LineBuilder::new(1010).str("Game1").str("alice").text("hi, all").finish();
/// assert_eq!(line, "1010|Game1,alice,hi, all");
/// ```
#[derive(Debug, Clone)]
pub struct LineBuilder {
    buf: String,
    has_body: bool,
}

impl LineBuilder {
    pub fn new(type_id: u32) -> Self {
        Self {
            buf: type_id.to_string(),
            has_body: false,
        }
    }

    fn separate(&mut self) {
        self.buf.push(if self.has_body { SEP2 } else { SEP });
        self.has_body = true;
    }

    pub fn int(mut self, value: i32) -> Self {
        self.separate();
        self.buf.push_str(&value.to_string());
        self
    }

    /// Booleans travel as `1` / `0`.
    pub fn bool(mut self, value: bool) -> Self {
        self.separate();
        self.buf.push(if value { '1' } else { '0' });
        self
    }

    /// Appends a string field, substituting [`EMPTY_STR`] for `""`.
    pub fn str(mut self, value: &str) -> Self {
        self.separate();
        self.buf
            .push_str(if value.is_empty() { EMPTY_STR } else { value });
        self
    }

    /// Appends the trailing free-text field. Same sentinel rule as
    /// [`str`](Self::str); the content may include [`SEP2`].
    pub fn text(self, value: &str) -> Self {
        self.str(value)
    }

    /// Appends a group marker `"<name> <count>"` followed by the items.
    pub fn group(mut self, name: &str, items: &[String]) -> Self {
        self = self.str(&format!("{name} {}", items.len()));
        for item in items {
            self = self.str(item);
        }
        self
    }

    /// Returns the finished line, without a line terminator.
    pub fn finish(self) -> String {
        self.buf
    }
}

// ---------------------------------------------------------------------------
// Splitting
// ---------------------------------------------------------------------------

/// A received line with its type id parsed and its body not yet split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawLine<'a> {
    pub type_id: u32,
    body: Option<&'a str>,
}

impl<'a> RawLine<'a> {
    /// Everything after [`SEP`], if anything was sent.
    pub fn body(&self) -> Option<&'a str> {
        self.body
    }

    /// A cursor over the body's fields.
    pub fn fields(&self) -> FieldReader<'a> {
        FieldReader::new(self.body.unwrap_or(""))
    }
}

/// Parses the type id and isolates the body.
///
/// Fails on empty or oversized lines, embedded line breaks, a type id
/// that isn't a non-negative decimal integer, and a second [`SEP`] in the
/// body. Never panics.
pub fn split_line(line: &str, max_len: usize) -> Result<RawLine<'_>, DecodeError> {
    if line.is_empty() {
        return Err(DecodeError::Empty);
    }
    if line.len() > max_len {
        return Err(DecodeError::TooLong {
            len: line.len(),
            max: max_len,
        });
    }
    if line.contains(['\n', '\r']) {
        return Err(DecodeError::LineBreak);
    }

    let (id_text, body) = match line.split_once(SEP) {
        Some((id, body)) => (id, Some(body)),
        None => (line, None),
    };

    // `u32::from_str` would accept a leading `+`; the wire format doesn't.
    if id_text.is_empty() || !id_text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::BadTypeId(id_text.to_string()));
    }
    let type_id: u32 = id_text
        .parse()
        .map_err(|_| DecodeError::BadTypeId(id_text.to_string()))?;

    if body.is_some_and(|b| b.contains(SEP)) {
        return Err(DecodeError::StraySeparator);
    }

    Ok(RawLine { type_id, body })
}

// ---------------------------------------------------------------------------
// FieldReader
// ---------------------------------------------------------------------------

/// A cursor over the [`SEP2`]-separated fields of a body.
///
/// Like the splitter on the other end, it skips zero-length tokens.
/// String reads turn [`EMPTY_STR`] back into `""`. Extra trailing fields
/// are never an error: newer peers may append optional fields that this
/// version doesn't know about.
#[derive(Debug, Clone)]
pub struct FieldReader<'a> {
    rest: &'a str,
    consumed: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(body: &'a str) -> Self {
        Self {
            rest: body,
            consumed: 0,
        }
    }

    fn skip_empty(&mut self) {
        self.rest = self.rest.trim_start_matches(SEP2);
    }

    /// Next raw token, sentinel not yet restored.
    fn next_token(&mut self) -> Option<&'a str> {
        self.skip_empty();
        if self.rest.is_empty() {
            return None;
        }
        let (token, rest) = match self.rest.split_once(SEP2) {
            Some((token, rest)) => (token, rest),
            None => (self.rest, ""),
        };
        self.rest = rest;
        self.consumed += 1;
        Some(token)
    }

    /// Returns `true` if at least one more field is present.
    pub fn has_more(&self) -> bool {
        !self.rest.trim_start_matches(SEP2).is_empty()
    }

    /// Number of fields read so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Number of fields left. Walks the rest of the body without
    /// consuming it.
    pub fn remaining(&self) -> usize {
        self.rest.split(SEP2).filter(|t| !t.is_empty()).count()
    }

    pub fn next_str(&mut self, field: &'static str) -> Result<String, DecodeError> {
        self.next_opt_str()?.ok_or(DecodeError::MissingField(field))
    }

    /// Like [`next_str`](Self::next_str), but a missing trailing field is
    /// `Ok(None)`.
    pub fn next_opt_str(&mut self) -> Result<Option<String>, DecodeError> {
        Ok(self.next_token().map(restore_empty))
    }

    pub fn next_int(&mut self, field: &'static str) -> Result<i32, DecodeError> {
        self.next_opt_int(field)?
            .ok_or(DecodeError::MissingField(field))
    }

    pub fn next_opt_int(&mut self, field: &'static str) -> Result<Option<i32>, DecodeError> {
        match self.next_token() {
            None => Ok(None),
            Some(token) => parse_int(field, token).map(Some),
        }
    }

    /// Reads `1`/`0` (or the older `t`/`f`).
    pub fn next_bool(&mut self, field: &'static str) -> Result<bool, DecodeError> {
        let token = self.next_token().ok_or(DecodeError::MissingField(field))?;
        match token {
            "1" | "t" => Ok(true),
            "0" | "f" => Ok(false),
            other => Err(DecodeError::BadBool {
                field,
                value: other.to_string(),
            }),
        }
    }

    /// Takes the rest of the body verbatim as one free-text field,
    /// including any [`SEP2`] it contains.
    pub fn remainder(&mut self, field: &'static str) -> Result<String, DecodeError> {
        self.opt_remainder().ok_or(DecodeError::MissingField(field))
    }

    /// Like [`remainder`](Self::remainder), but nothing left is `None`.
    ///
    /// Unlike the other reads, leading [`SEP2`]s are not skipped: they
    /// belong to the text.
    pub fn opt_remainder(&mut self) -> Option<String> {
        if self.rest.is_empty() {
            return None;
        }
        let text = std::mem::take(&mut self.rest);
        self.consumed += 1;
        Some(restore_empty(text))
    }

    /// Reads every remaining field as a string.
    pub fn rest_strs(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(token) = self.next_token() {
            out.push(restore_empty(token));
        }
        out
    }

    /// Reads every remaining field as an integer.
    pub fn rest_ints(&mut self, field: &'static str) -> Result<Vec<i32>, DecodeError> {
        let mut out = Vec::new();
        while let Some(token) = self.next_token() {
            out.push(parse_int(field, token)?);
        }
        Ok(out)
    }

    /// Fails if any field is left. For types that must reject extras.
    pub fn finish(&self) -> Result<(), DecodeError> {
        if self.has_more() {
            Err(DecodeError::FieldCount {
                expected: self.consumed.to_string(),
                actual: self.consumed + self.remaining(),
            })
        } else {
            Ok(())
        }
    }
}

fn restore_empty(token: &str) -> String {
    if token == EMPTY_STR {
        String::new()
    } else {
        token.to_string()
    }
}

fn parse_int(field: &'static str, token: &str) -> Result<i32, DecodeError> {
    token.parse().map_err(|_| DecodeError::BadInt {
        field,
        value: token.to_string(),
    })
}
