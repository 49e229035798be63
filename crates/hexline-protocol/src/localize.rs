//! Per-recipient text resolution.
//!
//! A message that shows text to a player can be built with a lookup key
//! instead of the text itself. Right before it is sent to one particular
//! peer, [`resolve`] swaps the key for that peer's translation and
//! returns a *new* message; the keyed original is untouched and can be
//! resolved again for the next recipient.
//!
//! ```text
//!                      ┌─ resolve(es_ES) ─→ "…, por asentar una isla"
//! SvpTextMessage(key) ─┤
//!                      └─ resolve(en_US) ─→ "…, for settling an island"
//! ```
//!
//! Adding an explanation to the game then only needs a new key and its
//! string-table entries; clients don't change.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::version::Version;
use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A message with a text field that may hold a lookup key.
pub trait Localizable: Sized {
    /// The lookup key, or `None` if there's nothing to translate.
    fn key(&self) -> Option<&str>;

    /// Positional arguments for `{0}`, `{1}`, … in the translated text.
    fn args(&self) -> Vec<String> {
        Vec::new()
    }

    /// Returns a copy of this message with the key replaced by `text`.
    ///
    /// # Errors
    /// If `text` isn't valid for the field (e.g. contains a separator).
    fn localize(&self, text: &str) -> Result<Self, ProtocolError>;
}

/// Source of translated strings.
pub trait StringTable: Send + Sync {
    /// Looks up `key` for `locale`, falling back however the table sees
    /// fit. `None` for `locale` means the default locale.
    fn lookup(&self, locale: Option<&str>, key: &str) -> Option<&str>;
}

// ---------------------------------------------------------------------------
// LocalText
// ---------------------------------------------------------------------------

/// A text field that is either still a lookup key or already final.
///
/// Senders build keyed messages with [`LocalText::Key`]; [`resolve`]
/// turns them into [`LocalText::Literal`]. Text decoded off the wire is
/// always a literal: the sender already resolved it, and resolving it
/// again on a relay would treat a sentence as a key.
///
/// Equality compares only the text. Which kind it is never travels on
/// the wire, so a message equals what it decodes back to.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalText {
    Key(String),
    Literal(String),
}

impl LocalText {
    pub fn as_str(&self) -> &str {
        match self {
            LocalText::Key(text) | LocalText::Literal(text) => text,
        }
    }

    /// The key, if this hasn't been resolved yet.
    pub fn key(&self) -> Option<&str> {
        match self {
            LocalText::Key(key) => Some(key),
            LocalText::Literal(_) => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, LocalText::Literal(_))
    }
}

impl PartialEq for LocalText {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

// ---------------------------------------------------------------------------
// MemoryStrings
// ---------------------------------------------------------------------------

/// An in-memory [`StringTable`].
///
/// Lookup for `es_ES` tries `es_ES`, then `es`, then the default locale.
#[derive(Debug, Clone)]
pub struct MemoryStrings {
    default_locale: String,
    tables: HashMap<String, HashMap<String, String>>,
}

impl MemoryStrings {
    pub fn new(default_locale: impl Into<String>) -> Self {
        Self {
            default_locale: default_locale.into(),
            tables: HashMap::new(),
        }
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Adds or replaces one translation.
    pub fn insert(
        &mut self,
        locale: impl Into<String>,
        key: impl Into<String>,
        text: impl Into<String>,
    ) {
        self.tables
            .entry(locale.into())
            .or_default()
            .insert(key.into(), text.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(
        mut self,
        locale: impl Into<String>,
        key: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.insert(locale, key, text);
        self
    }

    fn get(&self, locale: &str, key: &str) -> Option<&str> {
        self.tables
            .get(locale)
            .and_then(|table| table.get(key))
            .map(String::as_str)
    }
}

impl StringTable for MemoryStrings {
    fn lookup(&self, locale: Option<&str>, key: &str) -> Option<&str> {
        if let Some(locale) = locale {
            if let Some(text) = self.get(locale, key) {
                return Some(text);
            }
            if let Some((language, _)) = locale.split_once('_') {
                if let Some(text) = self.get(language, key) {
                    return Some(text);
                }
            }
        }
        self.get(&self.default_locale, key)
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Substitutes `{0}`, `{1}`, … with `args`.
///
/// Single pass: substituted text is never rescanned. Placeholders with no
/// matching argument, and braces that aren't placeholders, stay as they
/// are.
pub fn format_text(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let substituted = after.find('}').and_then(|close| {
            let index: usize = after[..close].parse().ok()?;
            let arg = args.get(index)?;
            Some((arg, close))
        });
        match substituted {
            Some((arg, close)) => {
                out.push_str(arg);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Produces the copy of `msg` to send to one peer.
///
/// - No key: returns a clone.
/// - Peer older than [`Version::I18N`]: the default locale is used,
///   whatever the peer asked for.
/// - Missing translation: the key itself is sent.
/// - Translation the message rejects: also falls back to the key.
///
/// # Errors
/// Only if the message rejects its own key, which means it was
/// constructed with an invalid one.
pub fn resolve<M>(
    msg: &M,
    locale: Option<&str>,
    peer: Version,
    strings: &dyn StringTable,
) -> Result<M, ProtocolError>
where
    M: Localizable + Clone,
{
    let Some(key) = msg.key() else {
        return Ok(msg.clone());
    };
    let locale = if peer >= Version::I18N { locale } else { None };

    let Some(template) = strings.lookup(locale, key) else {
        tracing::debug!(key, locale = locale.unwrap_or("default"), "no translation, sending key");
        return msg.localize(key);
    };

    let text = format_text(template, &msg.args());
    match msg.localize(&text) {
        Ok(localized) => Ok(localized),
        Err(err) => {
            tracing::debug!(key, error = %err, "unusable translation, sending key");
            msg.localize(key)
        }
    }
}
