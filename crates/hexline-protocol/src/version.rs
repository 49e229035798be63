//! Protocol versions and per-type version gates.
//!
//! Peers announce their version when they connect. From then on, the
//! *sender* decides what it may emit: a message type introduced in 2.0.00
//! must not go to a 1.1.x peer, and an optional trailing field added in
//! 2.7.00 is left off for anything older. Decoders never look at versions;
//! they branch on whether more fields are present.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

/// A protocol version number, e.g. `2000` for 2.0.00 or `1118` for 1.1.18.
///
/// Ordered, so gates can be written as plain comparisons.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(pub u32);

impl Version {
    /// Oldest version any peer can have. Message types default to this.
    pub const BASELINE: Version = Version(1000);

    /// First version that understands localized (keyed) server text.
    pub const I18N: Version = Version(2000);

    /// The version this build of the protocol speaks.
    pub const CURRENT: Version = Version(2700);

    /// Returns the raw version number.
    pub fn number(self) -> u32 {
        self.0
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::BASELINE
    }
}

/// Formats like the version strings users see: `1.0.6`, `1.1.18`, `2.0.00`.
///
/// 1.0.x releases used a single-digit patch; from 1.1.00 on the last two
/// digits are always the patch number.
impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.0;
        if n < 1000 {
            write!(f, "{n}")
        } else if n < 1100 {
            write!(f, "1.0.{}", n - 1000)
        } else {
            write!(f, "{}.{}.{:02}", n / 1000, (n / 100) % 10, n % 100)
        }
    }
}

// ---------------------------------------------------------------------------
// VersionGate
// ---------------------------------------------------------------------------

/// An optional trailing field and the version that introduced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionalField {
    pub name: &'static str,
    pub since: Version,
}

impl OptionalField {
    pub const fn new(name: &'static str, since: Version) -> Self {
        Self { name, since }
    }
}

/// Which peers may receive a message type, and which of its optional
/// trailing fields they understand.
///
/// Gates are `const`-constructible so they can live in a type's
/// associated constants:
///
/// ```rust
/// use hexline_protocol::{OptionalField, Version, VersionGate};
///
/// const GATE: VersionGate = VersionGate::since(Version(1100))
///     .with_optional(&[OptionalField::new("locale", Version(2000))]);
///
/// assert!(GATE.allows(Version(1100)));
/// assert!(!GATE.allows(Version(1000)));
/// assert_eq!(GATE.optional_fields_for(Version(1100)), 0);
/// assert_eq!(GATE.optional_fields_for(Version(2000)), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionGate {
    /// Oldest peer version that knows this type.
    pub min: Version,
    /// Newest peer version that still uses it, for retired types.
    pub max: Option<Version>,
    /// Trailing optional fields, in wire order.
    pub optional: &'static [OptionalField],
}

impl VersionGate {
    /// Every peer since [`Version::BASELINE`]; no optional fields.
    pub const BASELINE: VersionGate = VersionGate::since(Version::BASELINE);

    pub const fn since(min: Version) -> Self {
        Self {
            min,
            max: None,
            optional: &[],
        }
    }

    /// Marks the type as retired after `max`.
    pub const fn until(self, max: Version) -> Self {
        Self {
            max: Some(max),
            ..self
        }
    }

    pub const fn with_optional(self, optional: &'static [OptionalField]) -> Self {
        Self { optional, ..self }
    }

    /// Returns `true` if a peer at `peer` may receive this type at all.
    pub fn allows(&self, peer: Version) -> bool {
        peer >= self.min && self.max.is_none_or(|max| peer <= max)
    }

    /// Sender-side check. Fails loudly: sending a type the peer can't read
    /// is a bug in the caller, not a condition to recover from.
    pub fn check(&self, type_id: u32, peer: Version) -> Result<(), ProtocolError> {
        if peer < self.min {
            return Err(ProtocolError::VersionTooOld {
                type_id,
                required: self.min,
                peer,
            });
        }
        match self.max {
            Some(max) if peer > max => Err(ProtocolError::Obsolete {
                type_id,
                max,
                peer,
            }),
            _ => Ok(()),
        }
    }

    /// How many of the optional trailing fields a peer understands.
    ///
    /// Stops at the first field the peer is too old for. A later field
    /// can't be sent without the ones before it, since position is the
    /// only thing that identifies a field on the wire.
    pub fn optional_fields_for(&self, peer: Version) -> usize {
        self.optional
            .iter()
            .take_while(|field| peer >= field.since)
            .count()
    }
}

impl Default for VersionGate {
    fn default() -> Self {
        Self::BASELINE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_display_formats() {
        assert_eq!(Version(1006).to_string(), "1.0.6");
        assert_eq!(Version(1100).to_string(), "1.1.00");
        assert_eq!(Version(1118).to_string(), "1.1.18");
        assert_eq!(Version(2000).to_string(), "2.0.00");
        assert_eq!(Version(2700).to_string(), "2.7.00");
        assert_eq!(Version(12308).to_string(), "12.3.08");
        assert_eq!(Version(42).to_string(), "42");
    }

    #[test]
    fn test_version_serializes_as_plain_number() {
        let json = serde_json::to_string(&Version(2000)).unwrap();
        assert_eq!(json, "2000");
    }

    #[test]
    fn test_gate_min_and_max() {
        let gate = VersionGate::since(Version(1100)).until(Version(1999));
        assert!(!gate.allows(Version(1099)));
        assert!(gate.allows(Version(1100)));
        assert!(gate.allows(Version(1999)));
        assert!(!gate.allows(Version(2000)));
    }

    #[test]
    fn test_gate_check_reports_too_old() {
        let gate = VersionGate::since(Version::I18N);
        let err = gate.check(1091, Version(1118)).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::VersionTooOld { type_id: 1091, .. }
        ));
        assert!(gate.check(1091, Version::CURRENT).is_ok());
    }

    #[test]
    fn test_gate_check_reports_obsolete() {
        let gate = VersionGate::BASELINE.until(Version(1118));
        let err = gate.check(1050, Version(2000)).unwrap_err();
        assert!(matches!(err, ProtocolError::Obsolete { .. }));
    }

    #[test]
    fn test_optional_fields_stop_at_first_unknown() {
        const FIELDS: &[OptionalField] = &[
            OptionalField::new("build", Version(1100)),
            OptionalField::new("feats", Version(2000)),
            OptionalField::new("locale", Version(2000)),
        ];
        let gate = VersionGate::since(Version(1100)).with_optional(FIELDS);
        assert_eq!(gate.optional_fields_for(Version(1100)), 1);
        assert_eq!(gate.optional_fields_for(Version(1999)), 1);
        assert_eq!(gate.optional_fields_for(Version(2000)), 3);
    }

    #[test]
    fn test_default_gate_is_baseline() {
        let gate = VersionGate::default();
        assert_eq!(gate.min, Version::BASELINE);
        assert!(gate.max.is_none());
        assert!(gate.optional.is_empty());
    }
}
