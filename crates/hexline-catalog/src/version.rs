//! The version announcement both sides send right after connecting.

use std::fmt;

use hexline_protocol::field::check_str;
use hexline_protocol::{
    Capabilities, DecodeError, FieldReader, LineBuilder, Message, MessageType, OptionalField,
    ProtocolError, Version, VersionGate,
};
use serde::{Deserialize, Serialize};

use crate::checked::deserialize_checked;
use crate::ids;

/// A peer's protocol version, plus optional build, feature and locale
/// details.
///
/// Later versions appended fields to this message over time. An older
/// peer gets only the fields it knows; a newer sender's extra fields are
/// ignored by older decoders, and missing ones decode as `None`.
///
/// ```text
/// 9998|2700,2.7.00,JM20240101,;6pl;sb;,es_ES
///      ^^^^ ^^^^^^ ^^^^^^^^^^ ^^^^^^^^ ^^^^^
///      num  string build      features locale
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "VersionMsgFields")]
pub struct VersionMsg {
    version: Version,
    version_string: String,
    build: Option<String>,
    features: Option<String>,
    locale: Option<String>,
}

deserialize_checked!(VersionMsg via VersionMsgFields {
    version: Version,
    version_string: String,
    build: Option<String>,
    features: Option<String>,
    locale: Option<String>,
} => |raw| VersionMsg::new(raw.version, raw.version_string, raw.build, raw.features, raw.locale));

impl VersionMsg {
    const OPTIONAL: &'static [OptionalField] = &[
        OptionalField::new("build", Version(1100)),
        OptionalField::new("feats", Version::I18N),
        OptionalField::new("locale", Version::I18N),
    ];

    pub fn new(
        version: Version,
        version_string: impl Into<String>,
        build: Option<String>,
        features: Option<String>,
        locale: Option<String>,
    ) -> Result<Self, ProtocolError> {
        let version_string = version_string.into();
        if version_string.is_empty() {
            return Err(ProtocolError::invalid("versionString", "empty"));
        }
        check_str("versionString", &version_string)?;
        let (build, features, locale) = (non_empty(build), non_empty(features), non_empty(locale));
        if build.is_none() && features.is_some() {
            return Err(ProtocolError::invalid("build", "required when features are sent"));
        }
        for (field, value) in [("build", &build), ("feats", &features), ("locale", &locale)] {
            if let Some(value) = value {
                check_str(field, value)?;
            }
        }
        Ok(Self {
            version,
            version_string,
            build,
            features,
            locale,
        })
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn version_string(&self) -> &str {
        &self.version_string
    }

    pub fn build(&self) -> Option<&str> {
        self.build.as_deref()
    }

    pub fn features(&self) -> Option<&str> {
        self.features.as_deref()
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }
}

/// Empty and the sentinel both mean "not sent".
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl MessageType for VersionMsg {
    const TYPE_ID: u32 = ids::VERSION;
    const NAME: &'static str = "VersionMsg";
    const GATE: VersionGate = VersionGate::since(Version(1100)).with_optional(Self::OPTIONAL);
    const CAPS: Capabilities = Capabilities::FROM_UNAUTHENTICATED;

    fn decode(fields: &mut FieldReader<'_>) -> Result<Self, DecodeError> {
        let number = fields.next_int("version")?;
        let version = u32::try_from(number).map_err(|_| DecodeError::BadInt {
            field: "version",
            value: number.to_string(),
        })?;
        let version_string = fields.next_str("versionString")?;
        let build = fields.next_opt_str()?;
        let features = fields.next_opt_str()?;
        let locale = fields.next_opt_str()?;
        Ok(Self::new(Version(version), version_string, build, features, locale)?)
    }
}

impl Message for VersionMsg {
    fn type_id(&self) -> u32 {
        Self::TYPE_ID
    }

    fn game(&self) -> Option<&str> {
        None
    }

    fn gate(&self) -> VersionGate {
        Self::GATE
    }

    /// Build and features are always written once the peer knows them,
    /// as the sentinel when absent, so positions stay fixed. The locale
    /// is last and only written when set.
    fn encode_for(&self, peer: Version) -> String {
        let known = Self::GATE.optional_fields_for(peer);
        let mut line = LineBuilder::new(Self::TYPE_ID)
            .int(self.version.number() as i32)
            .str(&self.version_string);
        if known >= 1 {
            line = line.str(self.build.as_deref().unwrap_or(""));
        }
        if known >= 2 {
            line = line.str(self.features.as_deref().unwrap_or(""));
        }
        if known >= 3 {
            if let Some(locale) = &self.locale {
                line = line.str(locale);
            }
        }
        line.finish()
    }
}

impl fmt::Display for VersionMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VersionMsg:{},str={},verBuild={},feats={},cliLocale={}",
            self.version.number(),
            self.version_string,
            self.build.as_deref().unwrap_or("(null)"),
            self.features.as_deref().unwrap_or("(null)"),
            self.locale.as_deref().unwrap_or("(null)"),
        )
    }
}
