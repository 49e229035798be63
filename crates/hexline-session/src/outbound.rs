//! The send path: gate, localize, encode.

use std::sync::Arc;

use hexline_catalog::GameMessage;
use hexline_protocol::{resolve, Capabilities, Message, StringTable, Version};

use crate::{PeerId, PeerInfo, SessionError};

/// Turns messages into lines for specific peers.
///
/// Every message goes through the same three steps per recipient:
///
/// 1. **Gate.** A peer outside the type's version range gets nothing.
/// 2. **Localize.** `LOCALIZED` types have their key resolved in the
///    peer's locale.
/// 3. **Encode** at the peer's version, so it only sees optional fields
///    it knows.
///
/// "The peer's version" is really the lower of the peer's and our own
/// local version. A side configured as, say, 2.0.00 neither sends types
/// introduced later nor writes optional fields it doesn't know itself.
#[derive(Clone)]
pub struct Outbound {
    strings: Arc<dyn StringTable>,
    local_version: Version,
}

impl Outbound {
    /// A send path at [`Version::CURRENT`].
    pub fn new(strings: Arc<dyn StringTable>) -> Self {
        Self {
            strings,
            local_version: Version::CURRENT,
        }
    }

    /// Caps every encoding at `version`, usually the configured
    /// `ProtocolConfig::local_version`.
    pub fn with_local_version(mut self, version: Version) -> Self {
        self.local_version = version;
        self
    }

    pub fn local_version(&self) -> Version {
        self.local_version
    }

    /// Prepares `msg` for one peer.
    ///
    /// Returns `Ok(None)` if the peer can't receive this type. The caller
    /// decides whether to send an older equivalent instead.
    ///
    /// # Errors
    /// [`SessionError::Protocol`] if the message's own lookup key is not
    /// valid text.
    pub fn prepare(
        &self,
        msg: &GameMessage,
        peer: &PeerInfo,
    ) -> Result<Option<String>, SessionError> {
        let version = peer.version.min(self.local_version);
        if let Err(err) = msg.gate().check(msg.type_id(), version) {
            tracing::debug!(message = msg.name(), error = %err, "not sent to this peer");
            return Ok(None);
        }

        if !msg.caps().contains(Capabilities::LOCALIZED) {
            return Ok(Some(msg.encode_for(version)));
        }
        let local = resolve(msg, peer.locale.as_deref(), version, self.strings.as_ref())?;
        Ok(Some(local.encode_for(version)))
    }

    /// Prepares `msg` for every peer in `peers`.
    ///
    /// Text is resolved separately for each recipient, so peers with
    /// different locales get different lines for the same event. Peers
    /// that can't receive the type are left out. A message that fails to
    /// prepare is logged and sent to nobody.
    pub fn broadcast<'a>(
        &self,
        msg: &GameMessage,
        peers: impl IntoIterator<Item = (PeerId, &'a PeerInfo)>,
    ) -> Vec<(PeerId, String)> {
        let mut lines = Vec::new();
        for (peer_id, peer) in peers {
            match self.prepare(msg, peer) {
                Ok(Some(line)) => lines.push((peer_id, line)),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(%peer_id, message = msg.name(), error = %err, "broadcast failed");
                    return Vec::new();
                }
            }
        }
        lines
    }
}

impl std::fmt::Debug for Outbound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Outbound")
            .field("local_version", &self.local_version)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexline_catalog::{
        ChangeGameOptions, GameTextMsg, RevealFogHex, SvpTextMessage, UndoNotAllowedReasonText,
        VersionMsg,
    };
    use hexline_protocol::{MemoryStrings, Version};

    fn outbound() -> Outbound {
        let strings = MemoryStrings::new("en_US")
            .with("en_US", "svp.island", "for settling a new island")
            .with("es", "svp.island", "por colonizar una isla nueva")
            .with("en_US", "undo.disabled", "Undo is off in this game");
        Outbound::new(Arc::new(strings))
    }

    fn peer(version: u32, locale: Option<&str>) -> PeerInfo {
        PeerInfo::new(Version(version), locale.map(String::from))
    }

    // =====================================================================
    // Gate
    // =====================================================================

    #[test]
    fn test_too_old_peer_gets_nothing() {
        let fog = GameMessage::RevealFogHex(RevealFogHex::new("g", 0x0b07, 4, 9).unwrap());
        assert_eq!(outbound().prepare(&fog, &peer(1118, None)).unwrap(), None);
        assert_eq!(
            outbound().prepare(&fog, &peer(2000, None)).unwrap().as_deref(),
            Some("1097|g,2823,4,9")
        );
    }

    #[test]
    fn test_gate_applies_before_localization() {
        let undo = GameMessage::UndoNotAllowedReasonText(
            UndoNotAllowedReasonText::new("g", true, Some("undo.disabled".into())).unwrap(),
        );
        assert_eq!(outbound().prepare(&undo, &peer(2500, None)).unwrap(), None);

        let options = GameMessage::ChangeGameOptions(
            ChangeGameOptions::remove("g", vec!["PLB".into()], None).unwrap(),
        );
        assert_eq!(outbound().prepare(&options, &peer(2000, None)).unwrap(), None);
    }

    // =====================================================================
    // Localization and encoding
    // =====================================================================

    #[test]
    fn test_plain_text_is_not_looked_up() {
        let chat = GameMessage::GameTextMsg(GameTextMsg::new("g", "bob", "svp.island").unwrap());
        assert_eq!(
            outbound().prepare(&chat, &peer(2700, Some("es"))).unwrap().as_deref(),
            Some("1010|g,bob,svp.island")
        );
    }

    #[test]
    fn test_localized_in_peer_locale() {
        let svp = GameMessage::SvpTextMessage(
            SvpTextMessage::new("g", 2, 1, "svp.island").unwrap(),
        );
        assert_eq!(
            outbound().prepare(&svp, &peer(2700, Some("es"))).unwrap().as_deref(),
            Some("1099|g,2,1,por colonizar una isla nueva")
        );
    }

    #[test]
    fn test_missing_translation_sends_key() {
        let undo = GameMessage::UndoNotAllowedReasonText(
            UndoNotAllowedReasonText::new("g", true, Some("undo.unknown".into())).unwrap(),
        );
        assert_eq!(
            outbound().prepare(&undo, &peer(2700, None)).unwrap().as_deref(),
            Some("1105|g,1,undo.unknown")
        );
    }

    #[test]
    fn test_encoding_follows_peer_version() {
        let version = GameMessage::Version(VersionMsg::new(
            Version(2700),
            "2.7.00",
            Some("B1".into()),
            None,
            Some("fr".into()),
        )
        .unwrap());
        assert_eq!(
            outbound().prepare(&version, &peer(1118, None)).unwrap().as_deref(),
            Some("9998|2700,2.7.00,B1")
        );
    }

    #[test]
    fn test_local_version_caps_encoding_and_gate() {
        let version = GameMessage::Version(VersionMsg::new(
            Version(2000),
            "2.0.00",
            Some("B1".into()),
            Some(";6pl;".into()),
            Some("fr".into()),
        )
        .unwrap());
        let old_side = outbound().with_local_version(Version(1118));
        assert_eq!(old_side.local_version(), Version(1118));
        assert_eq!(
            old_side.prepare(&version, &peer(2700, None)).unwrap().as_deref(),
            Some("9998|2000,2.0.00,B1")
        );

        let fog = GameMessage::RevealFogHex(RevealFogHex::new("g", 1, 1, 1).unwrap());
        assert_eq!(old_side.prepare(&fog, &peer(2700, None)).unwrap(), None);
    }

    // =====================================================================
    // Broadcast
    // =====================================================================

    #[test]
    fn test_broadcast_skips_peers_outside_gate() {
        let fog = GameMessage::RevealFogHex(RevealFogHex::new("g", 1, 1, 1).unwrap());
        let old = peer(1118, None);
        let new = peer(2000, None);
        let lines = outbound().broadcast(&fog, [(PeerId(1), &old), (PeerId(2), &new)]);
        assert_eq!(lines, vec![(PeerId(2), "1097|g,1,1,1".to_string())]);
    }
}
