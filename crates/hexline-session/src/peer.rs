//! Peers and what each one negotiated.
//!
//! A peer starts out at [`Version::BASELINE`] with no locale and no login.
//! Its [`VersionMsg`] raises the version and sets the locale; the server's
//! login handling marks it authenticated. Everything the send and receive
//! paths decide per peer comes from its [`PeerInfo`].
//!
//! # Lifecycle
//!
//! ```text
//! connect() ──→ negotiate() ──→ authenticate() ──→ disconnect()
//!     │              │                 │                 │
//!     ▼              ▼                 ▼                 ▼
//! [BASELINE,    [announced       [authenticated]     [forgotten]
//!  no locale]    version, locale]
//! ```
//!
//! - **connect**: the id gets a default [`PeerInfo`]. Only
//!   `FROM_UNAUTHENTICATED` types are accepted and encoding uses the
//!   baseline layout.
//! - **negotiate**: may happen more than once. Each announcement replaces
//!   the version; the locale only changes when one is sent.
//! - **authenticate**: one-way. There is no logout short of
//!   disconnecting.
//! - **disconnect**: returns the final [`PeerInfo`] so the caller can log
//!   or clean up after it.
//!
//! # Concurrency note
//!
//! [`PeerDirectory`] is a plain `HashMap`. It belongs to whichever task
//! owns the connections and is shared through that task, not locked here.

use std::collections::HashMap;
use std::fmt;

use hexline_catalog::VersionMsg;
use hexline_protocol::Version;

use crate::SessionError;

// ---------------------------------------------------------------------------
// PeerId
// ---------------------------------------------------------------------------

/// Identifies one connection.
///
/// Displayed as `C-<n>` in logs, so `C-42` is connection 42.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(pub u64);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// PeerInfo
// ---------------------------------------------------------------------------

/// What we know about one peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerInfo {
    /// Protocol version the peer announced, or the baseline until it does.
    pub version: Version,

    /// Locale the peer asked for. `None` means the server default.
    pub locale: Option<String>,

    /// Whether the peer has logged in. Until then only types flagged
    /// `FROM_UNAUTHENTICATED` are accepted from it.
    pub authenticated: bool,
}

impl PeerInfo {
    /// A peer at a known version, not yet logged in.
    pub fn new(version: Version, locale: Option<String>) -> Self {
        Self {
            version,
            locale,
            authenticated: false,
        }
    }

    /// Takes the version and locale from the peer's announcement.
    ///
    /// The locale is only replaced when the announcement carries one, so
    /// a locale set some other way survives a bare version message.
    pub fn apply(&mut self, announced: &VersionMsg) {
        self.version = announced.version();
        if let Some(locale) = announced.locale() {
            self.locale = Some(locale.to_string());
        }
    }
}

impl Default for PeerInfo {
    fn default() -> Self {
        Self::new(Version::BASELINE, None)
    }
}

// ---------------------------------------------------------------------------
// PeerDirectory
// ---------------------------------------------------------------------------

/// Every connected peer, keyed by connection id.
///
/// Each operation other than [`connect`](Self::connect) fails with
/// [`SessionError::NotFound`] for an id that was never connected or has
/// already disconnected, so a late message from a dropped connection
/// can't resurrect it.
#[derive(Debug, Default)]
pub struct PeerDirectory {
    /// One entry per live connection. Removed on disconnect.
    peers: HashMap<PeerId, PeerInfo>,
}

impl PeerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new connection with default [`PeerInfo`].
    ///
    /// # Errors
    /// [`SessionError::AlreadyConnected`] if the id is in use.
    pub fn connect(&mut self, peer_id: PeerId) -> Result<&PeerInfo, SessionError> {
        if self.peers.contains_key(&peer_id) {
            return Err(SessionError::AlreadyConnected(peer_id));
        }
        tracing::info!(%peer_id, "peer connected");
        Ok(&*self.peers.entry(peer_id).or_default())
    }

    /// Forgets a connection, returning what was known about it.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if the id isn't connected.
    pub fn disconnect(&mut self, peer_id: PeerId) -> Result<PeerInfo, SessionError> {
        let info = self
            .peers
            .remove(&peer_id)
            .ok_or(SessionError::NotFound(peer_id))?;
        tracing::info!(%peer_id, "peer disconnected");
        Ok(info)
    }

    /// Records a peer's version announcement.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if the id isn't connected.
    pub fn negotiate(
        &mut self,
        peer_id: PeerId,
        announced: &VersionMsg,
    ) -> Result<&PeerInfo, SessionError> {
        let info = self
            .peers
            .get_mut(&peer_id)
            .ok_or(SessionError::NotFound(peer_id))?;
        info.apply(announced);
        tracing::info!(
            %peer_id,
            version = %info.version,
            locale = info.locale.as_deref().unwrap_or("default"),
            "peer version negotiated"
        );
        Ok(&*info)
    }

    /// Marks a peer as logged in.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if the id isn't connected.
    pub fn authenticate(&mut self, peer_id: PeerId) -> Result<&PeerInfo, SessionError> {
        let info = self
            .peers
            .get_mut(&peer_id)
            .ok_or(SessionError::NotFound(peer_id))?;
        info.authenticated = true;
        tracing::info!(%peer_id, "peer authenticated");
        Ok(&*info)
    }

    pub fn get(&self, peer_id: PeerId) -> Option<&PeerInfo> {
        self.peers.get(&peer_id)
    }

    /// All connected peers, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (PeerId, &PeerInfo)> {
        self.peers.iter().map(|(id, info)| (*id, info))
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
