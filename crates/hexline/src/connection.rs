//! One peer's connection: reader, writer, and negotiated state together.
//!
//! The flow on either side is the same:
//!   1. Send our [`VersionMsg`] with [`announce`](Connection::announce).
//!   2. [`recv`](Connection::recv) the peer's; it updates [`PeerInfo`].
//!   3. Once login succeeds, [`authenticate`](Connection::authenticate)
//!      so game traffic from the peer is accepted.
//!   4. [`send`](Connection::send) and `recv` game messages.

use hexline_catalog::{GameMessage, VersionMsg};
use hexline_protocol::Message;
use hexline_session::{Inbound, Outbound, PeerId, PeerInfo};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::io::{LineReader, LineWriter};
use crate::HexlineError;

pub struct Connection<'r, R, W> {
    peer_id: PeerId,
    peer: PeerInfo,
    reader: LineReader<R>,
    writer: LineWriter<W>,
    inbound: Inbound<'r>,
    outbound: Outbound,
}

impl<'r, R, W> Connection<'r, R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(
        peer_id: PeerId,
        reader: R,
        writer: W,
        inbound: Inbound<'r>,
        outbound: Outbound,
    ) -> Self {
        Self {
            peer_id,
            peer: PeerInfo::default(),
            reader: LineReader::new(reader),
            writer: LineWriter::new(writer),
            inbound,
            outbound,
        }
    }

    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    pub fn peer(&self) -> &PeerInfo {
        &self.peer
    }

    /// Accepts game traffic from the peer from now on.
    pub fn authenticate(&mut self) {
        self.peer.authenticated = true;
        tracing::info!(peer_id = %self.peer_id, "peer authenticated");
    }

    /// Sends our version announcement.
    ///
    /// Goes out before the peer's version is known, so it skips the gate
    /// and carries every field. Older peers ignore the trailing ones.
    ///
    /// # Errors
    /// [`HexlineError::Io`] if the write fails.
    pub async fn announce(&mut self, announced: &VersionMsg) -> Result<(), HexlineError> {
        self.writer.send_line(&announced.encode()).await
    }

    /// Sends `msg` if the peer can receive it.
    ///
    /// Returns `false`, without writing anything, when the peer's version
    /// is outside the type's range.
    ///
    /// # Errors
    /// [`HexlineError::Session`] if the message can't be prepared, or
    /// [`HexlineError::Io`] if the write fails.
    pub async fn send(&mut self, msg: &GameMessage) -> Result<bool, HexlineError> {
        let Some(line) = self.outbound.prepare(msg, &self.peer)? else {
            return Ok(false);
        };
        self.writer.send_line(&line).await?;
        Ok(true)
    }

    /// Writes an already prepared line, such as one from
    /// [`Outbound::broadcast`].
    ///
    /// # Errors
    /// [`HexlineError::Io`] if the write fails.
    pub async fn send_line(&mut self, line: &str) -> Result<(), HexlineError> {
        self.writer.send_line(line).await
    }

    /// The next message from the peer, or `None` when it hangs up.
    ///
    /// Lines the dispatcher or the login filter drop are skipped. A
    /// [`VersionMsg`] updates the peer's version and locale before it is
    /// returned.
    ///
    /// # Errors
    /// [`HexlineError::Io`] if the read fails.
    pub async fn recv(&mut self) -> Result<Option<GameMessage>, HexlineError> {
        while let Some(line) = self.reader.next_line().await? {
            let Some(msg) = self.inbound.accept(&line, &self.peer) else {
                continue;
            };
            if let GameMessage::Version(announced) = &msg {
                self.peer.apply(announced);
                tracing::info!(
                    peer_id = %self.peer_id,
                    version = %self.peer.version,
                    locale = self.peer.locale.as_deref().unwrap_or("default"),
                    "peer version negotiated"
                );
            }
            tracing::trace!(peer_id = %self.peer_id, message = msg.name(), type_id = msg.type_id(), "received");
            return Ok(Some(msg));
        }
        tracing::debug!(peer_id = %self.peer_id, "peer closed the stream");
        Ok(None)
    }
}
