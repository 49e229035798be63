//! Relays game chat between every connected peer.
//!
//! Each peer announces its version first; that also counts as login here.
//! Chat lines are re-sent to everyone, and server notices go out in each
//! peer's own locale.
//!
//! ```text
//! cargo run -p chat-relay -- [config.json]
//! printf '9998|2700,2.7.00,\t,\t,es\n1010|Game1,alice,hola\n' | nc 127.0.0.1 8880
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use hexline::catalog::{GameServerText, SvpTextMessage};
use hexline::prelude::*;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};

const BIND_ADDR: &str = "127.0.0.1:8880";

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Hub {
    peers: PeerDirectory,
    outboxes: HashMap<PeerId, mpsc::UnboundedSender<String>>,
}

impl Hub {
    /// Prepares `msg` once per peer and queues each line.
    fn broadcast(&self, outbound: &Outbound, msg: &GameMessage) {
        for (peer_id, line) in outbound.broadcast(msg, self.peers.iter()) {
            if let Some(outbox) = self.outboxes.get(&peer_id) {
                let _ = outbox.send(line);
            }
        }
    }
}

fn strings(default_locale: &str) -> MemoryStrings {
    MemoryStrings::new(default_locale)
        .with("en_US", "relay.joined", "a player joined")
        .with("es", "relay.joined", "se unió un jugador")
        .with("fr", "relay.joined", "un joueur a rejoint")
}

// ---------------------------------------------------------------------------
// Connection handling
// ---------------------------------------------------------------------------

async fn handle(
    stream: TcpStream,
    peer_id: PeerId,
    hub: Arc<Mutex<Hub>>,
    outbound: Outbound,
    hello: String,
) -> Result<(), HexlineError> {
    let (read, write) = stream.into_split();
    let (outbox, mut queue) = mpsc::unbounded_channel::<String>();

    {
        let mut hub = hub.lock().await;
        hub.peers.connect(peer_id)?;
        hub.outboxes.insert(peer_id, outbox.clone());
    }
    let _ = outbox.send(hello);

    let writer = tokio::spawn(async move {
        let mut writer = LineWriter::new(write);
        while let Some(line) = queue.recv().await {
            if let Err(err) = writer.send_line(&line).await {
                tracing::debug!(%peer_id, error = %err, "write failed");
                break;
            }
        }
    });

    let inbound = Inbound::new();
    let mut reader = LineReader::new(read);
    while let Some(line) = reader.next_line().await? {
        let mut hub = hub.lock().await;
        let Some(info) = hub.peers.get(peer_id).cloned() else {
            break;
        };
        match inbound.accept(&line, &info) {
            Some(GameMessage::Version(announced)) => {
                hub.peers.negotiate(peer_id, &announced)?;
                hub.peers.authenticate(peer_id)?;
                // Carried as a zero-point SVP notice, the only keyed
                // broadcast type in the catalog.
                let player = i32::try_from(peer_id.0).unwrap_or(-1);
                let joined = SvpTextMessage::new("relay", player, 0, "relay.joined")?;
                hub.broadcast(&outbound, &GameMessage::SvpTextMessage(joined));
            }
            Some(msg @ GameMessage::GameTextMsg(_)) => hub.broadcast(&outbound, &msg),
            Some(other) => tracing::debug!(%peer_id, message = other.name(), "ignored"),
            None => {}
        }
    }

    {
        let mut hub = hub.lock().await;
        hub.outboxes.remove(&peer_id);
        hub.peers.disconnect(peer_id)?;
        let left = GameServerText::new("relay", format!("{peer_id} left"))?;
        hub.broadcast(&outbound, &GameMessage::GameServerText(left));
    }
    drop(outbox);
    let _ = writer.await;
    Ok(())
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), HexlineError> {
    let config = match std::env::args().nth(1) {
        Some(path) => HexlineConfig::load(path)?,
        None => HexlineConfig::default(),
    };
    hexline::logging::init(&config.log_filter);

    let outbound = config.outbound(Arc::new(strings(&config.default_locale)));
    let hello = config.announcement(None)?.encode();
    let hub = Arc::new(Mutex::new(Hub::default()));

    let listener = TcpListener::bind(BIND_ADDR).await?;
    tracing::info!(addr = BIND_ADDR, "chat relay listening");

    let mut next_id = 1;
    loop {
        let (stream, addr) = listener.accept().await?;
        let peer_id = PeerId(next_id);
        next_id += 1;
        tracing::info!(%peer_id, %addr, "accepted connection");

        let hub = Arc::clone(&hub);
        let outbound = outbound.clone();
        let hello = hello.clone();
        tokio::spawn(async move {
            if let Err(err) = handle(stream, peer_id, hub, outbound, hello).await {
                tracing::warn!(%peer_id, error = %err, "connection ended with error");
            }
        });
    }
}
