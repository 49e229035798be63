//! A few peers on different versions and locales, end to end.

use std::sync::Arc;

use hexline_catalog::{GameMessage, SvpTextMessage};
use hexline_protocol::{MemoryStrings, Message};
use hexline_session::{Inbound, Outbound, PeerDirectory, PeerId};

fn strings() -> MemoryStrings {
    MemoryStrings::new("en_US")
        .with("en_US", "svp.island", "for settling a new island ({0} VP)")
        .with("es", "svp.island", "por colonizar una isla nueva ({0} PV)")
}

/// Connects a peer and feeds it the version line it would send.
fn join(peers: &mut PeerDirectory, id: u64, hello: &str) {
    let peer_id = PeerId(id);
    peers.connect(peer_id).unwrap();
    let info = peers.get(peer_id).unwrap().clone();
    match Inbound::new().accept(hello, &info) {
        Some(GameMessage::Version(version)) => {
            peers.negotiate(peer_id, &version).unwrap();
        }
        other => panic!("unexpected hello result: {other:?}"),
    }
    peers.authenticate(peer_id).unwrap();
}

#[test]
fn test_one_event_two_locales() {
    let mut peers = PeerDirectory::new();
    join(&mut peers, 1, "9998|2700,2.7.00,\t,\t,en_US");
    join(&mut peers, 2, "9998|2700,2.7.00,\t,\t,es_AR");

    let outbound = Outbound::new(Arc::new(strings()));
    let event = GameMessage::SvpTextMessage(SvpTextMessage::new("Game1", 3, 2, "svp.island").unwrap());
    let mut lines = outbound.broadcast(&event, peers.iter());
    lines.sort();

    assert_eq!(
        lines,
        vec![
            (PeerId(1), "1099|Game1,3,2,for settling a new island (2 VP)".to_string()),
            (PeerId(2), "1099|Game1,3,2,por colonizar una isla nueva (2 PV)".to_string()),
        ]
    );

    // Apart from the text, the two copies are the same message.
    let inbound = Inbound::new();
    let decoded: Vec<SvpTextMessage> = lines
        .iter()
        .map(|(id, line)| match inbound.accept(line, peers.get(*id).unwrap()) {
            Some(GameMessage::SvpTextMessage(m)) => m,
            other => panic!("unexpected: {other:?}"),
        })
        .collect();
    assert_eq!(decoded[0].game(), decoded[1].game());
    assert_eq!(decoded[0].player_number(), decoded[1].player_number());
    assert_eq!(decoded[0].svp(), decoded[1].svp());
    assert_ne!(decoded[0].description(), decoded[1].description());
}

#[test]
fn test_pre_i18n_peer_gets_default_locale_or_nothing() {
    let mut peers = PeerDirectory::new();
    join(&mut peers, 1, "9998|1118,1.1.18,JM1");

    let info = peers.get(PeerId(1)).unwrap();
    assert_eq!(info.version.number(), 1118);
    assert_eq!(info.locale, None);

    let outbound = Outbound::new(Arc::new(strings()));
    // SVP text itself needs a 2.0 client, so nothing goes to this peer.
    let event = GameMessage::SvpTextMessage(SvpTextMessage::new("Game1", 0, 1, "svp.island").unwrap());
    assert!(outbound.broadcast(&event, peers.iter()).is_empty());
}

#[test]
fn test_disconnected_peer_gets_nothing() {
    let mut peers = PeerDirectory::new();
    join(&mut peers, 1, "9998|2700,2.7.00");
    join(&mut peers, 2, "9998|2700,2.7.00");
    peers.disconnect(PeerId(1)).unwrap();

    let outbound = Outbound::new(Arc::new(strings()));
    let event = GameMessage::SvpTextMessage(SvpTextMessage::new("G", 0, 1, "svp.island").unwrap());
    let lines = outbound.broadcast(&event, peers.iter());
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].0, PeerId(2));
    assert_eq!(event.type_id(), 1099);
}
