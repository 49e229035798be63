//! Two endpoints talking over an in-memory pipe.

use std::sync::Arc;

use hexline::catalog::{GameServerText, RevealFogHex, SetTurn, SvpTextMessage};
use hexline::prelude::*;
use tokio::io::{duplex, split, DuplexStream, ReadHalf, WriteHalf};

type End = Connection<'static, ReadHalf<DuplexStream>, WriteHalf<DuplexStream>>;

fn strings() -> Arc<MemoryStrings> {
    Arc::new(
        MemoryStrings::new("en_US")
            .with("en_US", "svp.island", "for settling a new island")
            .with("es", "svp.island", "por colonizar una isla nueva"),
    )
}

fn pair() -> (End, End) {
    let (a, b) = duplex(4096);
    let (a_read, a_write) = split(a);
    let (b_read, b_write) = split(b);
    let server = Connection::new(PeerId(1), a_read, a_write, Inbound::new(), Outbound::new(strings()));
    let client = Connection::new(PeerId(0), b_read, b_write, Inbound::new(), Outbound::new(strings()));
    (server, client)
}

fn hello(version: u32, locale: Option<&str>) -> VersionMsg {
    let version = Version(version);
    VersionMsg::new(version, version.to_string(), None, None, locale.map(String::from)).unwrap()
}

// =========================================================================
// Handshake
// =========================================================================

#[tokio::test]
async fn test_version_exchange_updates_both_sides() {
    hexline::logging::init("debug");
    let (mut server, mut client) = pair();

    client.announce(&hello(2700, Some("es_AR"))).await.unwrap();
    server.announce(&hello(2500, None)).await.unwrap();

    let got = server.recv().await.unwrap();
    assert!(matches!(got, Some(GameMessage::Version(_))));
    assert_eq!(server.peer().version, Version(2700));
    assert_eq!(server.peer().locale.as_deref(), Some("es_AR"));

    client.recv().await.unwrap();
    assert_eq!(client.peer().version, Version(2500));
    assert_eq!(client.peer().locale, None);
}

#[tokio::test]
async fn test_game_traffic_before_login_is_dropped() {
    let (mut server, mut client) = pair();
    client.announce(&hello(2700, None)).await.unwrap();
    server.recv().await.unwrap();

    // The client's view of the server: already at the current version.
    client.authenticate();

    let turn = GameMessage::SetTurn(SetTurn::new("Game1", 2).unwrap());
    client.send_line(&turn.encode()).await.unwrap();
    client.send_line("1066|Game1,1").await.unwrap();
    drop(client);

    // Neither line reaches the handler: the peer hasn't logged in.
    assert!(server.recv().await.unwrap().is_none());
}

#[tokio::test]
async fn test_game_traffic_after_login() {
    let (mut server, mut client) = pair();
    client.announce(&hello(2700, None)).await.unwrap();
    server.recv().await.unwrap();
    server.authenticate();

    client.send_line("garbage").await.unwrap();
    client.send_line("1055|Game1,2").await.unwrap();

    let got = server.recv().await.unwrap();
    assert_eq!(got, Some(GameMessage::SetTurn(SetTurn::new("Game1", 2).unwrap())));
}

// =========================================================================
// Sending
// =========================================================================

#[tokio::test]
async fn test_send_localizes_for_the_peer() {
    let (mut server, mut client) = pair();
    client.announce(&hello(2700, Some("es_AR"))).await.unwrap();
    server.recv().await.unwrap();
    server.announce(&hello(2700, None)).await.unwrap();
    client.recv().await.unwrap();
    client.authenticate();

    let svp = GameMessage::SvpTextMessage(SvpTextMessage::new("Game1", 1, 2, "svp.island").unwrap());
    assert!(server.send(&svp).await.unwrap());

    let Some(GameMessage::SvpTextMessage(got)) = client.recv().await.unwrap() else {
        panic!("expected SVP text");
    };
    assert_eq!(got.description(), "por colonizar una isla nueva");
    assert_eq!(got.svp(), 2);
}

#[tokio::test]
async fn test_send_skips_too_old_peer() {
    let (mut server, mut client) = pair();
    client.announce(&hello(1118, None)).await.unwrap();
    server.recv().await.unwrap();

    let fog = GameMessage::RevealFogHex(RevealFogHex::new("Game1", 0x0b07, 4, 9).unwrap());
    assert!(!server.send(&fog).await.unwrap());

    // A plain server text needs 2.0 too; fall back to nothing as well.
    let text = GameMessage::GameServerText(GameServerText::new("Game1", "hello").unwrap());
    assert!(!server.send(&text).await.unwrap());

    // Something the old peer does understand goes through.
    let turn = GameMessage::SetTurn(SetTurn::new("Game1", 0).unwrap());
    assert!(server.send(&turn).await.unwrap());
    drop(server);

    client.authenticate();
    assert_eq!(client.recv().await.unwrap(), Some(turn));
    assert!(client.recv().await.unwrap().is_none());
}
