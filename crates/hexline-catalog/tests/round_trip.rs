//! Every catalog type survives encode → dispatch unchanged, and the
//! dispatcher drops what it can't use.

use hexline_catalog::{
    registry, ChangeGameOptions, DiceResultResources, ElementAction, GameMembers, GameMessage,
    GameServerText, GameTextMsg, LocalizedStrings, LongestRoad, MoveRobber, PlayerElements,
    PlayerGain, PutPiece, RevealFogHex, SetTurn, SvpTextMessage, UndoNotAllowedReasonText,
    VersionMsg,
};
use hexline_protocol::{Codec, JsonCodec, Message, Version};

fn samples() -> Vec<GameMessage> {
    vec![
        GameMessage::LongestRoad(LongestRoad::new("Game1", 3).unwrap()),
        GameMessage::SetTurn(SetTurn::new("Game1", 0).unwrap()),
        GameMessage::MoveRobber(MoveRobber::new("Game1", 1, -0x0607).unwrap()),
        GameMessage::RevealFogHex(RevealFogHex::new("Game1", 0x0b07, 4, 9).unwrap()),
        GameMessage::PutPiece(PutPiece::new("Game1", 2, PutPiece::ROAD, 0x67).unwrap()),
        GameMessage::DiceResultResources(
            DiceResultResources::new(
                "Game1",
                vec![PlayerGain {
                    player_number: 0,
                    total: 5,
                    resources: vec![(2, 4)],
                }],
            )
            .unwrap(),
        ),
        GameMessage::PlayerElements(
            PlayerElements::new("Game1", 1, ElementAction::Lose, vec![(4, 1)]).unwrap(),
        ),
        GameMessage::GameMembers(
            GameMembers::new("Game1", vec!["alice".into(), "bob".into(), "carol".into()])
                .unwrap(),
        ),
        GameMessage::LocalizedStrings(
            LocalizedStrings::new(LocalizedStrings::TYPE_GAMEOPT, 0, vec!["PLB".into()]).unwrap(),
        ),
        GameMessage::ChangeGameOptions(
            ChangeGameOptions::remove("Game1", vec!["SBL".into()], None).unwrap(),
        ),
        GameMessage::GameTextMsg(GameTextMsg::new("Game1", "alice", "gg, well played").unwrap()),
        GameMessage::GameServerText(GameServerText::new("Game1", "bob has left").unwrap()),
        GameMessage::SvpTextMessage(
            SvpTextMessage::new("Game1", 2, 1, "settled an island").unwrap(),
        ),
        GameMessage::UndoNotAllowedReasonText(
            UndoNotAllowedReasonText::new("Game1", true, Some("undo.disabled".into()))
                .unwrap(),
        ),
        GameMessage::Version(
            VersionMsg::new(Version(2700), "2.7.00", Some("B1".into()), None, Some("fr".into()))
                .unwrap(),
        ),
    ]
}

#[test]
fn test_every_catalog_type_round_trips() {
    for msg in samples() {
        let line = msg.encode();
        let back = registry()
            .dispatch(&line)
            .unwrap_or_else(|| panic!("{} did not decode: {line:?}", msg.name()));

        assert_eq!(back.encode(), line, "{}", msg.name());
        assert_eq!(back, msg, "{}", msg.name());
    }
}

#[test]
fn test_every_catalog_type_survives_json() {
    let codec = JsonCodec;
    for msg in samples() {
        let bytes = codec.encode(&msg).unwrap();
        let back: GameMessage = codec.decode(&bytes).unwrap();
        assert_eq!(back, msg, "{}", msg.name());
        assert_eq!(back.encode(), msg.encode(), "{}", msg.name());
    }
}

#[test]
fn test_json_with_invalid_content_is_rejected() {
    for json in [
        r#"{"type":"SetTurn","body":{"game":"a,b|c","player_number":-7}}"#,
        r#"{"type":"SetTurn","body":{"game":"Game1","player_number":-7}}"#,
        r#"{"type":"GameMembers","body":{"game":"Game1","members":["al,ice"]}}"#,
        r#"{"type":"GameTextMsg","body":{"game":"Game1","nickname":"alice","text":"a|b"}}"#,
        r#"{"type":"Version","body":{"version":2700,"version_string":"2,7","build":null,"features":null,"locale":null}}"#,
    ] {
        let result = serde_json::from_str::<GameMessage>(json);
        assert!(result.is_err(), "{json} decoded as {result:?}");
    }
}

#[test]
fn test_dice_result_with_empty_middle_player() {
    let msg = GameMessage::DiceResultResources(
        DiceResultResources::new(
            "g",
            vec![
                PlayerGain {
                    player_number: 0,
                    total: 0,
                    resources: vec![],
                },
                PlayerGain {
                    player_number: 1,
                    total: 4,
                    resources: vec![(4, 1)],
                },
            ],
        )
        .unwrap(),
    );
    let line = msg.encode();
    assert_eq!(registry().dispatch(&line), Some(msg));
}

#[test]
fn test_registry_metadata_matches_types() {
    for msg in samples() {
        let info = registry().info(msg.type_id()).unwrap();
        assert_eq!(info.name, msg.name());
        assert_eq!(info.gate, msg.gate());
        assert_eq!(info.caps, msg.caps());
    }
}

#[test]
fn test_unknown_and_malformed_lines_are_dropped() {
    let registry = registry();
    for line in [
        "99999|a,b,c",
        "",
        "abc",
        "1055",
        "1055|Game1,notanumber",
        "1055|Game1|2",
        "1114|Game1,R,O 9,PLB",
    ] {
        assert!(registry.dispatch(line).is_none(), "{line:?}");
    }
    assert!(matches!(registry.decode("99999|a,b,c"), Ok(None)));
}

#[test]
fn test_gates_follow_versions() {
    let fog = GameMessage::RevealFogHex(RevealFogHex::new("g", 1, 1, 1).unwrap());
    assert!(!fog.gate().allows(Version(1118)));
    assert!(fog.gate().allows(Version(2000)));

    let options = GameMessage::ChangeGameOptions(
        ChangeGameOptions::remove("g", vec!["PLB".into()], None).unwrap(),
    );
    assert!(!options.gate().allows(Version(2000)));
    assert!(options.gate().allows(Version(2700)));
}
