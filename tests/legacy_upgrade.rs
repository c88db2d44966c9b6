use std::collections::BTreeSet;

use chrono::{FixedOffset, Utc};
use infinite_rules::chess::game_rules::WinCondition;
use infinite_rules::notation::legacy::{is_legacy, load_json, upgrade_in};
use infinite_rules::notation::{parse_any, LongFormat};
use infinite_rules::{
    Color, Coord, EngineConfig, GameState, NotationError, PieceKind, PieceType,
};
use serde_json::{json, Value};

use Color::{Black, White};
use PieceKind::*;

fn c(x: i64, y: i64) -> Coord {
    Coord::new(x, y)
}

fn legacy_game() -> Value {
    json!({
        "variant": "Classical",
        "metadata": {
            "Event": "Old game",
            "Round": 3,
            "Date": "2023/06/15 12:00:00"
        },
        "turn": "white",
        "moveRule": "0/100",
        "fullMove": 1,
        "startingPosition": {
            "5,1": "kingsW",
            "1,1": "rooksW",
            "1,2": "pawnsW",
            "5,8": "kingsB"
        },
        "specialRights": { "5,1": true, "1,2": true, "1,1": false },
        "moves": [
            [
                { "type": "pawnsW", "startCoords": [1, 2], "endCoords": [1, 4] },
                { "type": "kingsB", "startCoords": [5, 8], "endCoords": [5, 7] }
            ]
        ],
        "gameRules": {
            "promotionRanks": [1, 8],
            "promotionsAllowed": { "white": ["queens", "rooks"], "black": ["queens"] },
            "winConditions": { "checkmate": "both" }
        }
    })
}

#[test]
fn legacy_shapes_are_detected() {
    assert!(is_legacy(&legacy_game()));
    assert!(is_legacy(&json!({ "metadata": { "Date": "2020/01/01 00:00:00" } })));
    assert!(is_legacy(&json!({ "startingPosition": { "0,0": "kingsW" } })));
    assert!(!is_legacy(&json!({ "startingPosition": { "0,0": "K" }, "moves": ["1,2>1,3"] })));
    assert!(!is_legacy(&json!([1, 2])));
}

#[test]
fn full_legacy_document_upgrades() {
    let tz = FixedOffset::east_opt(0).unwrap();
    let lf = upgrade_in(legacy_game(), &tz).unwrap();

    assert_eq!(lf.metadata.variant.as_deref(), Some("Classical"));
    assert_eq!(lf.metadata.event.as_deref(), Some("Old game"));
    assert_eq!(lf.metadata.round.as_deref(), Some("3"));
    assert_eq!(lf.metadata.utc_date.as_deref(), Some("2023.06.15"));
    assert_eq!(lf.metadata.utc_time.as_deref(), Some("12:00:00"));

    assert_eq!(lf.move_rule, Some(0));
    assert_eq!(lf.game_rules.move_rule, Some(100));

    let position = lf.starting_position.as_ref().unwrap();
    assert_eq!(position.len(), 4);
    assert_eq!(position[&c(1, 1)], PieceType::new(Rook, White));
    assert_eq!(position[&c(5, 8)], PieceType::new(King, Black));
    assert_eq!(lf.special_rights, BTreeSet::from([c(1, 2), c(5, 1)]));

    let moves: Vec<String> = lf.moves.iter().map(ToString::to_string).collect();
    assert_eq!(moves, ["P1,2>1,4", "k5,8>5,7"]);

    let rules = &lf.game_rules;
    assert_eq!(rules.promotion_ranks_of(Black), &[1]);
    assert_eq!(rules.promotion_ranks_of(White), &[8]);
    assert_eq!(rules.promotions_allowed[&White], vec![Queen, Rook]);
    assert_eq!(rules.promotions_allowed[&Black], vec![Queen]);
    assert_eq!(rules.win_conditions_of(White), &[WinCondition::Checkmate]);
    assert_eq!(rules.win_conditions_of(Black), &[WinCondition::Checkmate]);

    let game = GameState::from_long_format(&lf, EngineConfig::default()).unwrap();
    assert_eq!(game.board().piece_at(c(1, 4)), Some(PieceType::new(Pawn, White)));
    assert_eq!(game.turn(), White);
}

#[test]
fn legacy_date_is_read_in_the_given_zone() {
    let mut doc = legacy_game();
    doc["metadata"]["Date"] = json!("2023/01/01 01:30:00");
    let tz = FixedOffset::east_opt(2 * 3600).unwrap();
    let lf = upgrade_in(doc, &tz).unwrap();
    assert_eq!(lf.metadata.utc_date.as_deref(), Some("2022.12.31"));
    assert_eq!(lf.metadata.utc_time.as_deref(), Some("23:30:00"));
}

#[test]
fn captures_and_promotions_become_move_tokens() {
    let mut doc = legacy_game();
    doc["moves"] = json!([
        {
            "type": "pawnsB",
            "startCoords": [2, 2],
            "endCoords": [1, 1],
            "captured": "rooksW",
            "promotion": "queensB"
        },
        "K5,1>5,2"
    ]);
    let lf = upgrade_in(doc, &Utc).unwrap();
    let moves: Vec<String> = lf.moves.iter().map(ToString::to_string).collect();
    assert_eq!(moves, ["p2,2x1,1=q", "K5,1>5,2"]);
}

#[test]
fn missing_win_conditions_come_from_the_variant() {
    let doc = json!({
        "variant": "3-Check",
        "moves": []
    });
    let lf = upgrade_in(doc, &Utc).unwrap();
    assert_eq!(
        lf.game_rules.win_conditions_of(White),
        &[WinCondition::Checkmate, WinCondition::NCheck(3)]
    );
    assert!(lf.game_rules.promotes(Black));
}

#[test]
fn missing_win_conditions_without_a_known_variant_fail() {
    let doc = json!({
        "variant": "Omega",
        "startingPosition": { "0,0": "kingsW", "5,5": "kingsB" }
    });
    let err = upgrade_in(doc, &Utc).unwrap_err();
    assert!(matches!(
        err,
        NotationError::UpgradeInvariant {
            field: "gameRules.winConditions"
        }
    ));
}

#[test]
fn per_color_enum_win_conditions_are_split() {
    let mut doc = legacy_game();
    doc["gameRules"]["winConditions"] = json!({ "checkmate": "white", "royalcapture": "black" });
    let lf = upgrade_in(doc, &Utc).unwrap();
    assert_eq!(lf.game_rules.win_conditions_of(White), &[WinCondition::Checkmate]);
    assert_eq!(lf.game_rules.win_conditions_of(Black), &[WinCondition::RoyalCapture]);
}

#[test]
fn current_documents_load_unchanged() {
    let lf = upgrade_in(legacy_game(), &Utc).unwrap();
    let json = lf.to_json_pretty().unwrap();
    assert!(!is_legacy(&serde_json::from_str::<Value>(&json).unwrap()));
    assert_eq!(load_json(&json).unwrap(), lf);
    assert_eq!(parse_any(&json).unwrap(), lf);
    assert_eq!(LongFormat::from_json(&json).unwrap(), lf);
}
