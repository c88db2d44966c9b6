use std::collections::{BTreeMap, BTreeSet};

use infinite_rules::chess::game_rules::{GameRules, WinCondition};
use infinite_rules::chess::moveset::Moveset;
use infinite_rules::chess::variants;
use infinite_rules::game::StartSnapshot;
use infinite_rules::notation::{Metadata, ResultTag};
use infinite_rules::rules::wincond::{Conclusion, Termination};
use infinite_rules::{Color, Coord, EngineConfig, GameState, MoveDraft, PieceKind, PieceType};

use Color::{Black, White};
use PieceKind::*;

fn c(x: i64, y: i64) -> Coord {
    Coord::new(x, y)
}

fn play(g: &mut GameState, moves: &[((i64, i64), (i64, i64))]) {
    for &((sx, sy), (ex, ey)) in moves {
        g.make_move(MoveDraft::new(c(sx, sy), c(ex, ey)))
            .unwrap_or_else(|e| panic!("{sx},{sy}>{ex},{ey}: {e}"));
    }
}

fn position(pieces: &[(i64, i64, PieceKind, Color)]) -> BTreeMap<Coord, PieceType> {
    pieces
        .iter()
        .map(|&(x, y, k, col)| (c(x, y), PieceType::new(k, col)))
        .collect()
}

fn custom(rules: GameRules, pieces: &[(i64, i64, PieceKind, Color)], turn: Color) -> GameState {
    let start = StartSnapshot {
        turn,
        ..StartSnapshot::new(position(pieces), BTreeSet::new())
    };
    GameState::new(Metadata::default(), rules, start, EngineConfig::default()).unwrap()
}

fn variant(name: &str) -> GameState {
    GameState::from_variant(name, Metadata::default(), EngineConfig::default()).unwrap()
}

#[test]
fn fools_mate_is_checkmate() {
    let mut g = variant(variants::CLASSICAL);
    play(&mut g, &[((6, 2), (6, 3)), ((5, 7), (5, 5)), ((7, 2), (7, 4))]);
    assert!(g.conclusion().is_none());

    let mv = *g.make_move(MoveDraft::new(c(4, 8), c(8, 4))).unwrap();
    assert!(mv.check);
    assert!(mv.mate);
    assert!(g.is_in_check());
    assert_eq!(
        g.conclusion(),
        Some(&Conclusion::win(Black, Termination::Checkmate))
    );
    assert_eq!(g.to_long_format().metadata.result, Some(ResultTag::BlackWins));
    assert!(g.make_move(MoveDraft::new(c(1, 2), c(1, 3))).is_err());

    g.undo_move().unwrap();
    assert!(g.conclusion().is_none());
    assert_eq!(g.turn(), Black);
}

#[test]
fn two_kings_turn_checkmate_into_royal_capture() {
    let pieces = [
        (0, 0, King, White),
        (10, 0, King, White),
        (30, 2, Pawn, White),
        (0, 5, Rook, Black),
        (10, 5, Rook, Black),
        (50, 50, King, Black),
    ];
    let mut g = custom(GameRules::classical(), &pieces, White);
    let effective = g.effective_conditions();
    assert!(effective.is_substituted(Black));
    assert_eq!(effective.of(Black), &[WinCondition::RoyalCapture]);
    assert!(!effective.is_substituted(White));
    assert_eq!(effective.of(White), &[WinCondition::Checkmate]);

    // White may ignore the check: nobody can checkmate it.
    assert!(g.is_in_check());
    play(&mut g, &[((30, 2), (30, 3)), ((0, 5), (0, 0))]);
    assert!(g.conclusion().is_none(), "one white king is left");

    play(&mut g, &[((30, 3), (30, 4)), ((10, 5), (10, 0))]);
    assert_eq!(
        g.conclusion(),
        Some(&Conclusion::win(Black, Termination::RoyalCapture))
    );
}

#[test]
fn crowded_positions_play_royal_capture() {
    let config = EngineConfig {
        checkmate_piece_threshold: 32,
        ..EngineConfig::default()
    };
    let g = GameState::from_variant(variants::CLASSICAL, Metadata::default(), config).unwrap();
    assert!(g.effective_conditions().is_substituted(White));
    assert!(g.effective_conditions().is_substituted(Black));
    assert!(g.effective_conditions().has(White, WinCondition::RoyalCapture));
}

#[test]
fn insufficient_material_is_color_symmetric() {
    for (strong, weak) in [(White, Black), (Black, White)] {
        let g = custom(
            GameRules::classical(),
            &[
                (0, 0, King, strong),
                (3, 3, Knight, strong),
                (4, 7, Knight, strong),
                (20, 20, King, weak),
            ],
            White,
        );
        assert_eq!(
            g.conclusion(),
            Some(&Conclusion::draw(Termination::InsufficientMaterial)),
            "{strong} with two knights"
        );

        let g = custom(
            GameRules::classical(),
            &[
                (0, 0, King, strong),
                (3, 3, Rook, strong),
                (4, 7, Rook, strong),
                (20, 20, King, weak),
            ],
            White,
        );
        assert!(g.conclusion().is_none(), "{strong} with two rooks");
    }
}

#[test]
fn promotable_pawns_are_never_insufficient() {
    let g = custom(
        GameRules::classical(),
        &[(0, 0, King, White), (3, 3, Pawn, White), (20, 20, King, Black)],
        White,
    );
    assert!(g.conclusion().is_none());
}

#[test]
fn third_check_wins() {
    let rules =
        GameRules::classical().with_win_conditions(&[WinCondition::Checkmate, WinCondition::NCheck(3)]);
    let mut g = custom(
        rules,
        &[(0, 0, King, White), (1, 10, Rook, White), (5, 5, King, Black)],
        White,
    );
    play(
        &mut g,
        &[
            ((1, 10), (1, 5)),
            ((5, 5), (6, 6)),
            ((1, 5), (1, 6)),
            ((6, 6), (7, 7)),
        ],
    );
    assert_eq!(g.check_count(White), 2);
    assert!(g.conclusion().is_none());

    play(&mut g, &[((1, 6), (1, 7))]);
    assert_eq!(g.check_count(White), 3);
    assert_eq!(
        g.conclusion(),
        Some(&Conclusion::win(White, Termination::NCheck(3)))
    );

    g.undo_move().unwrap();
    assert_eq!(g.check_count(White), 2);
    assert!(g.conclusion().is_none());
}

#[test]
fn king_reaching_the_hill_wins() {
    let mut g = variant(variants::CLASSICAL_KOTH);
    play(
        &mut g,
        &[
            ((5, 2), (5, 4)),
            ((1, 7), (1, 6)),
            ((5, 1), (5, 2)),
            ((1, 6), (1, 5)),
            ((5, 2), (4, 3)),
            ((1, 5), (1, 4)),
        ],
    );
    assert!(g.conclusion().is_none());
    play(&mut g, &[((4, 3), (4, 4))]);
    assert_eq!(
        g.conclusion(),
        Some(&Conclusion::win(White, Termination::KingOfTheHill))
    );
}

#[test]
fn stalemate_is_a_draw() {
    let g = custom(
        GameRules::classical(),
        &[
            (0, 0, King, Black),
            (2, 1, Queen, White),
            (-5, -1, Rook, White),
            (-1, 5, Rook, White),
            (10, 10, King, White),
        ],
        Black,
    );
    assert!(!g.is_in_check());
    assert_eq!(
        g.conclusion(),
        Some(&Conclusion::draw(Termination::Stalemate))
    );
}

#[test]
fn threefold_repetition_draws() {
    let mut g = variant(variants::CLASSICAL);
    let shuffle = [((7, 1), (6, 3)), ((7, 8), (6, 6)), ((6, 3), (7, 1)), ((6, 6), (7, 8))];
    play(&mut g, &shuffle);
    assert!(g.conclusion().is_none());
    play(&mut g, &shuffle);
    assert_eq!(
        g.conclusion(),
        Some(&Conclusion::draw(Termination::Repetition))
    );
}

#[test]
fn move_rule_counts_quiet_plies() {
    let v = variants::lookup(variants::CLASSICAL).unwrap();
    let rules = GameRules {
        move_rule: Some(4),
        ..GameRules::classical()
    };
    let mut g = GameState::new(
        Metadata::default(),
        rules,
        StartSnapshot::new(v.position, v.special_rights),
        EngineConfig::default(),
    )
    .unwrap();
    play(&mut g, &[((7, 1), (6, 3)), ((5, 7), (5, 5)), ((2, 1), (3, 3))]);
    assert_eq!(g.move_rule_ply(), 1);
    play(&mut g, &[((2, 8), (3, 6)), ((1, 1), (2, 1)), ((7, 8), (6, 6))]);
    assert_eq!(g.move_rule_ply(), 4);
    assert_eq!(g.conclusion(), Some(&Conclusion::draw(Termination::MoveRule)));
}

#[test]
fn colinear_slides_play_royal_capture() {
    // A bishop that may also leap two diagonal squares at a time along the same lines.
    let long_bishop = Moveset::new(Vec::new(), [c(1, 1), c(1, -1), c(2, 2), c(2, -2)], None);
    let pieces = [(0, 0, King, White), (3, 4, Bishop, White), (20, 30, King, Black)];
    let start = || StartSnapshot::new(position(&pieces), BTreeSet::new());

    let g = GameState::with_movesets(
        Metadata::default(),
        GameRules::classical(),
        start(),
        EngineConfig::default(),
        [(Bishop, long_bishop.clone())],
    )
    .unwrap();
    assert!(g.ruleset().has_colinear_slides());
    for color in [White, Black] {
        assert!(g.effective_conditions().is_substituted(color));
        assert_eq!(g.effective_conditions().of(color), &[WinCondition::RoyalCapture]);
    }

    let config = EngineConfig {
        disable_checkmate_on_colinear: false,
        ..EngineConfig::default()
    };
    let g = GameState::with_movesets(
        Metadata::default(),
        GameRules::classical(),
        start(),
        config,
        [(Bishop, long_bishop)],
    )
    .unwrap();
    assert!(!g.effective_conditions().is_substituted(White));
    assert_eq!(g.effective_conditions().of(White), &[WinCondition::Checkmate]);

    let plain = custom(GameRules::classical(), &pieces, White);
    assert!(!plain.ruleset().has_colinear_slides());
    assert!(!plain.effective_conditions().is_substituted(White));
}
