use infinite_rules::chess::variants;
use infinite_rules::game::MoveSpecial;
use infinite_rules::notation::Metadata;
use infinite_rules::rules::wincond::{Conclusion, Termination};
use infinite_rules::{Color, Coord, EngineConfig, GameError, GameState, MoveDraft, PieceKind, PieceType};

use Color::{Black, White};
use PieceKind::*;

fn c(x: i64, y: i64) -> Coord {
    Coord::new(x, y)
}

fn classical() -> GameState {
    GameState::from_variant(variants::CLASSICAL, Metadata::default(), EngineConfig::default())
        .unwrap()
}

fn play(g: &mut GameState, moves: &[((i64, i64), (i64, i64))]) {
    for &((sx, sy), (ex, ey)) in moves {
        g.make_move(MoveDraft::new(c(sx, sy), c(ex, ey)))
            .unwrap_or_else(|e| panic!("{sx},{sy}>{ex},{ey}: {e}"));
    }
}

const EN_PASSANT_LINE: [((i64, i64), (i64, i64)); 5] = [
    ((5, 2), (5, 4)),
    ((1, 7), (1, 6)),
    ((5, 4), (5, 5)),
    ((4, 7), (4, 5)),
    ((5, 5), (4, 6)),
];

#[test]
fn en_passant_capture_removes_the_passed_pawn() {
    let mut g = classical();
    play(&mut g, &EN_PASSANT_LINE);

    let last = *g.moves().last().unwrap();
    assert!(matches!(last.special, Some(MoveSpecial::EnPassant { victim, .. }) if victim == c(4, 5)));
    assert_eq!(last.captured, Some(PieceType::new(Pawn, Black)));
    assert_eq!(g.board().count(PieceType::new(Pawn, Black)), 7);
    assert_eq!(g.board().piece_at(c(4, 5)), None);
    assert_eq!(g.board().piece_at(c(4, 6)), Some(PieceType::new(Pawn, White)));
    assert_eq!(g.turn(), Black);
    assert_eq!(g.full_move(), 3);
    assert_eq!(g.move_rule_ply(), 0);
}

#[test]
fn undo_and_redo_restore_every_detail() {
    let mut g = classical();
    let before = g.board().snapshot();
    let rights_before = g.special_rights().clone();

    play(&mut g, &EN_PASSANT_LINE);
    let after = g.board().snapshot();

    for _ in 0..EN_PASSANT_LINE.len() {
        g.undo_move().unwrap();
    }
    assert!(matches!(g.undo_move(), Err(GameError::NothingToUndo)));
    assert_eq!(g.board().snapshot(), before);
    assert_eq!(g.special_rights(), &rights_before);
    assert_eq!(g.turn(), White);
    assert_eq!(g.move_index(), -1);
    assert!(g.en_passant().is_empty());

    for _ in 0..EN_PASSANT_LINE.len() {
        g.redo_move().unwrap();
    }
    assert!(matches!(g.redo_move(), Err(GameError::NothingToRedo)));
    assert_eq!(g.board().snapshot(), after);
    assert_eq!(g.moves().len(), EN_PASSANT_LINE.len());
}

#[test]
fn a_new_move_after_undo_drops_the_redo_tail() {
    let mut g = classical();
    play(&mut g, &EN_PASSANT_LINE[..4]);
    g.undo_move().unwrap();
    play(&mut g, &[((4, 7), (4, 6))]);
    assert!(g.en_passant().is_empty());
    assert!(matches!(g.redo_move(), Err(GameError::NothingToRedo)));
    assert_eq!(g.moves().len(), 4);
}

#[test]
fn moves_are_checked_before_anything_changes() {
    let mut g = classical();
    assert!(matches!(
        g.make_move(MoveDraft::new(c(4, 4), c(4, 5))),
        Err(GameError::NoPiece(_))
    ));
    assert!(matches!(
        g.make_move(MoveDraft::new(c(5, 7), c(5, 5))),
        Err(GameError::WrongTurn { .. })
    ));
    assert!(matches!(
        g.make_move(MoveDraft::new(c(5, 2), c(5, 5))),
        Err(GameError::IllegalMove { .. })
    ));
    assert!(matches!(
        g.make_move(MoveDraft::new(c(5, 2), c(5, 3)).promoting(PieceType::new(Queen, White))),
        Err(GameError::InvalidPromotion { .. })
    ));
    assert_eq!(g.move_index(), -1);
    assert_eq!(g.board().piece_count(), 32);
}

#[test]
fn resignation_ends_the_game() {
    let mut g = classical();
    g.resign(White).unwrap();
    assert_eq!(
        g.conclusion(),
        Some(&Conclusion::win(Black, Termination::Resignation))
    );
    assert!(matches!(
        g.make_move(MoveDraft::new(c(5, 2), c(5, 4))),
        Err(GameError::GameOver)
    ));
    assert!(matches!(g.resign(Black), Err(GameError::GameOver)));
}

#[test]
fn draw_offers_follow_the_turn() {
    let mut g = classical();
    assert!(g.offer_draw(Black).is_err(), "not black's turn");
    g.offer_draw(White).unwrap();
    assert!(g.offer_draw(White).is_err(), "already open");
    assert!(g.accept_draw(White).is_err(), "own offer");

    // The offer stands through the offerer's own move and lapses when the opponent moves.
    play(&mut g, &[((5, 2), (5, 4))]);
    assert_eq!(g.draw_offer().map(|o| o.by), Some(White));
    play(&mut g, &[((5, 7), (5, 5))]);
    assert_eq!(g.draw_offer(), None);

    g.offer_draw(White).unwrap();
    g.decline_draw().unwrap();
    assert!(g.decline_draw().is_err());

    g.offer_draw(White).unwrap();
    g.accept_draw(Black).unwrap();
    assert_eq!(
        g.conclusion(),
        Some(&Conclusion::draw(Termination::Agreement))
    );
}

#[test]
fn random_games_only_play_legal_moves() {
    use infinite_rules::bot::RandomBot;

    for name in variants::NAMES {
        let mut g =
            GameState::from_variant(name, Metadata::default(), EngineConfig::default()).unwrap();
        let mut bot = RandomBot::new(11);
        for _ in 0..60 {
            let Some(draft) = bot.pick(&g) else {
                break;
            };
            g.make_move(draft).unwrap();
        }
        let lf = g.to_long_format();
        let replayed = GameState::from_long_format(&lf, EngineConfig::default()).unwrap();
        assert_eq!(replayed.board().snapshot(), g.board().snapshot(), "{name}");
        assert_eq!(replayed.conclusion(), g.conclusion(), "{name}");
    }
}

#[test]
fn an_unseeded_bot_still_plays_legal_moves() {
    use infinite_rules::bot::RandomBot;

    let mut g = classical();
    let mut bot = RandomBot::from_entropy();
    for _ in 0..10 {
        let Some(draft) = bot.pick(&g) else {
            assert!(g.conclusion().is_some());
            break;
        };
        let piece = g.board().piece_at(draft.start).unwrap();
        assert_eq!(piece.color, g.turn());
        g.make_move(draft).unwrap();
    }
    assert!(!g.moves().is_empty());
}
