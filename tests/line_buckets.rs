use std::collections::BTreeMap;

use infinite_rules::board::{Occupancy, Sense};
use infinite_rules::chess::moveset::{DIAGONAL_STEPS, KNIGHTRIDER_STEPS, ORTHOGONAL_STEPS};
use infinite_rules::core::coord::{step_multiple, Coord};
use infinite_rules::{Board, Color, PieceKind, PieceType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn all_steps() -> Vec<Coord> {
    ORTHOGONAL_STEPS
        .into_iter()
        .chain(DIAGONAL_STEPS)
        .chain(KNIGHTRIDER_STEPS)
        .collect()
}

fn random_position(rng: &mut StdRng, n: usize, span: i64) -> BTreeMap<Coord, PieceType> {
    let kinds = [PieceKind::Rook, PieceKind::Knight, PieceKind::Pawn, PieceKind::King];
    let mut out = BTreeMap::new();
    while out.len() < n {
        let c = Coord::new(rng.gen_range(-span..=span), rng.gen_range(-span..=span));
        let kind = kinds[rng.gen_range(0..kinds.len())];
        let color = if rng.gen_bool(0.5) { Color::White } else { Color::Black };
        out.insert(c, PieceType::new(kind, color));
    }
    out
}

/// Reference answer: look at every piece.
fn scan(
    pieces: &BTreeMap<Coord, PieceType>,
    step: Coord,
    from: Coord,
    sense: Sense,
) -> Option<(Coord, PieceType)> {
    let dir = step * sense.sign();
    pieces
        .iter()
        .filter_map(|(&c, &t)| step_multiple(from, c, dir).filter(|&k| k > 0).map(|k| (k, c, t)))
        .min_by_key(|&(k, _, _)| k)
        .map(|(_, c, t)| (c, t))
}

#[test]
fn every_piece_sits_in_one_sorted_bucket_per_family() {
    let mut rng = StdRng::seed_from_u64(7);
    let position = random_position(&mut rng, 60, 12);
    let board = Board::with_pieces(all_steps(), position.iter().map(|(&c, &t)| (c, t))).unwrap();

    for step in all_steps() {
        let mut total = 0;
        let mut seen = std::collections::BTreeSet::new();
        for &c in position.keys() {
            let bucket = board.lines().bucket(step, c).unwrap();
            assert!(bucket.contains(&c), "{c} missing from its {step} line");
            let axis = |p: &Coord| if step.x != 0 { p.x } else { p.y };
            assert!(bucket.windows(2).all(|w| axis(&w[0]) < axis(&w[1])));
            if seen.insert(bucket.to_vec()) {
                total += bucket.len();
            }
        }
        assert_eq!(total, position.len());
        assert_eq!(board.lines().line_count(step), seen.len());
    }
}

#[test]
fn nearest_matches_an_exhaustive_scan() {
    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..20 {
        let position = random_position(&mut rng, 40, 10);
        let board =
            Board::with_pieces(all_steps(), position.iter().map(|(&c, &t)| (c, t))).unwrap();
        for _ in 0..50 {
            let from = Coord::new(rng.gen_range(-12..=12), rng.gen_range(-12..=12));
            for step in all_steps() {
                for sense in Sense::BOTH {
                    assert_eq!(
                        board.nearest_along_line(step, from, sense),
                        scan(&position, step, from, sense),
                        "step {step} from {from} {sense:?}"
                    );
                }
            }
        }
    }
}

#[test]
fn nearest_stays_correct_through_moves_and_removals() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut position = random_position(&mut rng, 30, 8);
    let mut board =
        Board::with_pieces(all_steps(), position.iter().map(|(&c, &t)| (c, t))).unwrap();

    for _ in 0..40 {
        let coords: Vec<Coord> = position.keys().copied().collect();
        let c = coords[rng.gen_range(0..coords.len())];
        let ty = position[&c];
        if rng.gen_bool(0.5) {
            board.remove_piece(ty, c).unwrap();
            position.remove(&c);
        } else {
            let to = Coord::new(rng.gen_range(-8..=8), rng.gen_range(-8..=8));
            if position.contains_key(&to) {
                continue;
            }
            board.move_piece(ty, c, to).unwrap();
            position.remove(&c);
            position.insert(to, ty);
        }
        if position.is_empty() {
            break;
        }

        for step in all_steps() {
            for sense in Sense::BOTH {
                let from = Coord::new(rng.gen_range(-9..=9), rng.gen_range(-9..=9));
                assert_eq!(
                    board.nearest_along_line(step, from, sense),
                    scan(&position, step, from, sense)
                );
            }
        }
    }
    assert_eq!(board.snapshot(), position);
}

#[test]
fn unregistered_steps_fall_back_to_scanning() {
    let rook = PieceType::new(PieceKind::Rook, Color::White);
    let board = Board::with_pieces(
        ORTHOGONAL_STEPS,
        [(Coord::new(3, 9), rook), (Coord::new(6, 18), rook)],
    )
    .unwrap();
    assert_eq!(
        board.nearest_along_line(Coord::new(1, 3), Coord::new(0, 0), Sense::Forward),
        Some((Coord::new(3, 9), rook))
    );
    assert_eq!(
        board.nearest_along_line(Coord::new(1, 3), Coord::new(0, 0), Sense::Backward),
        None
    );
}

#[test]
fn far_coordinates_share_lines_with_near_ones() {
    let queen = PieceType::new(PieceKind::Queen, Color::Black);
    let far = 1_000_000_000_000i64;
    let board = Board::with_pieces(
        all_steps(),
        [(Coord::new(far, far), queen), (Coord::new(-far, 0), queen)],
    )
    .unwrap();
    assert_eq!(
        board.nearest_along_line(Coord::new(1, 1), Coord::ORIGIN, Sense::Forward),
        Some((Coord::new(far, far), queen))
    );
    assert_eq!(
        board.nearest_along_line(Coord::new(1, 0), Coord::ORIGIN, Sense::Backward),
        Some((Coord::new(-far, 0), queen))
    );
}
