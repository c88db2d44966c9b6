//! Static movesets: jump offsets, slide line families and special-move tags per piece kind.

use crate::core::coord::{Coord, KING_STEPS};
use crate::core::piece::PieceKind;

/// Line families of the rook. Each family is walked in both senses.
pub const ORTHOGONAL_STEPS: [Coord; 2] = [Coord { x: 1, y: 0 }, Coord { x: 0, y: 1 }];

pub const DIAGONAL_STEPS: [Coord; 2] = [Coord { x: 1, y: 1 }, Coord { x: 1, y: -1 }];

pub const KNIGHTRIDER_STEPS: [Coord; 4] = [
    Coord { x: 1, y: 2 },
    Coord { x: 1, y: -2 },
    Coord { x: 2, y: 1 },
    Coord { x: 2, y: -1 },
];

pub const KNIGHT_DELTAS: [Coord; 8] = [
    Coord { x: -2, y: -1 },
    Coord { x: -2, y: 1 },
    Coord { x: -1, y: -2 },
    Coord { x: -1, y: 2 },
    Coord { x: 1, y: -2 },
    Coord { x: 1, y: 2 },
    Coord { x: 2, y: -1 },
    Coord { x: 2, y: 1 },
];

pub const HAWK_DELTAS: [Coord; 16] = [
    Coord { x: -3, y: -3 },
    Coord { x: -3, y: 0 },
    Coord { x: -3, y: 3 },
    Coord { x: -2, y: -2 },
    Coord { x: -2, y: 0 },
    Coord { x: -2, y: 2 },
    Coord { x: 0, y: -3 },
    Coord { x: 0, y: -2 },
    Coord { x: 0, y: 2 },
    Coord { x: 0, y: 3 },
    Coord { x: 2, y: -2 },
    Coord { x: 2, y: 0 },
    Coord { x: 2, y: 2 },
    Coord { x: 3, y: -3 },
    Coord { x: 3, y: 0 },
    Coord { x: 3, y: 3 },
];

/// Special-move capability of a kind, resolved to a handler per ruleset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialTag {
    Castling,
    Pawn,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Moveset {
    /// Offsets reachable in one jump, sorted and deduplicated.
    pub jumps: Vec<Coord>,
    /// Normalized slide steps; each is walked in both senses.
    pub slides: Vec<Coord>,
    pub special: Option<SpecialTag>,
}

impl Moveset {
    /// A custom moveset. Slide steps keep their length, so `(2, 2)` only reaches every other
    /// diagonal square; zero offsets are dropped.
    pub fn new(
        jumps: impl IntoIterator<Item = Coord>,
        slides: impl IntoIterator<Item = Coord>,
        special: Option<SpecialTag>,
    ) -> Self {
        let mut j: Vec<Coord> = jumps.into_iter().filter(|&c| c != Coord::ORIGIN).collect();
        j.sort();
        j.dedup();
        let mut s: Vec<Coord> = slides
            .into_iter()
            .filter(|&c| c != Coord::ORIGIN)
            .map(Coord::normalized_step)
            .collect();
        s.sort();
        s.dedup();
        Self {
            jumps: j,
            slides: s,
            special,
        }
    }

    fn build(jumps: &[&[Coord]], slides: &[&[Coord]], special: Option<SpecialTag>) -> Self {
        Self::new(
            jumps.iter().flat_map(|s| s.iter().copied()),
            slides.iter().flat_map(|s| s.iter().copied()),
            special,
        )
    }

    /// Moveset of `kind`. Pawn movement lives entirely in its special handler.
    pub fn of(kind: PieceKind) -> Moveset {
        use PieceKind::*;
        let camel = leaper(1, 3);
        let giraffe = leaper(1, 4);
        let zebra = leaper(2, 3);
        match kind {
            King => Self::build(&[&KING_STEPS], &[], Some(SpecialTag::Castling)),
            Guard => Self::build(&[&KING_STEPS], &[], None),
            Knight => Self::build(&[&KNIGHT_DELTAS], &[], None),
            Camel => Self::build(&[&camel], &[], None),
            Giraffe => Self::build(&[&giraffe], &[], None),
            Zebra => Self::build(&[&zebra], &[], None),
            Hawk => Self::build(&[&HAWK_DELTAS], &[], None),
            Knightrider => Self::build(&[], &[&KNIGHTRIDER_STEPS], None),
            Rook => Self::build(&[], &[&ORTHOGONAL_STEPS], None),
            Bishop => Self::build(&[], &[&DIAGONAL_STEPS], None),
            Queen | RoyalQueen => Self::build(&[], &[&ORTHOGONAL_STEPS, &DIAGONAL_STEPS], None),
            Chancellor => Self::build(&[&KNIGHT_DELTAS], &[&ORTHOGONAL_STEPS], None),
            Archbishop => Self::build(&[&KNIGHT_DELTAS], &[&DIAGONAL_STEPS], None),
            Amazon => Self::build(
                &[&KNIGHT_DELTAS],
                &[&ORTHOGONAL_STEPS, &DIAGONAL_STEPS],
                None,
            ),
            Centaur => Self::build(&[&KING_STEPS, &KNIGHT_DELTAS], &[], None),
            RoyalCentaur => Self::build(
                &[&KING_STEPS, &KNIGHT_DELTAS],
                &[],
                Some(SpecialTag::Castling),
            ),
            Pawn => Self::build(&[], &[], Some(SpecialTag::Pawn)),
            Obstacle | Void => Moveset::default(),
        }
    }

    #[inline]
    pub fn has_slide(&self, step: Coord) -> bool {
        self.slides.contains(&step.normalized_step())
    }

    #[inline]
    pub fn has_jump(&self, offset: Coord) -> bool {
        self.jumps.binary_search(&offset).is_ok()
    }

    #[inline]
    pub fn is_jump_only(&self) -> bool {
        self.slides.is_empty()
    }
}

/// The 8 (or 4 when `m == n`) offsets of an `(m, n)` leaper.
pub fn leaper(m: i64, n: i64) -> Vec<Coord> {
    let mut out = Vec::with_capacity(8);
    for (a, b) in [(m, n), (n, m)] {
        for sx in [-1, 1] {
            for sy in [-1, 1] {
                let c = Coord::new(a * sx, b * sy);
                if !out.contains(&c) {
                    out.push(c);
                }
            }
        }
    }
    out
}

/// True if two distinct slide steps lie on a common line family, e.g. `(1, 1)` and `(2, 2)`.
pub fn has_colinear_steps(steps: &[Coord]) -> bool {
    steps.iter().enumerate().any(|(i, a)| {
        steps[i + 1..]
            .iter()
            .any(|b| a.normalized_step() != b.normalized_step() && a.is_parallel(*b))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compound_pieces_union_their_parts() {
        let amazon = Moveset::of(PieceKind::Amazon);
        assert_eq!(amazon.jumps.len(), 8);
        assert_eq!(amazon.slides.len(), 4);
        assert!(amazon.has_slide(Coord::new(-1, 1)));
        assert_eq!(Moveset::of(PieceKind::Hawk).jumps.len(), 16);
        assert_eq!(Moveset::of(PieceKind::Centaur).jumps.len(), 16);
        assert_eq!(leaper(2, 2).len(), 4);
    }

    #[test]
    fn custom_movesets_keep_step_length() {
        let m = Moveset::new([Coord::new(0, 0)], [Coord::new(-2, -2), Coord::new(1, 1)], None);
        assert!(m.jumps.is_empty());
        assert_eq!(m.slides, vec![Coord::new(1, 1), Coord::new(2, 2)]);
        assert!(has_colinear_steps(&m.slides));
    }

    #[test]
    fn colinear_detection() {
        assert!(!has_colinear_steps(&[Coord::new(1, 0), Coord::new(1, 2)]));
        assert!(has_colinear_steps(&[Coord::new(1, 1), Coord::new(-2, -2)]));
        assert!(!has_colinear_steps(&[Coord::new(1, 1), Coord::new(-1, -1)]));
    }
}
