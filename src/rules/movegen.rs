//! Pseudo-legal move generation.
//!
//! Jumps are checked square by square against the point index. Slides never walk the board: the
//! nearest blocker in each sense comes from the line buckets, so a ray's cost does not depend on
//! how far it reaches. Unbounded rays are kept symbolic as [`SlideRay`]s.

use crate::board::{Occupancy, Sense};
use crate::core::coord::{step_multiple, BoundingBox, Coord};
use crate::core::piece::Piece;

use super::ruleset::{MoveContext, Ruleset};

/// Extra action attached to a destination square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialFlag {
    /// King castles with the partner on `rook`.
    Castle { rook: Coord },
    /// Captures the pawn on `victim`.
    EnPassant { victim: Coord },
    DoublePush,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Destination {
    pub coords: Coord,
    pub special: Option<SpecialFlag>,
    /// Lands on a promotion rank.
    pub promotes: bool,
}

impl Destination {
    #[inline]
    pub fn plain(coords: Coord) -> Self {
        Self {
            coords,
            special: None,
            promotes: false,
        }
    }
}

/// Squares `from + k·step` for `k` in `[min, max]`, `k != 0`. `None` bounds are unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlideRay {
    pub step: Coord,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl SlideRay {
    #[inline]
    pub fn contains(&self, k: i64) -> bool {
        k != 0 && self.min.map_or(true, |m| k >= m) && self.max.map_or(true, |m| k <= m)
    }

    pub fn is_empty(&self) -> bool {
        let lo = self.min.unwrap_or(i64::MIN);
        let hi = self.max.unwrap_or(i64::MAX);
        lo > hi || (lo == 0 && hi == 0)
    }

    /// Multiples of `step` from `from` that stay inside `bbox` and on the ray.
    pub fn multiples_within(&self, from: Coord, bbox: &BoundingBox) -> Option<(i64, i64)> {
        let (mut lo, mut hi) = (self.min.unwrap_or(i64::MIN), self.max.unwrap_or(i64::MAX));
        for (f, s, a, b) in [
            (from.x, self.step.x, bbox.left, bbox.right),
            (from.y, self.step.y, bbox.bottom, bbox.top),
        ] {
            if s == 0 {
                if f < a || f > b {
                    return None;
                }
                continue;
            }
            let (k1, k2) = if s > 0 {
                (div_ceil(a - f, s), div_floor(b - f, s))
            } else {
                (div_ceil(b - f, s), div_floor(a - f, s))
            };
            lo = lo.max(k1);
            hi = hi.min(k2);
        }
        (lo <= hi).then_some((lo, hi))
    }
}

#[inline]
fn div_floor(a: i64, b: i64) -> i64 {
    let q = a / b;
    if (a % b != 0) && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

#[inline]
fn div_ceil(a: i64, b: i64) -> i64 {
    -div_floor(-a, b)
}

/// Candidate destinations of one piece.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PieceMoves {
    pub individual: Vec<Destination>,
    pub slides: Vec<SlideRay>,
}

impl PieceMoves {
    pub fn is_empty(&self) -> bool {
        self.individual.is_empty() && self.slides.iter().all(SlideRay::is_empty)
    }

    pub fn contains(&self, from: Coord, to: Coord) -> bool {
        self.destination_for(from, to).is_some()
    }

    /// How `to` is reached from `from`, if it is.
    pub fn destination_for(&self, from: Coord, to: Coord) -> Option<Destination> {
        if let Some(d) = self.individual.iter().find(|d| d.coords == to) {
            return Some(*d);
        }
        self.slides
            .iter()
            .any(|r| step_multiple(from, to, r.step).is_some_and(|k| r.contains(k)))
            .then(|| Destination::plain(to))
    }

    /// Every destination inside `bbox`, slides enumerated square by square.
    pub fn expand_within(&self, from: Coord, bbox: &BoundingBox) -> Vec<Destination> {
        let mut out: Vec<Destination> = self
            .individual
            .iter()
            .filter(|d| bbox.contains(d.coords))
            .copied()
            .collect();
        for ray in &self.slides {
            let Some((lo, hi)) = ray.multiples_within(from, bbox) else {
                continue;
            };
            for k in lo..=hi {
                if k == 0 {
                    continue;
                }
                let c = from + ray.step * k;
                if !out.iter().any(|d| d.coords == c) {
                    out.push(Destination::plain(c));
                }
            }
        }
        out
    }
}

/// Jumps and slides of `piece` on `occ`, without special moves.
pub fn basic_moves<O: Occupancy + ?Sized>(ruleset: &Ruleset, occ: &O, piece: Piece) -> PieceMoves {
    let moveset = ruleset.moveset(piece.ty.kind);
    let color = piece.ty.color;
    let mut out = PieceMoves::default();

    for &j in &moveset.jumps {
        let to = piece.coords + j;
        match occ.piece_at(to) {
            Some(t) if !t.capturable_by(color) => {}
            _ => out.individual.push(Destination::plain(to)),
        }
    }

    for &step in &moveset.slides {
        let mut bounds = [None; 2];
        for (i, sense) in Sense::BOTH.into_iter().enumerate() {
            let mut reach = occ
                .nearest_along_line(step, piece.coords, sense)
                .and_then(|(c, t)| {
                    let k = step_multiple(piece.coords, c, step * sense.sign())?;
                    Some(if t.capturable_by(color) { k } else { k - 1 })
                });
            if let Some(limit) = ruleset.slide_limit() {
                let limit = i64::try_from(limit).unwrap_or(i64::MAX);
                reach = Some(reach.map_or(limit, |r| r.min(limit)));
            }
            bounds[i] = reach;
        }
        out.slides.push(SlideRay {
            step,
            min: bounds[1].map(|b| -b),
            max: bounds[0],
        });
    }
    out
}

/// Pseudo-legal moves of `piece` on the live board, special moves included.
pub fn pseudo_moves(ctx: &MoveContext<'_>, piece: Piece) -> PieceMoves {
    let mut out = basic_moves(ctx.ruleset, ctx.board, piece);
    if let Some(handler) = ctx.ruleset.special(piece.ty.kind) {
        handler(ctx, piece, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_clipping_to_box() {
        let ray = SlideRay {
            step: Coord::new(1, -1),
            min: None,
            max: Some(3),
        };
        let bbox = BoundingBox {
            left: -2,
            right: 10,
            bottom: -10,
            top: 4,
        };
        assert_eq!(ray.multiples_within(Coord::new(0, 0), &bbox), Some((-2, 3)));
        assert!(ray.contains(-100));
        assert!(!ray.contains(0));
        assert!(!ray.contains(4));
    }

    #[test]
    fn blocked_both_ways_is_empty() {
        let ray = SlideRay {
            step: Coord::new(0, 1),
            min: Some(0),
            max: Some(0),
        };
        assert!(ray.is_empty());
        assert_eq!(div_floor(-3, 2), -2);
        assert_eq!(div_ceil(-3, 2), -1);
        assert_eq!(div_ceil(3, -2), -1);
    }
}
