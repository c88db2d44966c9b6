//! Check-aware filtering of pseudo-legal moves.
//!
//! Discrete destinations are tried on an [`Overlay`]. Slide rays can be unbounded, so they are
//! instead intersected with the squares that resolve every attack on the mover's royals once the
//! mover has left its square: the attacker's own square for jumpers, or the segment between royal
//! and slider. Line intersections are solved exactly in `i128`.

use crate::board::overlay::Overlay;
use crate::board::Occupancy;
use crate::core::coord::{step_multiple, Coord};
use crate::core::piece::Piece;

use super::attacks::{attackers_of, is_attacked, AttackVia, Attacker};
use super::movegen::{pseudo_moves, Destination, PieceMoves, SlideRay, SpecialFlag};
use super::ruleset::MoveContext;

/// Legal moves of `piece`: pseudo-legal moves, minus those leaving a royal attacked when checks
/// are enforced.
pub fn legal_moves(ctx: &MoveContext<'_>, piece: Piece) -> PieceMoves {
    let moves = pseudo_moves(ctx, piece);
    if !ctx.enforce_checks {
        return moves;
    }
    let royals: Vec<Coord> = ctx
        .board
        .royals(piece.ty.color)
        .into_iter()
        .map(|p| p.coords)
        .collect();
    if royals.is_empty() {
        return moves;
    }

    let mut out = PieceMoves::default();
    for d in moves.individual {
        if is_safe(ctx, piece, d, &royals) {
            out.individual.push(d);
        }
    }

    if piece.ty.kind.is_royal() {
        if !moves.slides.is_empty() {
            tracing::debug!(piece = %piece.ty, "sliding royal under checkmate rules, slides dropped");
        }
        return out;
    }

    let mut vacated = Overlay::new(ctx.board);
    vacated.vacate(piece.coords);
    let threats: Vec<(Coord, Attacker)> = royals
        .iter()
        .flat_map(|&r| {
            attackers_of(ctx.ruleset, &vacated, r, piece.ty.color, false)
                .into_iter()
                .map(move |a| (r, a))
        })
        .collect();

    for ray in moves.slides {
        let mut set = Resolve::Interval(ray.min, ray.max);
        for (royal, attacker) in &threats {
            set = set.intersect(resolving_multiples(piece.coords, ray.step, *royal, attacker));
        }
        match set {
            Resolve::Interval(min, max) => {
                let r = SlideRay {
                    step: ray.step,
                    min,
                    max,
                };
                if !r.is_empty() {
                    out.slides.push(r);
                }
            }
            Resolve::Point(k) if k != 0 => {
                let d = Destination::plain(piece.coords + ray.step * k);
                if is_safe(ctx, piece, d, &royals) {
                    out.individual.push(d);
                }
            }
            _ => {}
        }
    }
    out
}

/// Whether playing `d` leaves every royal of the mover unattacked.
pub fn is_safe(ctx: &MoveContext<'_>, piece: Piece, d: Destination, royals: &[Coord]) -> bool {
    let mut o = Overlay::with_move(ctx.board, piece.ty, piece.coords, d.coords);
    match d.special {
        Some(SpecialFlag::EnPassant { victim }) => o.vacate(victim),
        Some(SpecialFlag::Castle { rook }) => {
            if let Some(rook_ty) = ctx.board.piece_at(rook) {
                let dir = Coord::new((d.coords.x - piece.coords.x).signum(), 0);
                o.vacate(rook);
                o.place(piece.coords + dir, rook_ty);
            }
        }
        _ => {}
    }
    royals.iter().all(|&r| {
        let r = if r == piece.coords { d.coords } else { r };
        !is_attacked(ctx.ruleset, &o, r, piece.ty.color)
    })
}

/// Step multiples along a ray that survive a set of constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolve {
    Interval(Option<i64>, Option<i64>),
    Point(i64),
    Empty,
}

impl Resolve {
    fn contains(self, k: i64) -> bool {
        match self {
            Resolve::Interval(lo, hi) => lo.map_or(true, |l| k >= l) && hi.map_or(true, |h| k <= h),
            Resolve::Point(p) => p == k,
            Resolve::Empty => false,
        }
    }

    fn intersect(self, other: Resolve) -> Resolve {
        match (self, other) {
            (Resolve::Empty, _) | (_, Resolve::Empty) => Resolve::Empty,
            (Resolve::Point(k), o) | (o, Resolve::Point(k)) => {
                if o.contains(k) {
                    Resolve::Point(k)
                } else {
                    Resolve::Empty
                }
            }
            (Resolve::Interval(a, b), Resolve::Interval(c, d)) => {
                let lo = match (a, c) {
                    (Some(a), Some(c)) => Some(a.max(c)),
                    (a, c) => a.or(c),
                };
                let hi = match (b, d) {
                    (Some(b), Some(d)) => Some(b.min(d)),
                    (b, d) => b.or(d),
                };
                match (lo, hi) {
                    (Some(l), Some(h)) if l > h => Resolve::Empty,
                    _ => Resolve::Interval(lo, hi),
                }
            }
        }
    }
}

fn div_floor(a: i128, b: i128) -> i128 {
    let q = a / b;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

fn div_ceil(a: i128, b: i128) -> i128 {
    -div_floor(-a, b)
}

fn clamp_i64(v: i128) -> i64 {
    v.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Multiples `k` with `from + k·step` capturing `attacker` or blocking its line to `royal`.
fn resolving_multiples(from: Coord, step: Coord, royal: Coord, attacker: &Attacker) -> Resolve {
    match attacker.via {
        AttackVia::Jump | AttackVia::Pawn => match step_multiple(from, attacker.coords, step) {
            Some(k) => Resolve::Point(k),
            None => Resolve::Empty,
        },
        AttackVia::Slide { step: u, distance: n } => {
            if step.is_parallel(u) {
                // Same line family: resolving squares are `royal + b·u`, `1 <= b <= n`.
                let (Some(b_from), Some(m)) =
                    (step_multiple(royal, from, u), step_multiple(Coord::ORIGIN, step, u))
                else {
                    return Resolve::Empty;
                };
                // from + k·step = royal + (b_from + k·m)·u
                let (b_from, m, n) = (b_from as i128, m as i128, n as i128);
                let (lo, hi) = if m > 0 {
                    (div_ceil(1 - b_from, m), div_floor(n - b_from, m))
                } else {
                    (div_ceil(n - b_from, m), div_floor(1 - b_from, m))
                };
                if lo > hi {
                    Resolve::Empty
                } else {
                    Resolve::Interval(Some(clamp_i64(lo)), Some(clamp_i64(hi)))
                }
            } else {
                // from + k·step = royal + b·u, solved by Cramer's rule.
                let d = royal - from;
                let den = step.cross(u);
                let k_num = d.cross(u);
                let b_num = d.cross(step);
                if k_num % den != 0 || b_num % den != 0 {
                    return Resolve::Empty;
                }
                let (k, b) = (k_num / den, b_num / den);
                if b < 1 || b > n as i128 {
                    return Resolve::Empty;
                }
                Resolve::Point(clamp_i64(k))
            }
        }
    }
}
