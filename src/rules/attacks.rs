//! Attack detection.
//!
//! Jump threats come from the ruleset's vicinity table (offset → kinds that could capture from
//! there), pawn threats from each hostile color's forward vector, and slide threats from the
//! nearest blocker along every registered slide step.

use crate::board::{Board, Occupancy, Sense};
use crate::core::coord::{step_multiple, Coord};
use crate::core::piece::{Color, PieceKind, PieceType};

use super::ruleset::Ruleset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttackVia {
    Jump,
    Pawn,
    /// Along `step` (pointing from the target to the attacker), `distance` steps away.
    Slide { step: Coord, distance: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Attacker {
    pub coords: Coord,
    pub ty: PieceType,
    pub via: AttackVia,
}

/// Pieces hostile to `defender` that could capture on `target`. Stops at the first one when
/// `first_only` is set.
pub fn attackers_of<O: Occupancy + ?Sized>(
    ruleset: &Ruleset,
    occ: &O,
    target: Coord,
    defender: Color,
    first_only: bool,
) -> Vec<Attacker> {
    let mut out = Vec::new();

    for (&offset, kinds) in ruleset.vicinity() {
        let at = target + offset;
        if let Some(ty) = occ.piece_at(at) {
            if ty.is_hostile_to(defender) && kinds.contains(&ty.kind) {
                out.push(Attacker {
                    coords: at,
                    ty,
                    via: AttackVia::Jump,
                });
                if first_only {
                    return out;
                }
            }
        }
    }

    if ruleset.kinds().contains(&PieceKind::Pawn) {
        for color in ruleset.rules.colors() {
            if color == defender {
                continue;
            }
            let Some(forward) = color.forward() else {
                continue;
            };
            let side = forward.perpendicular();
            for at in [target - forward + side, target - forward - side] {
                if occ.piece_at(at) == Some(PieceType::new(PieceKind::Pawn, color)) {
                    out.push(Attacker {
                        coords: at,
                        ty: PieceType::new(PieceKind::Pawn, color),
                        via: AttackVia::Pawn,
                    });
                    if first_only {
                        return out;
                    }
                }
            }
        }
    }

    for &step in ruleset.slide_steps() {
        for sense in Sense::BOTH {
            let Some((at, ty)) = occ.nearest_along_line(step, target, sense) else {
                continue;
            };
            if !ty.is_hostile_to(defender) || !ruleset.moveset(ty.kind).has_slide(step) {
                continue;
            }
            let dir = step * sense.sign();
            let Some(distance) = step_multiple(target, at, dir) else {
                continue;
            };
            if !ruleset.within_slide_limit(distance) {
                continue;
            }
            out.push(Attacker {
                coords: at,
                ty,
                via: AttackVia::Slide {
                    step: dir,
                    distance,
                },
            });
            if first_only {
                return out;
            }
        }
    }
    out
}

#[inline]
pub fn is_attacked<O: Occupancy + ?Sized>(
    ruleset: &Ruleset,
    occ: &O,
    target: Coord,
    defender: Color,
) -> bool {
    !attackers_of(ruleset, occ, target, defender, true).is_empty()
}

/// Every attacker of every royal of `color` on the live board.
pub fn royal_attackers(ruleset: &Ruleset, board: &Board, color: Color) -> Vec<Attacker> {
    board
        .royals(color)
        .into_iter()
        .flat_map(|r| attackers_of(ruleset, board, r.coords, color, false))
        .collect()
}

pub fn in_check(ruleset: &Ruleset, board: &Board, color: Color) -> bool {
    board
        .royals(color)
        .iter()
        .any(|r| is_attacked(ruleset, board, r.coords, color))
}
