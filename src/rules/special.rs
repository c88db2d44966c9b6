//! Special-move handlers: castling and pawn moves (pushes, captures, en passant, promotion).
//!
//! Handlers are looked up per kind through [`Ruleset::special`](super::ruleset::Ruleset::special)
//! and append flagged destinations to the kind's ordinary candidates.

use crate::board::overlay::Overlay;
use crate::board::{Occupancy, Sense};
use crate::core::coord::Coord;
use crate::core::piece::{Piece, PieceKind};

use super::attacks::is_attacked;
use super::movegen::{Destination, PieceMoves, SpecialFlag};
use super::ruleset::MoveContext;

const ROW: Coord = Coord { x: 1, y: 0 };

/// Minimum distance between a castling king and its partner.
const CASTLE_MIN_DISTANCE: i64 = 3;

pub fn castling(ctx: &MoveContext<'_>, piece: Piece, out: &mut PieceMoves) {
    let from = piece.coords;
    if !ctx.special_rights.contains(&from) {
        return;
    }
    if ctx.enforce_checks && is_attacked(ctx.ruleset, ctx.board, from, piece.ty.color) {
        return;
    }

    for sense in Sense::BOTH {
        let Some((partner, ty)) = ctx.board.nearest_along_line(ROW, from, sense) else {
            continue;
        };
        if !ctx.special_rights.contains(&partner)
            || ty.color != piece.ty.color
            || ty.kind == PieceKind::Pawn
            || (partner.x - from.x).abs() < CASTLE_MIN_DISTANCE
        {
            continue;
        }
        let dir = ROW * sense.sign();
        let transit = from + dir;
        if ctx.enforce_checks {
            let o = Overlay::with_move(ctx.board, piece.ty, from, transit);
            if is_attacked(ctx.ruleset, &o, transit, piece.ty.color) {
                continue;
            }
        }
        out.individual.push(Destination {
            coords: from + dir * 2,
            special: Some(SpecialFlag::Castle { rook: partner }),
            promotes: false,
        });
    }
}

pub fn pawn(ctx: &MoveContext<'_>, piece: Piece, out: &mut PieceMoves) {
    let color = piece.ty.color;
    let Some(forward) = color.forward() else {
        return;
    };
    let ranks = ctx.ruleset.rules.promotion_ranks_of(color);
    let promotes = |c: Coord| {
        let rank = if forward.x != 0 { c.x } else { c.y };
        ranks.contains(&rank)
    };
    let from = piece.coords;

    let one = from + forward;
    if ctx.board.is_empty_at(one) {
        out.individual.push(Destination {
            coords: one,
            special: None,
            promotes: promotes(one),
        });
        let two = one + forward;
        if ctx.special_rights.contains(&from) && ctx.board.is_empty_at(two) {
            out.individual.push(Destination {
                coords: two,
                special: Some(SpecialFlag::DoublePush),
                promotes: promotes(two),
            });
        }
    }

    let side = forward.perpendicular();
    for target in [one + side, one - side] {
        let entry = ctx
            .en_passant
            .iter()
            .find(|e| e.square == target && e.color != color);
        match ctx.board.piece_at(target) {
            Some(occupant) => {
                if let Some(e) = entry {
                    tracing::error!(
                        square = %e.square,
                        %occupant,
                        "en passant capture square is occupied"
                    );
                }
                if occupant.capturable_by(color) {
                    out.individual.push(Destination {
                        coords: target,
                        special: None,
                        promotes: promotes(target),
                    });
                }
            }
            None => {
                if let Some(e) = entry {
                    out.individual.push(Destination {
                        coords: target,
                        special: Some(SpecialFlag::EnPassant { victim: e.pawn }),
                        promotes: promotes(target),
                    });
                }
            }
        }
    }
}
