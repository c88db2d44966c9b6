use serde::{Deserialize, Serialize};

use crate::core::coord::Coord;
use crate::core::piece::{Color, PieceType};

/// A move as a caller requests it, before legality is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveDraft {
    pub start: Coord,
    pub end: Coord,
    pub promotion: Option<PieceType>,
}

impl MoveDraft {
    pub fn new(start: Coord, end: Coord) -> Self {
        Self {
            start,
            end,
            promotion: None,
        }
    }

    pub fn promoting(mut self, ty: PieceType) -> Self {
        self.promotion = Some(ty);
        self
    }
}

/// Extra board changes a move makes beyond moving one piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveSpecial {
    Castle {
        rook: PieceType,
        rook_start: Coord,
        rook_end: Coord,
    },
    EnPassant {
        victim: Coord,
        victim_ty: PieceType,
    },
    /// Pawn advanced two squares; `capture_square` is the square it passed.
    DoublePush { capture_square: Coord },
}

/// A committed move with everything needed to reverse it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub start: Coord,
    pub end: Coord,
    pub piece: PieceType,
    /// Piece removed by the move, on `end` or the en passant victim square.
    pub captured: Option<PieceType>,
    pub special: Option<MoveSpecial>,
    pub promotion: Option<PieceType>,
    /// Left at least one opponent in check.
    pub check: bool,
    /// Ended the game by checkmate.
    pub mate: bool,
}

impl Move {
    pub fn draft(&self) -> MoveDraft {
        MoveDraft {
            start: self.start,
            end: self.end,
            promotion: self.promotion,
        }
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }
}

/// An open en passant opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnPassant {
    /// Square a capturing pawn lands on.
    pub square: Coord,
    /// Square of the pawn that double-pushed.
    pub pawn: Coord,
    pub color: Color,
}
