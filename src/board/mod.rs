//! Piece storage: per-type [`PieceList`]s, a point index and line buckets, mutated in lockstep.
//!
//! Every query the move generator needs goes through the [`Occupancy`] trait, which the live
//! [`Board`] and the hypothetical [`overlay::Overlay`] both implement.

pub mod lines;
pub mod overlay;

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::core::coord::{step_multiple, BoundingBox, Coord};
use crate::core::piece::{Color, Piece, PieceType};
use crate::core::piece_list::PieceList;
use crate::error::BoardError;

pub use lines::{LineKey, LineOrganizer, Sense};

/// Read access to a (possibly hypothetical) position.
pub trait Occupancy {
    fn piece_at(&self, c: Coord) -> Option<PieceType>;

    /// Closest piece on the line of `step` through `from`, strictly past `from` in `sense`.
    fn nearest_along_line(&self, step: Coord, from: Coord, sense: Sense)
        -> Option<(Coord, PieceType)>;

    #[inline]
    fn is_empty_at(&self, c: Coord) -> bool {
        self.piece_at(c).is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Board {
    lists: BTreeMap<PieceType, PieceList>,
    index: FxHashMap<Coord, (PieceType, usize)>,
    lines: LineOrganizer,
    generation: u64,
}

impl Board {
    /// Empty board with a line family registered per step in `steps`.
    pub fn new(steps: impl IntoIterator<Item = Coord>) -> Self {
        Self {
            lines: LineOrganizer::new(steps),
            ..Self::default()
        }
    }

    pub fn with_pieces(
        steps: impl IntoIterator<Item = Coord>,
        pieces: impl IntoIterator<Item = (Coord, PieceType)>,
    ) -> Result<Self, BoardError> {
        let mut board = Self::new(steps);
        for (c, ty) in pieces {
            board.add_piece(ty, c)?;
        }
        Ok(board)
    }

    pub fn add_piece(&mut self, ty: PieceType, c: Coord) -> Result<usize, BoardError> {
        if self.index.contains_key(&c) {
            return Err(BoardError::Occupied(c));
        }
        let slot = self.lists.entry(ty).or_default().insert(c);
        self.index.insert(c, (ty, slot));
        self.lines.insert(c);
        self.generation += 1;
        Ok(slot)
    }

    /// Removes the `ty` piece on `c`, returning its freed slot. `None` if it is not there.
    pub fn remove_piece(&mut self, ty: PieceType, c: Coord) -> Option<usize> {
        let &(found, slot) = self.index.get(&c)?;
        if found != ty {
            return None;
        }
        self.lists.get_mut(&ty)?.remove_slot(slot)?;
        self.index.remove(&c);
        self.lines.remove(c);
        self.generation += 1;
        Some(slot)
    }

    /// Moves the `ty` piece from `from` to an empty `to`, keeping its slot.
    pub fn move_piece(&mut self, ty: PieceType, from: Coord, to: Coord) -> Result<usize, BoardError> {
        let not_found = BoardError::NotFound { ty, coords: from };
        let &(found, slot) = self.index.get(&from).ok_or_else(|| not_found.clone())?;
        if found != ty {
            return Err(not_found);
        }
        if from == to {
            return Ok(slot);
        }
        if self.index.contains_key(&to) {
            return Err(BoardError::Occupied(to));
        }
        let list = self.lists.get_mut(&ty).ok_or_else(|| not_found.clone())?;
        if !list.relocate_slot(slot, to) {
            return Err(not_found);
        }
        self.index.remove(&from);
        self.index.insert(to, (ty, slot));
        self.lines.remove(from);
        self.lines.insert(to);
        self.generation += 1;
        Ok(slot)
    }

    #[inline]
    pub fn piece_at(&self, c: Coord) -> Option<PieceType> {
        self.index.get(&c).map(|&(ty, _)| ty)
    }

    pub fn piece(&self, c: Coord) -> Option<Piece> {
        self.index.get(&c).map(|&(ty, index)| Piece {
            ty,
            coords: c,
            index,
        })
    }

    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        self.lists.iter().flat_map(|(&ty, list)| {
            list.iter().map(move |(index, coords)| Piece { ty, coords, index })
        })
    }

    pub fn pieces_of_color(&self, color: Color) -> impl Iterator<Item = Piece> + '_ {
        self.pieces().filter(move |p| p.ty.color == color)
    }

    pub fn list(&self, ty: PieceType) -> Option<&PieceList> {
        self.lists.get(&ty)
    }

    /// Live count per type, types with no live piece omitted.
    pub fn type_counts(&self) -> BTreeMap<PieceType, usize> {
        self.lists
            .iter()
            .map(|(&ty, list)| (ty, list.live_count()))
            .filter(|&(_, n)| n > 0)
            .collect()
    }

    #[inline]
    pub fn count(&self, ty: PieceType) -> usize {
        self.lists.get(&ty).map_or(0, PieceList::live_count)
    }

    pub fn count_color(&self, color: Color) -> usize {
        self.lists
            .iter()
            .filter(|(ty, _)| ty.color == color)
            .map(|(_, list)| list.live_count())
            .sum()
    }

    #[inline]
    pub fn piece_count(&self) -> usize {
        self.index.len()
    }

    pub fn royals(&self, color: Color) -> Vec<Piece> {
        self.pieces_of_color(color)
            .filter(|p| p.ty.kind.is_royal())
            .collect()
    }

    pub fn royal_count(&self, color: Color) -> usize {
        self.lists
            .iter()
            .filter(|(ty, _)| ty.color == color && ty.kind.is_royal())
            .map(|(_, list)| list.live_count())
            .sum()
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_coords(self.index.keys().copied())
    }

    /// Bumped on every mutation.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn lines(&self) -> &LineOrganizer {
        &self.lines
    }

    /// Squares and types, sorted by square.
    pub fn snapshot(&self) -> BTreeMap<Coord, PieceType> {
        self.index.iter().map(|(&c, &(ty, _))| (c, ty)).collect()
    }

    /// Fallback for steps without a line family: scans the point index.
    fn scan_along_line(&self, step: Coord, from: Coord, sense: Sense) -> Option<(Coord, PieceType)> {
        let dir = step * sense.sign();
        self.index
            .iter()
            .filter_map(|(&c, &(ty, _))| {
                step_multiple(from, c, dir)
                    .filter(|&k| k > 0)
                    .map(|k| (k, c, ty))
            })
            .min_by_key(|&(k, _, _)| k)
            .map(|(_, c, ty)| (c, ty))
    }
}

impl Occupancy for Board {
    #[inline]
    fn piece_at(&self, c: Coord) -> Option<PieceType> {
        Board::piece_at(self, c)
    }

    fn nearest_along_line(
        &self,
        step: Coord,
        from: Coord,
        sense: Sense,
    ) -> Option<(Coord, PieceType)> {
        match self.lines.nearest(step, from, sense) {
            Some(hit) => hit.and_then(|c| self.piece_at(c).map(|ty| (c, ty))),
            None => {
                tracing::trace!(%step, "no line family registered, scanning");
                self.scan_along_line(step, from, sense)
            }
        }
    }
}
