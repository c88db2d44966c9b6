use crate::board::{Board, Occupancy, Sense};
use crate::core::coord::{step_multiple, Coord};
use crate::core::piece::PieceType;

/// A hypothetical position: a [`Board`] with some squares vacated and others filled.
///
/// Used to test whether a candidate move leaves a royal attacked without touching the board.
#[derive(Debug, Clone)]
pub struct Overlay<'a> {
    base: &'a Board,
    removed: Vec<Coord>,
    added: Vec<(Coord, PieceType)>,
}

impl<'a> Overlay<'a> {
    pub fn new(base: &'a Board) -> Self {
        Self {
            base,
            removed: Vec::new(),
            added: Vec::new(),
        }
    }

    /// Overlay of `ty` moving `from` → `to`, capturing whatever stood on `to`.
    pub fn with_move(base: &'a Board, ty: PieceType, from: Coord, to: Coord) -> Self {
        let mut o = Self::new(base);
        o.vacate(from);
        o.place(to, ty);
        o
    }

    pub fn vacate(&mut self, c: Coord) {
        self.added.retain(|&(a, _)| a != c);
        if !self.removed.contains(&c) {
            self.removed.push(c);
        }
    }

    pub fn place(&mut self, c: Coord, ty: PieceType) {
        self.added.retain(|&(a, _)| a != c);
        self.added.push((c, ty));
    }

    pub fn base(&self) -> &'a Board {
        self.base
    }
}

impl Occupancy for Overlay<'_> {
    fn piece_at(&self, c: Coord) -> Option<PieceType> {
        if let Some(&(_, ty)) = self.added.iter().find(|&&(a, _)| a == c) {
            return Some(ty);
        }
        if self.removed.contains(&c) {
            return None;
        }
        self.base.piece_at(c)
    }

    fn nearest_along_line(
        &self,
        step: Coord,
        from: Coord,
        sense: Sense,
    ) -> Option<(Coord, PieceType)> {
        let dir = step * sense.sign();

        let mut cursor = from;
        let base_hit = loop {
            match self.base.nearest_along_line(step, cursor, sense) {
                Some((c, _)) if self.removed.contains(&c) => cursor = c,
                other => break other,
            }
        };
        let mut best = base_hit.and_then(|(c, ty)| step_multiple(from, c, dir).map(|k| (k, c, ty)));

        for &(c, ty) in &self.added {
            let Some(k) = step_multiple(from, c, dir) else {
                continue;
            };
            if k > 0 && best.map_or(true, |(bk, _, _)| k < bk) {
                best = Some((k, c, ty));
            }
        }
        // An added square shadows whatever the base had there.
        best.map(|(_, c, ty)| {
            let ty = self
                .added
                .iter()
                .find(|&&(a, _)| a == c)
                .map_or(ty, |&(_, t)| t);
            (c, ty)
        })
    }
}
