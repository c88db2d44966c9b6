use crate::core::coord::Coord;

/// Per-type piece storage whose slot indices never shift.
///
/// Removing a piece leaves a hole at its slot; the next insertion fills the lowest hole. External
/// consumers keyed by slot (renderers, mesh buffers) can compare [`PieceList::generation`] to know
/// when to re-read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PieceList {
    slots: Vec<Option<Coord>>,
    /// Sorted ascending.
    holes: Vec<usize>,
    generation: u64,
}

impl PieceList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total slots, live or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    pub fn live_count(&self) -> usize {
        self.slots.len() - self.holes.len()
    }

    pub fn holes(&self) -> &[usize] {
        &self.holes
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Coord> {
        self.slots.get(index).copied().flatten()
    }

    /// Raw slot view, holes included.
    pub fn slots(&self) -> &[Option<Coord>] {
        &self.slots
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Coord)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.map(|c| (i, c)))
    }

    /// Stores `c` in the lowest free slot and returns that slot.
    pub fn insert(&mut self, c: Coord) -> usize {
        self.generation += 1;
        if self.holes.is_empty() {
            self.slots.push(Some(c));
            return self.slots.len() - 1;
        }
        let index = self.holes.remove(0);
        self.slots[index] = Some(c);
        index
    }

    /// Frees the slot holding `c`. `None` if no piece of this list stands there.
    pub fn remove(&mut self, c: Coord) -> Option<usize> {
        let index = self.index_of(c)?;
        self.remove_slot(index);
        Some(index)
    }

    /// Frees `index`. Returns the square it held, `None` if it already was a hole.
    pub fn remove_slot(&mut self, index: usize) -> Option<Coord> {
        let c = self.slots.get_mut(index)?.take()?;
        let at = self.holes.partition_point(|&h| h < index);
        self.holes.insert(at, index);
        self.generation += 1;
        Some(c)
    }

    /// Relocates the piece at `from`, keeping its slot.
    pub fn relocate(&mut self, from: Coord, to: Coord) -> Option<usize> {
        let index = self.index_of(from)?;
        self.relocate_slot(index, to);
        Some(index)
    }

    pub fn relocate_slot(&mut self, index: usize, to: Coord) -> bool {
        match self.slots.get_mut(index) {
            Some(slot @ Some(_)) => {
                *slot = Some(to);
                self.generation += 1;
                true
            }
            _ => false,
        }
    }

    pub fn index_of(&self, c: Coord) -> Option<usize> {
        self.slots.iter().position(|s| *s == Some(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removal_keeps_other_indices_and_refills_lowest_hole() {
        let mut list = PieceList::new();
        let a = list.insert(Coord::new(0, 0));
        let b = list.insert(Coord::new(1, 0));
        let c = list.insert(Coord::new(2, 0));
        assert_eq!((a, b, c), (0, 1, 2));

        assert_eq!(list.remove(Coord::new(2, 0)), Some(2));
        assert_eq!(list.remove(Coord::new(0, 0)), Some(0));
        assert_eq!(list.holes(), &[0, 2]);
        assert_eq!(list.get(1), Some(Coord::new(1, 0)));
        assert_eq!(list.len() - list.holes().len(), list.live_count());

        assert_eq!(list.insert(Coord::new(5, 5)), 0);
        assert_eq!(list.holes(), &[2]);
        assert_eq!(list.remove(Coord::new(9, 9)), None);
    }

    #[test]
    fn relocate_keeps_slot_and_bumps_generation() {
        let mut list = PieceList::new();
        list.insert(Coord::new(0, 0));
        list.insert(Coord::new(3, 3));
        let g = list.generation();
        assert_eq!(list.relocate(Coord::new(3, 3), Coord::new(4, 4)), Some(1));
        assert!(list.generation() > g);
        assert_eq!(list.index_of(Coord::new(4, 4)), Some(1));
    }
}
