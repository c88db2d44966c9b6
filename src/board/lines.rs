//! Line buckets: every piece grouped by the lines it sits on, one family per sliding step.
//!
//! For a normalized step `(dx, dy)` a line is identified by `(dx·y − dy·x, residue)`. The residue
//! separates the parallel sub-lattices a non-reduced step like `(2, 2)` produces on one
//! geometric line. Buckets stay sorted by their axis coordinate (`x`, or `y` for vertical
//! steps), so nearest-blocker queries are binary searches.

use rustc_hash::FxHashMap;

use crate::core::coord::Coord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineKey {
    pub intercept: i128,
    pub residue: i64,
}

impl LineKey {
    /// Key of the line through `c` for a normalized, non-zero `step`.
    #[inline]
    pub fn of(step: Coord, c: Coord) -> LineKey {
        let intercept = step.x as i128 * c.y as i128 - step.y as i128 * c.x as i128;
        let residue = if step.x != 0 {
            c.x.rem_euclid(step.x.abs())
        } else {
            c.y.rem_euclid(step.y.abs())
        };
        LineKey { intercept, residue }
    }
}

/// Which way along a step to look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sense {
    /// In the direction of the step as given.
    Forward,
    /// Against it.
    Backward,
}

impl Sense {
    pub const BOTH: [Sense; 2] = [Sense::Forward, Sense::Backward];

    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Sense::Forward => 1,
            Sense::Backward => -1,
        }
    }

    #[inline]
    pub fn flip(self) -> Sense {
        match self {
            Sense::Forward => Sense::Backward,
            Sense::Backward => Sense::Forward,
        }
    }
}

/// Position along a line of normalized `step`.
#[inline]
fn axis(step: Coord, c: Coord) -> i64 {
    if step.x != 0 {
        c.x
    } else {
        c.y
    }
}

#[derive(Debug, Clone, Default)]
pub struct LineOrganizer {
    families: FxHashMap<Coord, FxHashMap<LineKey, Vec<Coord>>>,
}

impl LineOrganizer {
    /// Registers a family per distinct normalized step. Zero steps are ignored.
    pub fn new(steps: impl IntoIterator<Item = Coord>) -> Self {
        let mut families = FxHashMap::default();
        for s in steps {
            if s != Coord::ORIGIN {
                families.entry(s.normalized_step()).or_insert_with(FxHashMap::default);
            }
        }
        Self { families }
    }

    pub fn steps(&self) -> impl Iterator<Item = Coord> + '_ {
        self.families.keys().copied()
    }

    #[inline]
    pub fn has_step(&self, step: Coord) -> bool {
        self.families.contains_key(&step.normalized_step())
    }

    pub fn insert(&mut self, c: Coord) {
        for (&step, buckets) in self.families.iter_mut() {
            let bucket = buckets.entry(LineKey::of(step, c)).or_default();
            let a = axis(step, c);
            let at = bucket.partition_point(|p| axis(step, *p) < a);
            bucket.insert(at, c);
        }
    }

    pub fn remove(&mut self, c: Coord) {
        for (&step, buckets) in self.families.iter_mut() {
            let key = LineKey::of(step, c);
            let Some(bucket) = buckets.get_mut(&key) else {
                continue;
            };
            let a = axis(step, c);
            let at = bucket.partition_point(|p| axis(step, *p) < a);
            if bucket.get(at) == Some(&c) {
                bucket.remove(at);
            }
            if bucket.is_empty() {
                buckets.remove(&key);
            }
        }
    }

    /// Sorted pieces on the line of `step` through `c`. `None` if the step is not registered.
    pub fn bucket(&self, step: Coord, c: Coord) -> Option<&[Coord]> {
        let n = step.normalized_step();
        let buckets = self.families.get(&n)?;
        Some(
            buckets
                .get(&LineKey::of(n, c))
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        )
    }

    /// Number of non-empty lines for `step`.
    pub fn line_count(&self, step: Coord) -> usize {
        self.families
            .get(&step.normalized_step())
            .map_or(0, FxHashMap::len)
    }

    /// Closest occupied square on the line of `step` through `from`, strictly past `from` in
    /// `sense`. Outer `None` if the step has no registered family.
    pub fn nearest(&self, step: Coord, from: Coord, sense: Sense) -> Option<Option<Coord>> {
        let n = step.normalized_step();
        let bucket = self.bucket(n, from)?;
        let increasing = (n == step) == (sense == Sense::Forward);
        let a = axis(n, from);
        let hit = if increasing {
            let at = bucket.partition_point(|p| axis(n, *p) <= a);
            bucket.get(at).copied()
        } else {
            let at = bucket.partition_point(|p| axis(n, *p) < a);
            at.checked_sub(1).map(|i| bucket[i])
        };
        Some(hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_reduced_step_splits_sub_lattices() {
        let mut lines = LineOrganizer::new([Coord::new(2, 2)]);
        lines.insert(Coord::new(0, 0));
        lines.insert(Coord::new(1, 1));
        lines.insert(Coord::new(4, 4));
        assert_eq!(
            lines.bucket(Coord::new(2, 2), Coord::new(0, 0)),
            Some(&[Coord::new(0, 0), Coord::new(4, 4)][..])
        );
        assert_eq!(lines.line_count(Coord::new(2, 2)), 2);
    }

    #[test]
    fn nearest_honours_step_sign() {
        let mut lines = LineOrganizer::new([Coord::new(0, 1)]);
        for y in [-5, 2, 9] {
            lines.insert(Coord::new(3, y));
        }
        let from = Coord::new(3, 0);
        assert_eq!(
            lines.nearest(Coord::new(0, 1), from, Sense::Forward),
            Some(Some(Coord::new(3, 2)))
        );
        assert_eq!(
            lines.nearest(Coord::new(0, -1), from, Sense::Forward),
            Some(Some(Coord::new(3, -5)))
        );
        assert_eq!(
            lines.nearest(Coord::new(0, 1), Coord::new(3, 9), Sense::Forward),
            Some(None)
        );
        assert_eq!(lines.nearest(Coord::new(1, 0), from, Sense::Forward), None);

        lines.remove(Coord::new(3, 2));
        assert_eq!(
            lines.nearest(Coord::new(0, 1), from, Sense::Forward),
            Some(Some(Coord::new(3, 9)))
        );
    }
}
