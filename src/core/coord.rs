use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A square on the unbounded board.
///
/// Serialized as the ICN text form `"x,y"`, which also makes it usable as a JSON map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Coord {
    pub x: i64,
    pub y: i64,
}

impl Coord {
    pub const ORIGIN: Coord = Coord { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn chebyshev_norm(self) -> i64 {
        self.x.abs().max(self.y.abs())
    }

    /// 2-D cross product, widened so far-apart squares cannot overflow.
    #[inline]
    pub fn cross(self, other: Coord) -> i128 {
        self.x as i128 * other.y as i128 - self.y as i128 * other.x as i128
    }

    #[inline]
    pub fn is_parallel(self, other: Coord) -> bool {
        self.cross(other) == 0
    }

    /// Canonical orientation of a step: `x > 0`, or `x == 0 && y > 0`.
    #[inline]
    pub fn normalized_step(self) -> Coord {
        if self.x < 0 || (self.x == 0 && self.y < 0) {
            -self
        } else {
            self
        }
    }

    /// Swaps the axes and negates the new `x`: the perpendicular used for pawn captures.
    #[inline]
    pub fn perpendicular(self) -> Coord {
        Coord::new(-self.y, self.x)
    }
}

impl Add for Coord {
    type Output = Coord;

    #[inline]
    fn add(self, rhs: Coord) -> Self::Output {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Coord {
    type Output = Coord;

    #[inline]
    fn sub(self, rhs: Coord) -> Self::Output {
        Coord::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Coord {
    type Output = Coord;

    #[inline]
    fn neg(self) -> Self::Output {
        Coord::new(-self.x, -self.y)
    }
}

impl Mul<i64> for Coord {
    type Output = Coord;

    #[inline]
    fn mul(self, rhs: i64) -> Coord {
        Coord {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid coordinate {0:?}, expected \"x,y\"")]
pub struct CoordParseError(pub String);

impl FromStr for Coord {
    type Err = CoordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| CoordParseError(s.to_string()))?;
        let x = x.trim().parse().map_err(|_| CoordParseError(s.to_string()))?;
        let y = y.trim().parse().map_err(|_| CoordParseError(s.to_string()))?;
        Ok(Coord::new(x, y))
    }
}

impl From<Coord> for String {
    fn from(c: Coord) -> String {
        c.to_string()
    }
}

impl TryFrom<String> for Coord {
    type Error = CoordParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Number of whole `step`s leading from `from` to `to`, if `to` lies on that lattice line.
pub fn step_multiple(from: Coord, to: Coord, step: Coord) -> Option<i64> {
    let d = to - from;
    if step == Coord::ORIGIN || !d.is_parallel(step) {
        return None;
    }
    let (num, den) = if step.x != 0 { (d.x, step.x) } else { (d.y, step.y) };
    if num % den != 0 {
        return None;
    }
    Some(num / den)
}

pub fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Inclusive axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: i64,
    pub right: i64,
    pub bottom: i64,
    pub top: i64,
}

impl BoundingBox {
    pub fn around(c: Coord) -> Self {
        Self {
            left: c.x,
            right: c.x,
            bottom: c.y,
            top: c.y,
        }
    }

    /// Smallest box containing every coordinate, `None` for an empty iterator.
    pub fn from_coords(coords: impl IntoIterator<Item = Coord>) -> Option<Self> {
        let mut it = coords.into_iter();
        let first = it.next()?;
        let mut bb = Self::around(first);
        for c in it {
            bb.include(c);
        }
        Some(bb)
    }

    pub fn include(&mut self, c: Coord) {
        self.left = self.left.min(c.x);
        self.right = self.right.max(c.x);
        self.bottom = self.bottom.min(c.y);
        self.top = self.top.max(c.y);
    }

    pub fn expanded(self, margin: i64) -> Self {
        Self {
            left: self.left - margin,
            right: self.right + margin,
            bottom: self.bottom - margin,
            top: self.top + margin,
        }
    }

    #[inline]
    pub fn contains(&self, c: Coord) -> bool {
        c.x >= self.left && c.x <= self.right && c.y >= self.bottom && c.y <= self.top
    }
}

/// The 8 king steps around the origin.
pub const KING_STEPS: [Coord; 8] = [
    Coord { x: -1, y: -1 },
    Coord { x: -1, y: 0 },
    Coord { x: -1, y: 1 },
    Coord { x: 0, y: -1 },
    Coord { x: 0, y: 1 },
    Coord { x: 1, y: -1 },
    Coord { x: 1, y: 0 },
    Coord { x: 1, y: 1 },
];
