use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::coord::Coord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
    Red,
    Green,
    Neutral,
}

impl Color {
    pub const PLAYERS: [Color; 4] = [Color::White, Color::Black, Color::Red, Color::Green];

    /// Direction a pawn of this color advances in.
    #[inline]
    pub fn forward(self) -> Option<Coord> {
        match self {
            Color::White => Some(Coord::new(0, 1)),
            Color::Black => Some(Coord::new(0, -1)),
            Color::Red => Some(Coord::new(1, 0)),
            Color::Green => Some(Coord::new(-1, 0)),
            Color::Neutral => None,
        }
    }

    pub fn player_number(self) -> u8 {
        match self {
            Color::Neutral => 0,
            Color::White => 1,
            Color::Black => 2,
            Color::Red => 3,
            Color::Green => 4,
        }
    }

    pub fn from_player_number(n: u8) -> Option<Color> {
        match n {
            0 => Some(Color::Neutral),
            1 => Some(Color::White),
            2 => Some(Color::Black),
            3 => Some(Color::Red),
            4 => Some(Color::Green),
            _ => None,
        }
    }

    /// One-letter code used for the ICN turn field.
    pub fn letter(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
            Color::Red => 'r',
            Color::Green => 'g',
            Color::Neutral => 'n',
        }
    }

    pub fn from_letter(c: char) -> Option<Color> {
        match c {
            'w' => Some(Color::White),
            'b' => Some(Color::Black),
            'r' => Some(Color::Red),
            'g' => Some(Color::Green),
            'n' => Some(Color::Neutral),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
            Color::Red => "red",
            Color::Green => "green",
            Color::Neutral => "neutral",
        }
    }

    pub fn from_name(s: &str) -> Option<Color> {
        match s {
            "white" => Some(Color::White),
            "black" => Some(Color::Black),
            "red" => Some(Color::Red),
            "green" => Some(Color::Green),
            "neutral" => Some(Color::Neutral),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PieceKind {
    King,
    Giraffe,
    Camel,
    Zebra,
    Knightrider,
    Amazon,
    Queen,
    RoyalQueen,
    Hawk,
    Chancellor,
    Archbishop,
    Centaur,
    RoyalCentaur,
    Knight,
    Guard,
    Rook,
    Bishop,
    Pawn,
    Obstacle,
    Void,
}

impl PieceKind {
    pub const ALL: [PieceKind; 20] = [
        PieceKind::King,
        PieceKind::Giraffe,
        PieceKind::Camel,
        PieceKind::Zebra,
        PieceKind::Knightrider,
        PieceKind::Amazon,
        PieceKind::Queen,
        PieceKind::RoyalQueen,
        PieceKind::Hawk,
        PieceKind::Chancellor,
        PieceKind::Archbishop,
        PieceKind::Centaur,
        PieceKind::RoyalCentaur,
        PieceKind::Knight,
        PieceKind::Guard,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Pawn,
        PieceKind::Obstacle,
        PieceKind::Void,
    ];

    #[inline]
    pub fn is_royal(self) -> bool {
        matches!(
            self,
            PieceKind::King | PieceKind::RoyalQueen | PieceKind::RoyalCentaur
        )
    }

    /// Voids and obstacles: board furniture rather than material.
    #[inline]
    pub fn is_obstacle(self) -> bool {
        matches!(self, PieceKind::Obstacle | PieceKind::Void)
    }

    /// Uppercase ICN abbreviation.
    pub fn abbreviation(self) -> &'static str {
        use PieceKind::*;
        match self {
            King => "K",
            Giraffe => "GI",
            Camel => "CA",
            Zebra => "ZE",
            Knightrider => "NR",
            Amazon => "AM",
            Queen => "Q",
            RoyalQueen => "RQ",
            Hawk => "HA",
            Chancellor => "CH",
            Archbishop => "AR",
            Centaur => "CE",
            RoyalCentaur => "RC",
            Knight => "N",
            Guard => "GU",
            Rook => "R",
            Bishop => "B",
            Pawn => "P",
            Obstacle => "OB",
            Void => "VO",
        }
    }

    /// Case-insensitive inverse of [`PieceKind::abbreviation`].
    pub fn from_abbreviation(s: &str) -> Option<PieceKind> {
        let upper = s.to_ascii_uppercase();
        PieceKind::ALL
            .into_iter()
            .find(|k| k.abbreviation() == upper)
    }

    /// camelCase name as used in JSON (`royalQueen`).
    pub fn name(self) -> &'static str {
        use PieceKind::*;
        match self {
            King => "king",
            Giraffe => "giraffe",
            Camel => "camel",
            Zebra => "zebra",
            Knightrider => "knightrider",
            Amazon => "amazon",
            Queen => "queen",
            RoyalQueen => "royalQueen",
            Hawk => "hawk",
            Chancellor => "chancellor",
            Archbishop => "archbishop",
            Centaur => "centaur",
            RoyalCentaur => "royalCentaur",
            Knight => "knight",
            Guard => "guard",
            Rook => "rook",
            Bishop => "bishop",
            Pawn => "pawn",
            Obstacle => "obstacle",
            Void => "void",
        }
    }

    pub fn from_name(s: &str) -> Option<PieceKind> {
        PieceKind::ALL.into_iter().find(|k| k.name() == s)
    }
}

/// A tagged `(kind, color)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PieceType {
    pub kind: PieceKind,
    pub color: Color,
}

impl PieceType {
    #[inline]
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }

    /// Whether a piece of `mover` may land on this piece by capturing it.
    #[inline]
    pub fn capturable_by(self, mover: Color) -> bool {
        self.color != mover && self.kind != PieceKind::Void
    }

    /// Whether this piece can attack pieces of `defender`.
    #[inline]
    pub fn is_hostile_to(self, defender: Color) -> bool {
        self.color != defender && self.color != Color::Neutral
    }
}

impl fmt::Display for PieceType {
    /// ICN form: uppercase for white, lowercase for black, player-number prefix otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abbr = self.kind.abbreviation();
        match self.color {
            Color::White => f.write_str(abbr),
            Color::Black => f.write_str(&abbr.to_ascii_lowercase()),
            other => write!(f, "{}{}", other.player_number(), abbr),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid piece type {0:?}")]
pub struct PieceParseError(pub String);

impl FromStr for PieceType {
    type Err = PieceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || PieceParseError(s.to_string());
        let digits = s.chars().take_while(|c| c.is_ascii_digit()).count();
        let (prefix, letters) = s.split_at(digits);
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(err());
        }
        let kind = PieceKind::from_abbreviation(letters).ok_or_else(err)?;
        let color = if prefix.is_empty() {
            if letters.chars().all(|c| c.is_ascii_uppercase()) {
                Color::White
            } else if letters.chars().all(|c| c.is_ascii_lowercase()) {
                Color::Black
            } else {
                return Err(err());
            }
        } else {
            let n: u8 = prefix.parse().map_err(|_| err())?;
            Color::from_player_number(n).ok_or_else(err)?
        };
        Ok(PieceType::new(kind, color))
    }
}

impl From<PieceType> for String {
    fn from(t: PieceType) -> String {
        t.to_string()
    }
}

impl TryFrom<String> for PieceType {
    type Error = PieceParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A live piece: its type, square and slot in that type's [`PieceList`](crate::core::piece_list::PieceList).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub ty: PieceType,
    pub coords: Coord,
    pub index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviations_round_trip_for_every_color() {
        for kind in PieceKind::ALL {
            for color in [
                Color::White,
                Color::Black,
                Color::Red,
                Color::Green,
                Color::Neutral,
            ] {
                let t = PieceType::new(kind, color);
                assert_eq!(t.to_string().parse::<PieceType>(), Ok(t));
            }
        }
    }

    #[test]
    fn mixed_case_abbreviation_is_rejected() {
        assert!("Gi".parse::<PieceType>().is_err());
        assert!("9K".parse::<PieceType>().is_err());
        assert_eq!(
            "0vo".parse::<PieceType>(),
            Ok(PieceType::new(PieceKind::Void, Color::Neutral))
        );
    }
}
