//! The long-format game object, the JSON schema the ICN string is converted to and from.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::chess::game_rules::GameRules;
use crate::core::coord::Coord;
use crate::core::piece::{Color, PieceType};
use crate::error::NotationError;
use crate::game::moves::{Move, MoveDraft};

use super::metadata::Metadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckMark {
    Check,
    Mate,
}

/// One move in text form: `[ABBR]x1,y1(>|x)x2,y2[=PROMO][+|#]`.
///
/// Piece prefix, capture mark and check mark are optional annotations; only the squares and the
/// promotion are needed to replay the move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct MoveRecord {
    pub piece: Option<PieceType>,
    pub start: Coord,
    pub end: Coord,
    pub capture: bool,
    pub promotion: Option<PieceType>,
    pub mark: Option<CheckMark>,
}

impl MoveRecord {
    pub fn from_move(m: &Move) -> Self {
        Self {
            piece: Some(m.piece),
            start: m.start,
            end: m.end,
            capture: m.is_capture(),
            promotion: m.promotion,
            mark: if m.mate {
                Some(CheckMark::Mate)
            } else if m.check {
                Some(CheckMark::Check)
            } else {
                None
            },
        }
    }

    /// Same move without the optional annotations.
    pub fn compact(self) -> Self {
        Self {
            piece: None,
            capture: false,
            mark: None,
            ..self
        }
    }

    pub fn draft(&self) -> MoveDraft {
        MoveDraft {
            start: self.start,
            end: self.end,
            promotion: self.promotion,
        }
    }
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = self.piece {
            write!(f, "{p}")?;
        }
        let sep = if self.capture { 'x' } else { '>' };
        write!(f, "{}{sep}{}", self.start, self.end)?;
        if let Some(p) = self.promotion {
            write!(f, "={p}")?;
        }
        match self.mark {
            Some(CheckMark::Check) => f.write_str("+"),
            Some(CheckMark::Mate) => f.write_str("#"),
            None => Ok(()),
        }
    }
}

/// Length of a leading `[digits]letters` piece abbreviation, 0 if there is none.
pub(crate) fn piece_prefix_len(s: &str) -> usize {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    let letters = s[digits..]
        .bytes()
        .take_while(u8::is_ascii_alphabetic)
        .count();
    if letters == 0 {
        0
    } else {
        digits + letters
    }
}

impl FromStr for MoveRecord {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || NotationError::Move(s.to_string());

        let (body, mark) = match s.as_bytes().last() {
            Some(b'+') => (&s[..s.len() - 1], Some(CheckMark::Check)),
            Some(b'#') => (&s[..s.len() - 1], Some(CheckMark::Mate)),
            _ => (s, None),
        };
        let (body, promotion) = match body.split_once('=') {
            Some((b, p)) => (b, Some(p.parse::<PieceType>()?)),
            None => (body, None),
        };

        let prefix = piece_prefix_len(body);
        let piece = if prefix > 0 {
            Some(body[..prefix].parse::<PieceType>()?)
        } else {
            None
        };
        let squares = &body[prefix..];
        let sep = squares.find(['>', 'x']).ok_or_else(bad)?;
        let start: Coord = squares[..sep].parse()?;
        let end: Coord = squares[sep + 1..].parse()?;

        Ok(MoveRecord {
            piece,
            start,
            end,
            capture: squares.as_bytes()[sep] == b'x',
            promotion,
            mark,
        })
    }
}

impl From<MoveRecord> for String {
    fn from(m: MoveRecord) -> String {
        m.to_string()
    }
}

impl TryFrom<String> for MoveRecord {
    type Error = NotationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

fn default_turn() -> Color {
    Color::White
}

fn default_full_move() -> u32 {
    1
}

/// A game as data: starting snapshot, rules and the moves played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongFormat {
    #[serde(default)]
    pub metadata: Metadata,
    /// Side to move in the starting position.
    #[serde(default = "default_turn")]
    pub turn: Color,
    /// En passant capture square open in the starting position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enpassant: Option<Coord>,
    /// Plies since the last capture or pawn move, at the start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_rule: Option<u32>,
    #[serde(default = "default_full_move")]
    pub full_move: u32,
    /// `None` when the position comes from the `Variant` tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_position: Option<BTreeMap<Coord, PieceType>>,
    #[serde(default)]
    pub special_rights: BTreeSet<Coord>,
    #[serde(default)]
    pub moves: Vec<MoveRecord>,
    #[serde(default)]
    pub game_rules: GameRules,
}

impl LongFormat {
    pub fn from_json(s: &str) -> Result<Self, NotationError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, NotationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
