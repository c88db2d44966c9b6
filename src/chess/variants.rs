//! Built-in variants, looked up by the `Variant` metadata tag.

use std::collections::{BTreeMap, BTreeSet};

use crate::chess::game_rules::{GameRules, WinCondition};
use crate::core::coord::Coord;
use crate::core::piece::{Color, PieceKind, PieceType};

pub const CLASSICAL: &str = "Classical";
pub const CLASSICAL_KOTH: &str = "Classical_KOTH";
pub const THREE_CHECK: &str = "3-Check";

pub const NAMES: [&str; 3] = [CLASSICAL, CLASSICAL_KOTH, THREE_CHECK];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub name: &'static str,
    pub position: BTreeMap<Coord, PieceType>,
    pub special_rights: BTreeSet<Coord>,
    pub rules: GameRules,
}

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// The orthodox setup on files and ranks 1..=8; pawns, kings and rooks hold special rights.
fn classical_position() -> (BTreeMap<Coord, PieceType>, BTreeSet<Coord>) {
    let mut position = BTreeMap::new();
    let mut rights = BTreeSet::new();
    for (file, &kind) in (1..=8).zip(BACK_RANK.iter()) {
        for (color, back, pawns) in [(Color::White, 1, 2), (Color::Black, 8, 7)] {
            let piece = Coord::new(file, back);
            let pawn = Coord::new(file, pawns);
            position.insert(piece, PieceType::new(kind, color));
            position.insert(pawn, PieceType::new(PieceKind::Pawn, color));
            rights.insert(pawn);
            if matches!(kind, PieceKind::King | PieceKind::Rook) {
                rights.insert(piece);
            }
        }
    }
    (position, rights)
}

pub fn lookup(name: &str) -> Option<Variant> {
    let (position, special_rights) = classical_position();
    let (name, rules) = match name {
        CLASSICAL => (CLASSICAL, GameRules::classical()),
        CLASSICAL_KOTH => (
            CLASSICAL_KOTH,
            GameRules::classical()
                .with_win_conditions(&[WinCondition::Checkmate, WinCondition::KingOfTheHill]),
        ),
        THREE_CHECK => (
            THREE_CHECK,
            GameRules::classical()
                .with_win_conditions(&[WinCondition::Checkmate, WinCondition::NCheck(3)]),
        ),
        _ => return None,
    };
    Some(Variant {
        name,
        position,
        special_rights,
        rules,
    })
}
