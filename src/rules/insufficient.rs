//! Insufficient material: material sets that can never force checkmate of a lone king.
//!
//! Tables are written from the stronger side's point of view; [`is_insufficient`] tries both
//! color assignments. An entry matches when the stronger side has at most the listed count of
//! every kind and nothing else. Bishops are split by square color and compared as a pair sorted
//! in descending order.

use std::collections::BTreeMap;

use crate::board::Board;
use crate::chess::game_rules::{GameRules, WinCondition};
use crate::core::piece::{Color, PieceKind};
use crate::game::moves::Move;

use super::wincond::EffectiveConditions;

const INF: u32 = u32::MAX;

#[derive(Debug, Clone, Copy)]
struct Entry {
    pieces: &'static [(PieceKind, u32)],
    bishops: [u32; 2],
}

const fn entry(pieces: &'static [(PieceKind, u32)], bishops: [u32; 2]) -> Entry {
    Entry { pieces, bishops }
}

use PieceKind::*;

/// Stronger side still has its king.
const WITH_KING: &[Entry] = &[
    entry(&[(Queen, 1)], [0, 0]),
    entry(&[], [INF, 1]),
    entry(&[(Knight, 3)], [0, 0]),
    entry(&[(Hawk, 2)], [0, 0]),
    entry(&[(Rook, 1), (Knight, 1)], [0, 0]),
    entry(&[(Rook, 1)], [1, 0]),
    entry(&[(Archbishop, 1)], [1, 0]),
    entry(&[(Archbishop, 1), (Knight, 1)], [0, 0]),
    entry(&[(Knight, 1)], [INF, 0]),
    entry(&[(Knight, 1)], [1, 1]),
    entry(&[(Knight, 2)], [1, 0]),
    entry(&[(Guard, 1)], [0, 0]),
    entry(&[(Chancellor, 1)], [0, 0]),
    entry(&[(Knightrider, 2)], [0, 0]),
    entry(&[(Pawn, 3)], [0, 0]),
];

/// Stronger side has no king.
const WITHOUT_KING: &[Entry] = &[
    entry(&[(Queen, 1), (Rook, 1)], [0, 0]),
    entry(&[(Queen, 1), (Knight, 1)], [0, 0]),
    entry(&[(Queen, 1)], [1, 0]),
    entry(&[(Queen, 1), (Pawn, 1)], [0, 0]),
    entry(&[], [2, 2]),
    entry(&[], [INF, 1]),
    entry(&[(Knight, 4)], [0, 0]),
    entry(&[(Knight, 2)], [INF, 0]),
    entry(&[(Knight, 2)], [1, 1]),
    entry(&[(Knight, 1)], [2, 1]),
    entry(&[(Hawk, 3)], [0, 0]),
    entry(&[(Rook, 1), (Knight, 1)], [1, 0]),
    entry(&[(Rook, 1), (Knight, 1), (Pawn, 1)], [0, 0]),
    entry(&[(Rook, 1), (Knight, 2)], [0, 0]),
    entry(&[(Rook, 1), (Guard, 1)], [0, 0]),
    entry(&[(Rook, 2)], [1, 0]),
    entry(&[(Rook, 2), (Knight, 1)], [0, 0]),
    entry(&[(Rook, 2), (Pawn, 1)], [0, 0]),
    entry(&[(Archbishop, 1)], [2, 0]),
    entry(&[(Archbishop, 1)], [1, 1]),
    entry(&[(Archbishop, 1), (Knight, 2)], [0, 0]),
    entry(&[(Archbishop, 2)], [0, 0]),
    entry(&[(Chancellor, 1), (Guard, 1)], [0, 0]),
    entry(&[(Chancellor, 1), (Knight, 1)], [0, 0]),
    entry(&[(Chancellor, 1), (Rook, 1)], [0, 0]),
    entry(&[(Guard, 2)], [0, 0]),
    entry(&[(Amazon, 1)], [0, 0]),
    entry(&[(Knightrider, 3)], [0, 0]),
    entry(&[(Pawn, 6)], [0, 0]),
];

/// One side's material: kinds other than king and bishop, plus bishops by square color.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Material {
    kings: u32,
    other_royals: u32,
    pieces: BTreeMap<PieceKind, u32>,
    bishops: [u32; 2],
}

impl Material {
    fn of(board: &Board, color: Color) -> Self {
        let mut m = Material::default();
        for p in board.pieces_of_color(color) {
            match p.ty.kind {
                King => m.kings += 1,
                k if k.is_royal() => m.other_royals += 1,
                Bishop => m.bishops[(p.coords.x + p.coords.y).rem_euclid(2) as usize] += 1,
                k => *m.pieces.entry(k).or_default() += 1,
            }
        }
        m.bishops.sort_unstable_by(|a, b| b.cmp(a));
        m
    }

    fn is_lone_king(&self) -> bool {
        self.kings == 1
            && self.other_royals == 0
            && self.pieces.is_empty()
            && self.bishops == [0, 0]
    }

    fn fits(&self, e: &Entry) -> bool {
        let kinds_fit = self.pieces.iter().all(|(k, &n)| {
            let cap = e.pieces.iter().find(|(ek, _)| ek == k).map_or(0, |&(_, c)| c);
            n <= cap
        });
        kinds_fit && self.bishops[0] <= e.bishops[0] && self.bishops[1] <= e.bishops[1]
    }
}

/// Whether `strong` can never mate `weak`'s lone king with its material.
fn cannot_mate(strong: &Material, weak: &Material) -> bool {
    if !weak.is_lone_king() || strong.other_royals > 0 {
        return false;
    }
    let table = match strong.kings {
        0 => WITHOUT_KING,
        1 => WITH_KING,
        _ => return false,
    };
    table.iter().any(|e| strong.fits(e))
}

/// Insufficient-material draw check for a two-color game whose only win condition is checkmate.
pub fn is_insufficient(
    rules: &GameRules,
    effective: &EffectiveConditions,
    board: &Board,
    last_move: Option<&Move>,
    max_pieces: usize,
) -> bool {
    let colors = rules.colors();
    let [a, b] = colors[..] else {
        return false;
    };
    if colors
        .iter()
        .any(|&c| effective.of(c) != [WinCondition::Checkmate])
    {
        return false;
    }
    if last_move.is_some_and(|m| !m.is_capture()) {
        return false;
    }

    let mut material = 0;
    for p in board.pieces() {
        if p.ty.kind.is_obstacle() {
            continue;
        }
        if p.ty.color == Color::Neutral {
            return false;
        }
        if p.ty.kind == Pawn && rules.promotes(p.ty.color) {
            return false;
        }
        material += 1;
    }
    if material >= max_pieces {
        return false;
    }

    let (ma, mb) = (Material::of(board, a), Material::of(board, b));
    cannot_mate(&ma, &mb) || cannot_mate(&mb, &ma)
}
