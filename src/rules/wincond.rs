//! Win-condition evaluation.
//!
//! [`effective_conditions`] decides once per game which conditions are actually played:
//! checkmate detection assumes every opponent has a single jump royal, so other positions
//! fall back to royal capture. [`evaluate`] runs after every move (and once at load).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::chess::game_rules::{GameRules, WinCondition};
use crate::config::EngineConfig;
use crate::core::piece::{Color, PieceKind};
use crate::game::moves::Move;

use super::insufficient::is_insufficient;
use super::ruleset::Ruleset;

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Termination {
    Checkmate,
    RoyalCapture,
    AllRoyalsCaptured,
    AllPiecesCaptured,
    NCheck(u32),
    KingOfTheHill,
    Stalemate,
    Repetition,
    MoveRule,
    InsufficientMaterial,
    Resignation,
    Agreement,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Termination::Checkmate => "checkmate",
            Termination::RoyalCapture => "royalcapture",
            Termination::AllRoyalsCaptured => "allroyalscaptured",
            Termination::AllPiecesCaptured => "allpiecescaptured",
            Termination::NCheck(n) => return write!(f, "{}", WinCondition::NCheck(*n)),
            Termination::KingOfTheHill => "koth",
            Termination::Stalemate => "stalemate",
            Termination::Repetition => "repetition",
            Termination::MoveRule => "moverule",
            Termination::InsufficientMaterial => "insuffmat",
            Termination::Resignation => "resignation",
            Termination::Agreement => "agreement",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Conclusion {
    /// `None` for a draw.
    pub victor: Option<Color>,
    pub termination: Termination,
}

impl Conclusion {
    pub fn win(victor: Color, termination: Termination) -> Self {
        Self {
            victor: Some(victor),
            termination,
        }
    }

    pub fn draw(termination: Termination) -> Self {
        Self {
            victor: None,
            termination,
        }
    }
}

impl fmt::Display for Conclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.victor {
            Some(c) => write!(f, "{c} wins by {}", self.termination),
            None => write!(f, "draw by {}", self.termination),
        }
    }
}

/// The win conditions actually in force, per color.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveConditions {
    by_color: BTreeMap<Color, Vec<WinCondition>>,
    substituted: BTreeSet<Color>,
}

impl EffectiveConditions {
    pub fn of(&self, color: Color) -> &[WinCondition] {
        self.by_color.get(&color).map_or(&[], Vec::as_slice)
    }

    #[inline]
    pub fn has(&self, color: Color, wc: WinCondition) -> bool {
        self.of(color).contains(&wc)
    }

    /// Whether checkmate replaced royal capture for `color`.
    pub fn is_substituted(&self, color: Color) -> bool {
        self.substituted.contains(&color)
    }

    /// Moves of `defender` may not leave its royals attacked when some opponent plays checkmate.
    pub fn checks_enforced_for(&self, rules: &GameRules, defender: Color) -> bool {
        rules
            .opponents(defender)
            .any(|c| self.has(c, WinCondition::Checkmate))
    }
}

pub fn effective_conditions(
    rules: &GameRules,
    ruleset: &Ruleset,
    board: &Board,
    config: &EngineConfig,
) -> EffectiveConditions {
    let mut out = EffectiveConditions::default();
    let colinear = config.disable_checkmate_on_colinear && ruleset.has_colinear_slides();
    let crowded = board.piece_count() >= config.checkmate_piece_threshold;

    for color in rules.colors() {
        let mut conds = rules.win_conditions_of(color).to_vec();
        if conds.contains(&WinCondition::Checkmate) {
            let opponents: Vec<Color> = rules.opponents(color).collect();
            let royal_sets: Vec<_> = opponents.iter().map(|&o| board.royals(o)).collect();
            if royal_sets.iter().any(Vec::is_empty) {
                conds.retain(|&w| w != WinCondition::Checkmate);
                if conds.is_empty() {
                    conds.push(WinCondition::AllPiecesCaptured);
                }
            } else {
                let single_jump_royal = royal_sets
                    .iter()
                    .all(|rs| rs.len() == 1 && ruleset.is_jump_royal(rs[0].ty.kind));
                if !single_jump_royal || colinear || crowded {
                    conds.retain(|&w| w != WinCondition::Checkmate);
                    if !conds.contains(&WinCondition::RoyalCapture) {
                        conds.push(WinCondition::RoyalCapture);
                    }
                    out.substituted.insert(color);
                    tracing::info!(
                        %color,
                        single_jump_royal,
                        colinear,
                        crowded,
                        "checkmate replaced by royal capture"
                    );
                }
            }
        }
        out.by_color.insert(color, conds);
    }
    out
}

/// Facts about the position needed to decide whether the game is over.
#[derive(Debug, Clone, Copy)]
pub struct Evaluation<'a> {
    pub rules: &'a GameRules,
    pub board: &'a Board,
    pub effective: &'a EffectiveConditions,
    pub config: &'a EngineConfig,
    pub last_move: Option<&'a Move>,
    pub check_counts: &'a BTreeMap<Color, u32>,
    pub start_royals: &'a BTreeMap<Color, usize>,
    pub start_pieces: &'a BTreeMap<Color, usize>,
    /// Side to move.
    pub turn: Color,
    pub in_check: bool,
    pub move_rule_ply: u32,
    /// Times the current position has occurred.
    pub repetitions: usize,
}

/// Decisive conditions of the mover first, then the side to move's situation, then draws.
/// `has_legal_move` is only called when nothing decisive happened.
pub fn evaluate(e: &Evaluation<'_>, has_legal_move: impl FnOnce() -> bool) -> Option<Conclusion> {
    if let Some(mv) = e.last_move {
        if let Some(c) = decisive(e, mv) {
            return Some(c);
        }
    }

    if !has_legal_move() {
        let mover = e.last_move.map(|m| m.piece.color);
        let mater = mover
            .filter(|&m| e.effective.has(m, WinCondition::Checkmate))
            .or_else(|| {
                e.rules
                    .opponents(e.turn)
                    .find(|&c| e.effective.has(c, WinCondition::Checkmate))
            });
        return Some(match mater {
            Some(victor) if e.in_check => Conclusion::win(victor, Termination::Checkmate),
            _ => Conclusion::draw(Termination::Stalemate),
        });
    }

    if is_insufficient(
        e.rules,
        e.effective,
        e.board,
        e.last_move,
        e.config.insufficient_material_max_pieces,
    ) {
        return Some(Conclusion::draw(Termination::InsufficientMaterial));
    }
    if e.rules.move_rule.is_some_and(|limit| e.move_rule_ply >= limit) {
        return Some(Conclusion::draw(Termination::MoveRule));
    }
    if e.repetitions >= e.config.repetition_count {
        return Some(Conclusion::draw(Termination::Repetition));
    }
    None
}

fn decisive(e: &Evaluation<'_>, mv: &Move) -> Option<Conclusion> {
    let mover = mv.piece.color;
    let opponents: Vec<Color> = e.rules.opponents(mover).collect();

    for &wc in e.effective.of(mover) {
        let won = match wc {
            WinCondition::Checkmate => false,
            WinCondition::RoyalCapture => mv.captured.is_some_and(|t| {
                t.kind.is_royal() && t.color != mover && e.board.royal_count(t.color) == 0
            }),
            WinCondition::AllRoyalsCaptured => opponents.iter().any(|o| {
                e.start_royals.get(o).copied().unwrap_or(0) > 0 && e.board.royal_count(*o) == 0
            }),
            WinCondition::AllPiecesCaptured => opponents.iter().any(|o| {
                e.start_pieces.get(o).copied().unwrap_or(0) > 0 && e.board.count_color(*o) == 0
            }),
            WinCondition::NCheck(n) => e.check_counts.get(&mover).copied().unwrap_or(0) >= n,
            WinCondition::KingOfTheHill => {
                e.board.piece_at(mv.end).is_some_and(|t| {
                    t.kind == PieceKind::King && t.color == mover
                }) && e.config.hill_squares.contains(&mv.end)
            }
        };
        if won {
            let termination = match wc {
                WinCondition::RoyalCapture => Termination::RoyalCapture,
                WinCondition::AllRoyalsCaptured => Termination::AllRoyalsCaptured,
                WinCondition::AllPiecesCaptured => Termination::AllPiecesCaptured,
                WinCondition::NCheck(n) => Termination::NCheck(n),
                WinCondition::KingOfTheHill => Termination::KingOfTheHill,
                WinCondition::Checkmate => Termination::Checkmate,
            };
            return Some(Conclusion::win(mover, termination));
        }
    }
    None
}
