use std::collections::BTreeSet;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::board::Board;
use crate::chess::game_rules::GameRules;
use crate::chess::moveset::{has_colinear_steps, Moveset, SpecialTag, DIAGONAL_STEPS, ORTHOGONAL_STEPS};
use crate::core::coord::Coord;
use crate::core::piece::{Piece, PieceKind};
use crate::game::moves::EnPassant;

use super::movegen::PieceMoves;
use super::special;

/// Everything a special-move handler may look at.
#[derive(Clone, Copy)]
pub struct MoveContext<'a> {
    pub ruleset: &'a Ruleset,
    pub board: &'a Board,
    pub special_rights: &'a FxHashSet<Coord>,
    pub en_passant: &'a [EnPassant],
    /// Moves may not leave the mover's royals attacked.
    pub enforce_checks: bool,
}

/// Adds a kind's special destinations to its candidate list.
pub type SpecialHandler = fn(&MoveContext<'_>, Piece, &mut PieceMoves);

/// Per-game move tables, built once from the rules and the kinds that can appear.
#[derive(Clone)]
pub struct Ruleset {
    pub rules: GameRules,
    kinds: BTreeSet<PieceKind>,
    movesets: FxHashMap<PieceKind, Moveset>,
    slide_steps: Vec<Coord>,
    vicinity: FxHashMap<Coord, Vec<PieceKind>>,
    specials: FxHashMap<PieceKind, SpecialHandler>,
}

impl Ruleset {
    /// `kinds` are the kinds of the starting position; promotion targets are added here.
    pub fn new(rules: GameRules, kinds: impl IntoIterator<Item = PieceKind>) -> Self {
        Self::with_movesets(rules, kinds, std::iter::empty())
    }

    /// Like [`Ruleset::new`], with `overrides` replacing the built-in moveset of their kinds.
    pub fn with_movesets(
        rules: GameRules,
        kinds: impl IntoIterator<Item = PieceKind>,
        overrides: impl IntoIterator<Item = (PieceKind, Moveset)>,
    ) -> Self {
        let mut present: BTreeSet<PieceKind> = kinds.into_iter().collect();
        present.extend(rules.promotion_kinds());

        let mut movesets: FxHashMap<PieceKind, Moveset> =
            PieceKind::ALL.into_iter().map(|k| (k, Moveset::of(k))).collect();
        movesets.extend(overrides);

        let mut slide_steps: Vec<Coord> = present
            .iter()
            .flat_map(|k| movesets[k].slides.iter().copied())
            .collect();
        slide_steps.sort();
        slide_steps.dedup();

        // Offset from a royal to a square whose occupant could capture it in one jump.
        let mut vicinity: FxHashMap<Coord, Vec<PieceKind>> = FxHashMap::default();
        for &k in &present {
            for &j in &movesets[&k].jumps {
                let kinds = vicinity.entry(-j).or_default();
                if !kinds.contains(&k) {
                    kinds.push(k);
                }
            }
        }

        let mut specials: FxHashMap<PieceKind, SpecialHandler> = FxHashMap::default();
        for &k in &present {
            let handler: SpecialHandler = match movesets[&k].special {
                Some(SpecialTag::Castling) => special::castling,
                Some(SpecialTag::Pawn) => special::pawn,
                None => continue,
            };
            specials.insert(k, handler);
        }

        Self {
            rules,
            kinds: present,
            movesets,
            slide_steps,
            vicinity,
            specials,
        }
    }

    #[inline]
    pub fn moveset(&self, kind: PieceKind) -> &Moveset {
        &self.movesets[&kind]
    }

    pub fn kinds(&self) -> &BTreeSet<PieceKind> {
        &self.kinds
    }

    /// Normalized slide steps of every kind that can appear.
    pub fn slide_steps(&self) -> &[Coord] {
        &self.slide_steps
    }

    /// Steps the board keeps line buckets for: every slide step plus rows, columns and diagonals.
    pub fn line_steps(&self) -> Vec<Coord> {
        let mut steps = self.slide_steps.clone();
        steps.extend(ORTHOGONAL_STEPS);
        steps.extend(DIAGONAL_STEPS);
        steps.sort();
        steps.dedup();
        steps
    }

    pub fn vicinity(&self) -> &FxHashMap<Coord, Vec<PieceKind>> {
        &self.vicinity
    }

    #[inline]
    pub fn special(&self, kind: PieceKind) -> Option<SpecialHandler> {
        self.specials.get(&kind).copied()
    }

    #[inline]
    pub fn slide_limit(&self) -> Option<u64> {
        self.rules.slide_limit
    }

    /// A royal that moves only by jumps: the only kind checkmate detection supports.
    pub fn is_jump_royal(&self, kind: PieceKind) -> bool {
        kind.is_royal() && self.moveset(kind).is_jump_only()
    }

    pub fn has_colinear_slides(&self) -> bool {
        has_colinear_steps(&self.slide_steps)
    }

    /// Whether a slide of `k` steps is within the variant's slide limit.
    #[inline]
    pub fn within_slide_limit(&self, k: i64) -> bool {
        self.slide_limit().map_or(true, |l| k.unsigned_abs() <= l)
    }
}

impl std::fmt::Debug for Ruleset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ruleset")
            .field("rules", &self.rules)
            .field("kinds", &self.kinds)
            .field("slide_steps", &self.slide_steps)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for MoveContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoveContext")
            .field("en_passant", &self.en_passant)
            .field("enforce_checks", &self.enforce_checks)
            .finish_non_exhaustive()
    }
}
