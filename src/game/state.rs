//! The live game: board, rights, history cursor and conclusion, mutated only through moves.
//!
//! Every move stores an [`UndoRecord`] next to it so [`GameState::undo_move`] restores the exact
//! previous state; [`GameState::redo_move`] replays the stored move. Playing a new move after an
//! undo drops the redo tail.

use std::collections::{BTreeMap, BTreeSet};
use std::hash::BuildHasher;

use rustc_hash::{FxBuildHasher, FxHashSet};

use crate::board::Board;
use crate::chess::game_rules::GameRules;
use crate::chess::moveset::Moveset;
use crate::chess::variants;
use crate::config::EngineConfig;
use crate::core::coord::{BoundingBox, Coord};
use crate::core::piece::{Color, Piece, PieceKind, PieceType};
use crate::error::{GameError, GameResult, NotationError};
use crate::notation::long_format::{LongFormat, MoveRecord};
use crate::notation::metadata::Metadata;
use crate::rules::attacks::{in_check, royal_attackers, Attacker};
use crate::rules::legal::legal_moves;
use crate::rules::movegen::{Destination, PieceMoves, SpecialFlag};
use crate::rules::ruleset::{MoveContext, Ruleset};
use crate::rules::wincond::{
    effective_conditions, evaluate, Conclusion, EffectiveConditions, Evaluation, Termination,
};

use super::moves::{EnPassant, Move, MoveDraft, MoveSpecial};

/// The position a game starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartSnapshot {
    pub position: BTreeMap<Coord, PieceType>,
    pub special_rights: BTreeSet<Coord>,
    /// Capture square of a double push made just before the start.
    pub en_passant: Option<Coord>,
    pub turn: Color,
    pub full_move: u32,
    pub move_rule_ply: u32,
}

impl StartSnapshot {
    pub fn new(position: BTreeMap<Coord, PieceType>, special_rights: BTreeSet<Coord>) -> Self {
        Self {
            position,
            special_rights,
            en_passant: None,
            turn: Color::White,
            full_move: 1,
            move_rule_ply: 0,
        }
    }

    pub fn piece_count(&self) -> usize {
        self.position.len()
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_coords(self.position.keys().copied())
    }
}

/// A pending draw offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawOffer {
    pub by: Color,
    /// History cursor when the offer was made.
    pub at_move: isize,
}

/// State a move overwrites that cannot be recomputed from the board.
#[derive(Debug, Clone, PartialEq, Eq)]
struct UndoRecord {
    rights_removed: Vec<Coord>,
    en_passant: Vec<EnPassant>,
    move_rule_ply: u32,
    check_counts: BTreeMap<Color, u32>,
    conclusion: Option<Conclusion>,
    draw_offer: Option<DrawOffer>,
    /// Piece found on an en passant landing square and removed to make room.
    displaced: Option<PieceType>,
}

#[derive(Debug, Clone)]
struct HistoryEntry {
    mv: Move,
    undo: UndoRecord,
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub metadata: Metadata,
    config: EngineConfig,
    ruleset: Ruleset,
    start: StartSnapshot,
    start_royals: BTreeMap<Color, usize>,
    start_pieces: BTreeMap<Color, usize>,
    effective: EffectiveConditions,

    board: Board,
    special_rights: FxHashSet<Coord>,
    en_passant: Vec<EnPassant>,
    history: Vec<HistoryEntry>,
    /// Index of the last applied move in `history`, -1 at the start.
    move_index: isize,
    turn: Color,
    attackers: Vec<Attacker>,
    check_counts: BTreeMap<Color, u32>,
    draw_offer: Option<DrawOffer>,
    /// Key of the start position followed by one key per applied move.
    position_keys: Vec<u64>,
    move_rule_ply: u32,
    conclusion: Option<Conclusion>,
}

impl GameState {
    pub fn new(
        metadata: Metadata,
        rules: GameRules,
        start: StartSnapshot,
        config: EngineConfig,
    ) -> GameResult<Self> {
        Self::with_movesets(metadata, rules, start, config, std::iter::empty())
    }

    /// A game whose pieces of the given kinds move by custom movesets.
    pub fn with_movesets(
        metadata: Metadata,
        rules: GameRules,
        start: StartSnapshot,
        config: EngineConfig,
        movesets: impl IntoIterator<Item = (PieceKind, Moveset)>,
    ) -> GameResult<Self> {
        rules.validate()?;
        let ruleset =
            Ruleset::with_movesets(rules, start.position.values().map(|t| t.kind), movesets);
        let board = Board::with_pieces(
            ruleset.line_steps(),
            start.position.iter().map(|(&c, &t)| (c, t)),
        )?;
        let effective = effective_conditions(&ruleset.rules, &ruleset, &board, &config);

        let colors = ruleset.rules.colors();
        let start_royals = colors.iter().map(|&c| (c, board.royal_count(c))).collect();
        let start_pieces = colors.iter().map(|&c| (c, board.count_color(c))).collect();
        let turn = ruleset.rules.turn_after(start.turn, 0);

        let en_passant = start
            .en_passant
            .into_iter()
            .filter_map(|square| {
                let mover = ruleset.rules.previous_turn(turn);
                let forward = mover.forward()?;
                Some(EnPassant {
                    square,
                    pawn: square + forward,
                    color: mover,
                })
            })
            .collect();

        let mut game = Self {
            metadata,
            config,
            start_royals,
            start_pieces,
            effective,
            special_rights: start.special_rights.iter().copied().collect(),
            en_passant,
            history: Vec::new(),
            move_index: -1,
            turn,
            attackers: Vec::new(),
            check_counts: colors.iter().map(|&c| (c, 0)).collect(),
            draw_offer: None,
            position_keys: Vec::new(),
            move_rule_ply: start.move_rule_ply,
            conclusion: None,
            board,
            ruleset,
            start,
        };
        game.attackers = royal_attackers(&game.ruleset, &game.board, game.turn);
        game.position_keys.push(game.position_key());
        game.conclusion = game.evaluate_position(None);

        tracing::debug!(
            variant = game.metadata.variant.as_deref().unwrap_or("-"),
            pieces = game.board.piece_count(),
            turn = %game.turn,
            "game constructed"
        );
        if let Some(c) = game.conclusion {
            tracing::info!(conclusion = %c, "game is over at load");
        }
        Ok(game)
    }

    pub fn from_variant(name: &str, metadata: Metadata, config: EngineConfig) -> GameResult<Self> {
        let v = variants::lookup(name).ok_or_else(|| GameError::UnknownVariant(name.to_string()))?;
        let metadata = Metadata {
            variant: Some(v.name.to_string()),
            ..metadata
        };
        Self::new(
            metadata,
            v.rules,
            StartSnapshot::new(v.position, v.special_rights),
            config,
        )
    }

    /// Builds the start position and replays every recorded move.
    pub fn from_long_format(lf: &LongFormat, config: EngineConfig) -> GameResult<Self> {
        let (position, special_rights) = match &lf.starting_position {
            Some(p) => (p.clone(), lf.special_rights.clone()),
            None => {
                let v = lf
                    .metadata
                    .variant
                    .as_deref()
                    .and_then(variants::lookup)
                    .ok_or_else(|| NotationError::MissingPosition {
                        variant: lf.metadata.variant.clone(),
                    })?;
                (v.position, v.special_rights)
            }
        };
        let start = StartSnapshot {
            position,
            special_rights,
            en_passant: lf.enpassant,
            turn: lf.turn,
            full_move: lf.full_move,
            move_rule_ply: lf.move_rule.unwrap_or(0),
        };

        let mut game = Self::new(lf.metadata.clone(), lf.game_rules.clone(), start, config)?;
        for (index, rec) in lf.moves.iter().enumerate() {
            game.make_move(rec.draft()).map_err(|e| GameError::Replay {
                index,
                source: Box::new(e),
            })?;
        }
        tracing::debug!(moves = lf.moves.len(), "replayed move list");
        Ok(game)
    }

    /// Start snapshot, rules and the moves up to the cursor.
    pub fn to_long_format(&self) -> LongFormat {
        let mut metadata = self.metadata.clone();
        if let Some(c) = &self.conclusion {
            metadata.record_conclusion(c);
        }
        LongFormat {
            metadata,
            turn: self.start.turn,
            enpassant: self.start.en_passant,
            move_rule: self.rules().move_rule.map(|_| self.start.move_rule_ply),
            full_move: self.start.full_move,
            starting_position: Some(self.start.position.clone()),
            special_rights: self.start.special_rights.clone(),
            moves: self.moves().iter().map(MoveRecord::from_move).collect(),
            game_rules: self.rules().clone(),
        }
    }

    #[inline]
    pub fn rules(&self) -> &GameRules {
        &self.ruleset.rules
    }

    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn start(&self) -> &StartSnapshot {
        &self.start
    }

    pub fn effective_conditions(&self) -> &EffectiveConditions {
        &self.effective
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn special_rights(&self) -> &FxHashSet<Coord> {
        &self.special_rights
    }

    pub fn en_passant(&self) -> &[EnPassant] {
        &self.en_passant
    }

    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Whether the side to move has an attacked royal.
    pub fn is_in_check(&self) -> bool {
        !self.attackers.is_empty()
    }

    /// Attackers of the side to move's royals.
    pub fn attackers(&self) -> &[Attacker] {
        &self.attackers
    }

    /// Checks `color` has delivered so far.
    pub fn check_count(&self, color: Color) -> u32 {
        self.check_counts.get(&color).copied().unwrap_or(0)
    }

    pub fn conclusion(&self) -> Option<&Conclusion> {
        self.conclusion.as_ref()
    }

    pub fn draw_offer(&self) -> Option<DrawOffer> {
        self.draw_offer
    }

    pub fn move_rule_ply(&self) -> u32 {
        self.move_rule_ply
    }

    /// Moves applied so far, without the redo tail.
    pub fn moves(&self) -> Vec<Move> {
        self.history[..self.ply()].iter().map(|h| h.mv).collect()
    }

    #[inline]
    pub fn move_index(&self) -> isize {
        self.move_index
    }

    #[inline]
    fn ply(&self) -> usize {
        (self.move_index + 1) as usize
    }

    pub fn full_move(&self) -> u32 {
        let rules = self.rules();
        let offset = rules.turn_index(self.start.turn).unwrap_or(0);
        let rounds = (offset + self.ply()) / rules.turn_order.len();
        self.start.full_move + rounds as u32
    }

    fn context(&self, color: Color) -> MoveContext<'_> {
        MoveContext {
            ruleset: &self.ruleset,
            board: &self.board,
            special_rights: &self.special_rights,
            en_passant: &self.en_passant,
            enforce_checks: self.effective.checks_enforced_for(self.rules(), color),
        }
    }

    /// Legal moves of the piece on `coords`, whoever's turn it is. `None` if the square is empty.
    pub fn legal_moves(&self, coords: Coord) -> Option<PieceMoves> {
        let piece = self.board.piece(coords)?;
        Some(legal_moves(&self.context(piece.ty.color), piece))
    }

    /// Every legal move of the side to move, slides expanded inside `bbox`.
    pub fn all_legal_moves_within(&self, bbox: &BoundingBox) -> Vec<(Piece, Destination)> {
        let ctx = self.context(self.turn);
        self.board
            .pieces_of_color(self.turn)
            .flat_map(|p| {
                legal_moves(&ctx, p)
                    .expand_within(p.coords, bbox)
                    .into_iter()
                    .map(move |d| (p, d))
            })
            .collect()
    }

    fn has_any_legal_move(&self) -> bool {
        let ctx = self.context(self.turn);
        self.board
            .pieces_of_color(self.turn)
            .any(|p| !legal_moves(&ctx, p).is_empty())
    }

    /// Validates `draft` against the legal moves and applies it.
    pub fn make_move(&mut self, draft: MoveDraft) -> GameResult<&Move> {
        if self.conclusion.is_some() {
            return Err(GameError::GameOver);
        }
        let piece = self
            .board
            .piece(draft.start)
            .ok_or(GameError::NoPiece(draft.start))?;
        if piece.ty.color != self.turn {
            return Err(GameError::WrongTurn {
                piece: piece.ty,
                turn: self.turn,
            });
        }
        let illegal = GameError::IllegalMove {
            start: draft.start,
            end: draft.end,
        };
        let dest = legal_moves(&self.context(self.turn), piece)
            .destination_for(draft.start, draft.end)
            .ok_or(illegal)?;

        match (dest.promotes, draft.promotion) {
            (true, None) => return Err(GameError::MissingPromotion(draft.end)),
            (true, Some(p)) if !self.rules().may_promote_to(piece.ty.color, p) => {
                return Err(GameError::InvalidPromotion {
                    promotion: p,
                    end: draft.end,
                })
            }
            (false, Some(p)) => {
                return Err(GameError::InvalidPromotion {
                    promotion: p,
                    end: draft.end,
                })
            }
            _ => {}
        }

        let mv = self.build_move(piece, dest, draft.promotion);
        self.history.truncate(self.ply());
        self.apply(mv)?;
        let last = self.ply() - 1;
        Ok(&self.history[last].mv)
    }

    fn build_move(&self, piece: Piece, dest: Destination, promotion: Option<PieceType>) -> Move {
        let (start, end) = (piece.coords, dest.coords);
        let mut captured = self.board.piece_at(end);
        let special = match dest.special {
            Some(SpecialFlag::Castle { rook }) => self.board.piece_at(rook).map(|rook_ty| {
                let dir = Coord::new((end.x - start.x).signum(), 0);
                MoveSpecial::Castle {
                    rook: rook_ty,
                    rook_start: rook,
                    rook_end: start + dir,
                }
            }),
            Some(SpecialFlag::EnPassant { victim }) => {
                self.board.piece_at(victim).map(|victim_ty| {
                    captured = Some(victim_ty);
                    MoveSpecial::EnPassant { victim, victim_ty }
                })
            }
            Some(SpecialFlag::DoublePush) => piece.ty.color.forward().map(|f| {
                MoveSpecial::DoublePush {
                    capture_square: start + f,
                }
            }),
            None => None,
        };
        Move {
            start,
            end,
            piece: piece.ty,
            captured,
            special,
            promotion,
            check: false,
            mate: false,
        }
    }

    /// Plays `mv` at the cursor, filling in its check and mate marks.
    fn apply(&mut self, mut mv: Move) -> GameResult<()> {
        let mover = mv.piece.color;
        let mut undo = UndoRecord {
            rights_removed: Vec::new(),
            en_passant: self.en_passant.clone(),
            move_rule_ply: self.move_rule_ply,
            check_counts: self.check_counts.clone(),
            conclusion: self.conclusion,
            draw_offer: self.draw_offer,
            displaced: None,
        };

        match mv.special {
            Some(MoveSpecial::EnPassant { victim, victim_ty }) => {
                if let Some(occupant) = self.board.piece_at(mv.end) {
                    tracing::error!(
                        square = %mv.end,
                        %occupant,
                        "en passant capture square is occupied"
                    );
                    self.board.remove_piece(occupant, mv.end);
                    undo.displaced = Some(occupant);
                }
                self.board.remove_piece(victim_ty, victim);
            }
            _ => {
                if let Some(cap) = mv.captured {
                    self.board.remove_piece(cap, mv.end);
                }
            }
        }
        self.board.move_piece(mv.piece, mv.start, mv.end)?;
        if let Some(promo) = mv.promotion {
            self.board.remove_piece(mv.piece, mv.end);
            self.board.add_piece(promo, mv.end)?;
        }
        let mut touched = vec![mv.start, mv.end];
        if let Some(MoveSpecial::Castle {
            rook,
            rook_start,
            rook_end,
        }) = mv.special
        {
            self.board.move_piece(rook, rook_start, rook_end)?;
            touched.push(rook_start);
        }

        for c in touched {
            if self.special_rights.remove(&c) {
                undo.rights_removed.push(c);
            }
        }
        self.en_passant.clear();
        if let Some(MoveSpecial::DoublePush { capture_square }) = mv.special {
            self.en_passant.push(EnPassant {
                square: capture_square,
                pawn: mv.end,
                color: mover,
            });
        }
        if mv.is_capture() || mv.piece.kind == PieceKind::Pawn {
            self.move_rule_ply = 0;
        } else {
            self.move_rule_ply += 1;
        }
        if self.draw_offer.is_some_and(|o| o.by != mover) {
            self.draw_offer = None;
        }

        self.move_index += 1;
        self.turn = self.rules().turn_after(self.start.turn, self.ply());
        self.attackers = royal_attackers(&self.ruleset, &self.board, self.turn);

        mv.check = self
            .rules()
            .opponents(mover)
            .any(|c| in_check(&self.ruleset, &self.board, c));
        if mv.check {
            *self.check_counts.entry(mover).or_default() += 1;
        }
        self.position_keys.truncate(self.ply());
        self.position_keys.push(self.position_key());

        self.conclusion = self.evaluate_position(Some(&mv));
        if let Some(c) = self.conclusion {
            mv.mate = c.termination == Termination::Checkmate;
            tracing::info!(conclusion = %c, ply = self.ply(), "game concluded");
        }

        let entry = HistoryEntry { mv, undo };
        let at = self.ply() - 1;
        if at < self.history.len() {
            self.history[at] = entry;
        } else {
            self.history.push(entry);
        }
        Ok(())
    }

    pub fn undo_move(&mut self) -> GameResult<()> {
        if self.move_index < 0 {
            return Err(GameError::NothingToUndo);
        }
        let HistoryEntry { mv, undo } = self.history[self.ply() - 1].clone();

        if let Some(MoveSpecial::Castle {
            rook,
            rook_start,
            rook_end,
        }) = mv.special
        {
            self.board.move_piece(rook, rook_end, rook_start)?;
        }
        if let Some(promo) = mv.promotion {
            self.board.remove_piece(promo, mv.end);
            self.board.add_piece(mv.piece, mv.end)?;
        }
        self.board.move_piece(mv.piece, mv.end, mv.start)?;
        match mv.special {
            Some(MoveSpecial::EnPassant { victim, victim_ty }) => {
                self.board.add_piece(victim_ty, victim)?;
                if let Some(occupant) = undo.displaced {
                    self.board.add_piece(occupant, mv.end)?;
                }
            }
            _ => {
                if let Some(cap) = mv.captured {
                    self.board.add_piece(cap, mv.end)?;
                }
            }
        }

        self.special_rights.extend(undo.rights_removed);
        self.en_passant = undo.en_passant;
        self.move_rule_ply = undo.move_rule_ply;
        self.check_counts = undo.check_counts;
        self.conclusion = undo.conclusion;
        self.draw_offer = undo.draw_offer;

        self.move_index -= 1;
        self.position_keys.truncate(self.ply() + 1);
        self.turn = self.rules().turn_after(self.start.turn, self.ply());
        self.attackers = royal_attackers(&self.ruleset, &self.board, self.turn);
        Ok(())
    }

    pub fn redo_move(&mut self) -> GameResult<()> {
        let next = self.ply();
        let Some(entry) = self.history.get(next) else {
            return Err(GameError::NothingToRedo);
        };
        let mut mv = entry.mv;
        mv.check = false;
        mv.mate = false;
        self.apply(mv)
    }

    /// `color` gives up. With a single opponent that opponent wins; otherwise nobody does.
    pub fn resign(&mut self, color: Color) -> GameResult<()> {
        if self.conclusion.is_some() {
            return Err(GameError::GameOver);
        }
        let opponents: Vec<Color> = self.rules().opponents(color).collect();
        let conclusion = match opponents[..] {
            [winner] => Conclusion::win(winner, Termination::Resignation),
            _ => Conclusion::draw(Termination::Resignation),
        };
        self.conclude(conclusion);
        Ok(())
    }

    /// Offers a draw. Only the side to move may offer, and only one offer is open at a time.
    pub fn offer_draw(&mut self, color: Color) -> GameResult<()> {
        if self.conclusion.is_some() {
            return Err(GameError::GameOver);
        }
        if color != self.turn {
            return Err(GameError::DrawOffer(format!(
                "{color} may only offer a draw on its own turn"
            )));
        }
        if let Some(o) = self.draw_offer {
            return Err(GameError::DrawOffer(format!("{} already offered a draw", o.by)));
        }
        self.draw_offer = Some(DrawOffer {
            by: color,
            at_move: self.move_index,
        });
        Ok(())
    }

    pub fn accept_draw(&mut self, color: Color) -> GameResult<()> {
        if self.conclusion.is_some() {
            return Err(GameError::GameOver);
        }
        match self.draw_offer {
            None => Err(GameError::DrawOffer("no draw offer is open".to_string())),
            Some(o) if o.by == color => Err(GameError::DrawOffer(format!(
                "{color} cannot accept its own offer"
            ))),
            Some(_) => {
                self.draw_offer = None;
                self.conclude(Conclusion::draw(Termination::Agreement));
                Ok(())
            }
        }
    }

    pub fn decline_draw(&mut self) -> GameResult<()> {
        self.draw_offer
            .take()
            .map(|_| ())
            .ok_or_else(|| GameError::DrawOffer("no draw offer is open".to_string()))
    }

    /// Ends the game from outside the rules (time forfeit, abort, adjudication).
    pub fn conclude(&mut self, conclusion: Conclusion) {
        tracing::info!(%conclusion, ply = self.ply(), "game concluded");
        self.conclusion = Some(conclusion);
    }

    fn evaluate_position(&self, last_move: Option<&Move>) -> Option<Conclusion> {
        let key = self.position_keys.last().copied();
        let repetitions = self
            .position_keys
            .iter()
            .filter(|&&k| Some(k) == key)
            .count();
        let e = Evaluation {
            rules: self.rules(),
            board: &self.board,
            effective: &self.effective,
            config: &self.config,
            last_move,
            check_counts: &self.check_counts,
            start_royals: &self.start_royals,
            start_pieces: &self.start_pieces,
            turn: self.turn,
            in_check: self.is_in_check(),
            move_rule_ply: self.move_rule_ply,
            repetitions,
        };
        evaluate(&e, || self.has_any_legal_move())
    }

    /// Order-independent hash of pieces, rights, en passant squares and side to move.
    fn position_key(&self) -> u64 {
        let h = FxBuildHasher;
        let mut key = h.hash_one(self.turn);
        for p in self.board.pieces() {
            key ^= h.hash_one((0u8, p.coords, p.ty));
        }
        for c in &self.special_rights {
            key ^= h.hash_one((1u8, c));
        }
        for e in &self.en_passant {
            key ^= h.hash_one((2u8, e.square));
        }
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: i64, y: i64) -> Coord {
        Coord::new(x, y)
    }

    #[test]
    fn en_passant_onto_an_occupied_square_undoes_exactly() {
        use PieceKind::*;
        let position = BTreeMap::from([
            (c(0, 0), PieceType::new(King, Color::White)),
            (c(0, 20), PieceType::new(King, Color::Black)),
            (c(5, 5), PieceType::new(Pawn, Color::White)),
            (c(4, 5), PieceType::new(Pawn, Color::Black)),
            (c(4, 6), PieceType::new(Knight, Color::Black)),
        ]);
        let mut game = GameState::new(
            Metadata::default(),
            GameRules::classical(),
            StartSnapshot::new(position.clone(), BTreeSet::new()),
            EngineConfig::default(),
        )
        .unwrap();

        let black_pawn = PieceType::new(Pawn, Color::Black);
        let mv = Move {
            start: c(5, 5),
            end: c(4, 6),
            piece: PieceType::new(Pawn, Color::White),
            captured: Some(black_pawn),
            special: Some(MoveSpecial::EnPassant {
                victim: c(4, 5),
                victim_ty: black_pawn,
            }),
            promotion: None,
            check: false,
            mate: false,
        };
        game.apply(mv).unwrap();
        assert_eq!(game.board().piece_at(c(4, 6)), Some(PieceType::new(Pawn, Color::White)));
        assert_eq!(game.board().piece_at(c(4, 5)), None);
        assert_eq!(game.board().piece_count(), 3);

        game.undo_move().unwrap();
        assert_eq!(game.board().snapshot(), position);

        game.redo_move().unwrap();
        game.undo_move().unwrap();
        assert_eq!(game.board().snapshot(), position);
    }
}
