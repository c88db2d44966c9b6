//! Error types for the engine.
//!
//! Storage, rule validation, notation parsing and game-state operations each get their own
//! enum; [`GameError`] wraps the others for callers that drive a whole game.

use thiserror::Error;

use crate::core::coord::{Coord, CoordParseError};
use crate::core::piece::{Color, PieceParseError, PieceType};

/// Errors raised by [`Board`](crate::board::Board) mutations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Target square already holds a piece
    #[error("square {0} is already occupied")]
    Occupied(Coord),

    /// No piece of the given type stands on the square
    #[error("no {ty} piece at {coords}")]
    NotFound { ty: PieceType, coords: Coord },
}

/// Invalid game rules, rejected before a game is built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    /// `slideLimit` was not a positive integer or `"Infinity"`
    #[error("invalid slideLimit {value}: expected a positive integer or \"Infinity\"")]
    InvalidSlideLimit { value: String },

    /// Win condition not understood for this color
    #[error("unsupported win condition {condition:?} for {color}")]
    UnsupportedWinCondition { color: Color, condition: String },

    /// Turn order has no colors
    #[error("turnOrder must not be empty")]
    EmptyTurnOrder,

    /// Neutral pieces never take a turn
    #[error("turnOrder must not contain neutral")]
    NeutralInTurnOrder,

    /// Piece kind name is not known
    #[error("unknown piece kind {0:?}")]
    UnknownPieceKind(String),

    /// `moveRule` limit was zero or malformed
    #[error("invalid moveRule {0:?}")]
    InvalidMoveRule(String),
}

/// Malformed ICN or long-format input.
#[derive(Error, Debug)]
pub enum NotationError {
    /// Metadata tag could not be parsed
    #[error("malformed tag: {0}")]
    Tag(String),

    /// Token did not match what the grammar expects at this position
    #[error("unexpected token {token:?}, expected {expected}")]
    UnexpectedToken { token: String, expected: &'static str },

    #[error(transparent)]
    Coord(#[from] CoordParseError),

    #[error(transparent)]
    Piece(#[from] PieceParseError),

    /// Move token could not be parsed
    #[error("malformed move {0:?}")]
    Move(String),

    /// Neither an inline position nor a known variant was given
    #[error("no starting position and no known variant (Variant tag: {variant:?})")]
    MissingPosition { variant: Option<String> },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Rules(#[from] RulesError),

    /// The legacy upgrade produced a document missing a required field
    #[error("legacy upgrade left required field {field} missing")]
    UpgradeInvariant { field: &'static str },

    /// Date/time metadata could not be read
    #[error("malformed date/time {0:?}")]
    Date(String),
}

/// Errors from driving a [`GameState`](crate::game::GameState).
#[derive(Error, Debug)]
pub enum GameError {
    #[error(transparent)]
    Board(#[from] BoardError),

    #[error(transparent)]
    Rules(#[from] RulesError),

    #[error(transparent)]
    Notation(#[from] NotationError),

    /// No piece stands on the start square
    #[error("no piece at {0}")]
    NoPiece(Coord),

    /// Piece does not belong to the side to move
    #[error("{piece} cannot move, it is {turn}'s turn")]
    WrongTurn { piece: PieceType, turn: Color },

    /// Destination is not among the piece's legal moves
    #[error("illegal move {start} > {end}")]
    IllegalMove { start: Coord, end: Coord },

    /// Move reaches a promotion rank without a promotion choice
    #[error("move to {0} must promote")]
    MissingPromotion(Coord),

    /// Promotion given where none is allowed, or to a disallowed type
    #[error("invalid promotion to {promotion} at {end}")]
    InvalidPromotion { promotion: PieceType, end: Coord },

    /// The game has already concluded
    #[error("game is over")]
    GameOver,

    #[error("no move to undo")]
    NothingToUndo,

    #[error("no move to redo")]
    NothingToRedo,

    /// A recorded move failed while replaying a move list
    #[error("move {index} failed to replay: {source}")]
    Replay {
        index: usize,
        #[source]
        source: Box<GameError>,
    },

    /// Variant name not in the built-in registry
    #[error("unknown variant {0:?}")]
    UnknownVariant(String),

    /// Draw offer or answer made out of turn
    #[error("draw offer rejected: {0}")]
    DrawOffer(String),
}

/// Result type alias for game operations
pub type GameResult<T> = Result<T, GameError>;
