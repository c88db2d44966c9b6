//! A rules engine for chess on an unbounded board: piece storage with line buckets, legal-move
//! generation with symbolic slides, special moves, check and win-condition evaluation, and the
//! ICN notation codec.

pub mod board;
pub mod bot;
pub mod chess;
pub mod config;
pub mod core;
pub mod error;
pub mod game;
pub mod notation;
pub mod rules;

pub use board::Board;
pub use config::EngineConfig;
pub use core::coord::Coord;
pub use core::piece::{Color, PieceKind, PieceType};
pub use error::{GameError, GameResult, NotationError};
pub use game::{GameState, MoveDraft};
