//! A playable game on top of the rules: moves and the stateful [`GameState`].

pub mod moves;
pub mod state;

pub use moves::{EnPassant, Move, MoveDraft, MoveSpecial};
pub use state::{DrawOffer, GameState, StartSnapshot};
