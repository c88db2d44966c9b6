//! Move rules on top of the board.
//!
//! - [`ruleset`]: per-game move tables and the special-move handler table.
//! - [`movegen`]: pseudo-legal jumps and symbolic slide rays.
//! - [`special`]: castling and pawn moves.
//! - [`attacks`]: who attacks a square.
//! - [`legal`]: removing moves that leave a royal attacked.
//! - [`wincond`] and [`insufficient`]: deciding when the game is over.

pub mod attacks;
pub mod insufficient;
pub mod legal;
pub mod movegen;
pub mod ruleset;
pub mod special;
pub mod wincond;
