//! Variant definitions: what each piece kind can do and which rules a game is played under.

pub mod game_rules;
pub mod moveset;
pub mod variants;
