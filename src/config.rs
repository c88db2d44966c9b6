//! Engine tuning knobs.
//!
//! The checkmate decision points (piece-count threshold, colinear-slide test) are heuristics, so
//! they live here rather than as constants buried in the evaluator.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::coord::Coord;

fn default_checkmate_piece_threshold() -> usize {
    50_000
}

fn default_disable_checkmate_on_colinear() -> bool {
    true
}

fn default_insufficient_material_max_pieces() -> usize {
    8
}

fn default_repetition_count() -> usize {
    3
}

fn default_interaction_margin() -> i64 {
    8
}

fn default_hill_squares() -> Vec<Coord> {
    vec![
        Coord::new(4, 4),
        Coord::new(5, 4),
        Coord::new(4, 5),
        Coord::new(5, 5),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Positions with at least this many pieces play royal capture instead of checkmate.
    #[serde(default = "default_checkmate_piece_threshold")]
    pub checkmate_piece_threshold: usize,

    /// Play royal capture when two slide steps of the variant lie on one line family.
    #[serde(default = "default_disable_checkmate_on_colinear")]
    pub disable_checkmate_on_colinear: bool,

    /// Insufficient material is only considered below this many non-obstacle pieces.
    #[serde(default = "default_insufficient_material_max_pieces")]
    pub insufficient_material_max_pieces: usize,

    /// Occurrences of one position that draw the game.
    #[serde(default = "default_repetition_count")]
    pub repetition_count: usize,

    /// Squares around the starting position's bounding box that slide expansion may visit.
    #[serde(default = "default_interaction_margin")]
    pub interaction_margin: i64,

    /// King-of-the-hill target squares.
    #[serde(default = "default_hill_squares")]
    pub hill_squares: Vec<Coord>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            checkmate_piece_threshold: default_checkmate_piece_threshold(),
            disable_checkmate_on_colinear: default_disable_checkmate_on_colinear(),
            insufficient_material_max_pieces: default_insufficient_material_max_pieces(),
            repetition_count: default_repetition_count(),
            interaction_margin: default_interaction_margin(),
            hill_squares: default_hill_squares(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Reads a JSON config file; missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, String> {
        let bytes = std::fs::read(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        serde_json::from_slice(&bytes).map_err(|e| format!("invalid config {}: {e}", path.display()))
    }
}
