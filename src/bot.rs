//! A uniformly random legal-move picker, for smoke-testing variants and filling games.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::core::coord::{BoundingBox, Coord};
use crate::core::piece::PieceType;
use crate::game::moves::MoveDraft;
use crate::game::state::GameState;

#[derive(Debug, Clone)]
pub struct RandomBot {
    rng: StdRng,
}

impl RandomBot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Squares slides are expanded into: the start position's box grown by the interaction margin.
    pub fn window(game: &GameState) -> Option<BoundingBox> {
        let bbox = game.start().bounding_box().or_else(|| game.board().bounding_box())?;
        Some(bbox.expanded(game.config().interaction_margin))
    }

    /// A random legal move for the side to move, `None` when there is none or the game is over.
    pub fn pick(&mut self, game: &GameState) -> Option<MoveDraft> {
        if game.conclusion().is_some() {
            return None;
        }
        let mut window = Self::window(game)?;
        // Pieces may have left the start box; keep them reachable.
        if let Some(now) = game.board().bounding_box() {
            window.include(Coord::new(now.left, now.bottom));
            window.include(Coord::new(now.right, now.top));
        }
        let moves = game.all_legal_moves_within(&window);
        let &(piece, dest) = moves.choose(&mut self.rng)?;

        let mut draft = MoveDraft::new(piece.coords, dest.coords);
        if dest.promotes {
            let color = piece.ty.color;
            let kinds = game.rules().promotions_allowed.get(&color)?;
            let &kind = kinds.choose(&mut self.rng)?;
            draft = draft.promoting(PieceType::new(kind, color));
        }
        Some(draft)
    }
}
