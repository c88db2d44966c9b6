//! Plain data shared by every layer of the engine.
//!
//! - [`coord`]: unbounded `i64` coordinates, vector helpers and bounding boxes.
//! - [`piece`]: colors, piece kinds and the tagged `(kind, color)` [`piece::PieceType`].
//! - [`piece_list`]: stable-index per-type piece storage.

pub mod coord;
pub mod piece;
pub mod piece_list;
