//! Game notation.
//!
//! - [`long_format`]: the JSON game object and its move records.
//! - [`icn`]: the compact ICN string, both directions.
//! - [`legacy`]: detection and upgrade of old gamefile JSON.
//! - [`metadata`]: tags, clock values and result strings.

pub mod icn;
pub mod legacy;
pub mod long_format;
pub mod metadata;

pub use icn::{decode, encode, IcnOptions};
pub use long_format::{CheckMark, LongFormat, MoveRecord};
pub use metadata::{ClockValue, Metadata, ResultTag};

use crate::error::NotationError;

/// Reads a game in any supported form: ICN, current JSON or legacy JSON.
pub fn parse_any(input: &str) -> Result<LongFormat, NotationError> {
    if input.trim_start().starts_with('{') {
        legacy::load_json(input)
    } else {
        decode(input)
    }
}
