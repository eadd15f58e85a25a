//! Cue position calculation
//!
//! Pure, tempo-relative time arithmetic: deriving the marker layout around a
//! drop, snapping times to the beat grid, and sanity-checking marker sets.

pub mod calculator;
pub mod grid;
pub mod time;
pub mod validation;

pub use calculator::{bar_duration_ms, beat_duration_ms, compute_markers};
pub use grid::snap_to_grid;
pub use time::{format_time, parse_time};
pub use validation::{validate, Validation};
