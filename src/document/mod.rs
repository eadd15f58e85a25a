//! In-place cue editing on a single track record

pub mod mutator;

pub use mutator::{insert_primary, insert_secondary, remove_markers, resolve_color, MAX_HOT_CUES};
