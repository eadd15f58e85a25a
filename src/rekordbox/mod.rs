//! Rekordbox XML library I/O
//!
//! The reader builds the owned [`Document`](crate::types::Document) model;
//! the writer serializes it back, keeping every attribute and element the
//! cue editing does not touch.

pub mod reader;
pub mod schema;
pub mod uri;
pub mod writer;

pub use reader::{parse_document, read_document};
pub use writer::{export_document, timestamped_output_path, write_document};
