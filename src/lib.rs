//! autocue - Bar-aligned cue points for Rekordbox libraries
//!
//! Takes a Rekordbox XML export plus one user-marked drop time per track,
//! and writes a hot cue on the drop with memory cues 16 and 32 bars either
//! side of it.
//!
//! # Architecture
//!
//! The library is organized into several key modules:
//!
//! - `config`: CLI argument parsing, runtime settings, drop-time input
//! - `cues`: Tempo arithmetic, grid snapping and cue validation (pure)
//! - `document`: Cue insertion/removal on a single track record
//! - `rekordbox`: Reading and writing the Rekordbox XML document
//! - `pipeline`: Batch orchestration with per-track outcomes
//! - `export`: JSON batch report
//!
//! # Example
//!
//! ```no_run
//! use autocue::{config::DropPoint, pipeline, rekordbox};
//! use std::path::Path;
//!
//! let document = rekordbox::read_document(Path::new("rekordbox.xml")).expect("Load failed");
//! let drops = [DropPoint::new("101", 60_000.0)];
//! let (document, result) = pipeline::process_batch(document, &drops, &Default::default());
//! let path = rekordbox::export_document(&document, Path::new("output")).expect("Export failed");
//! println!("Added {} cues, wrote {}", result.total_markers_added, path.display());
//! ```

pub mod config;
pub mod cues;
pub mod document;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod rekordbox;
pub mod types;

// Re-export key types at crate root
pub use error::{AutocueError, Result};
pub use pipeline::{BatchOptions, BatchResult, TrackOutcome};
pub use types::{CueColor, CueKind, Document, Marker, MarkerSet, TrackRecord};
