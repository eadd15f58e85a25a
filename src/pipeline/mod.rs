//! Batch processing pipeline

pub mod orchestrator;

pub use orchestrator::{
    list_playlists, plan_markers, process_batch, run, BatchOptions, BatchResult, RunSummary,
    TrackOutcome,
};
