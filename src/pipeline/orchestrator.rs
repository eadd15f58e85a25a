//! Pipeline orchestration
//!
//! Loads the library, applies each drop to its track, and exports the
//! modified document. A problem with one track never stops the batch: it is
//! recorded as that track's outcome and processing moves on. Only loading
//! and the final export can fail the run.

use crate::config::{load_drops_file, DropPoint, Settings};
use crate::cues::{self, format_time};
use crate::document;
use crate::error::{AutocueError, Result};
use crate::export;
use crate::rekordbox;
use crate::types::{CueKind, Document, MarkerSet, TrackRecord};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// What happened to one track in a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrackOutcome {
    /// At least one cue was written
    Success { markers_added: usize },
    /// The track ID is not in the collection
    NotFound,
    /// Tempo, drop time or duration was unusable
    CalculationFailed { reason: String },
    /// A computed cue fell outside the track
    ValidationFailed,
    /// Nothing could be inserted
    Failed,
}

impl TrackOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TrackOutcome::Success { .. })
    }
}

impl From<&AutocueError> for TrackOutcome {
    fn from(err: &AutocueError) -> Self {
        match err {
            AutocueError::TrackNotFound(_) => TrackOutcome::NotFound,
            AutocueError::ValidationFailed { .. } => TrackOutcome::ValidationFailed,
            e if e.is_recoverable() => TrackOutcome::CalculationFailed { reason: e.to_string() },
            _ => TrackOutcome::Failed,
        }
    }
}

/// Accumulated outcome of a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchResult {
    pub per_track: BTreeMap<String, TrackOutcome>,
    pub total_markers_added: usize,
    pub warnings: Vec<String>,
}

impl BatchResult {
    pub fn successful(&self) -> usize {
        self.per_track.values().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.per_track.len() - self.successful()
    }

    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }
}

/// Per-track processing options
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    /// Remove existing hot cues before inserting
    pub remove_primary: bool,
    /// Remove existing memory cues before inserting
    pub remove_secondary: bool,
    /// Time signature for bar lengths ("4/4" when malformed)
    pub time_signature: String,
    /// Snap each drop to this grid before calculating
    pub snap_resolution: Option<u32>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            remove_primary: false,
            remove_secondary: true,
            time_signature: "4/4".to_string(),
            snap_resolution: None,
        }
    }
}

/// Run summary returned to the CLI
#[derive(Debug)]
pub struct RunSummary {
    /// Where the modified library was written (None for dry runs / nothing to do)
    pub output_path: Option<PathBuf>,
    /// Where the JSON report was written, if requested
    pub report_path: Option<PathBuf>,
    pub result: BatchResult,
}

/// Run the full batch: load, apply drops, export
pub fn run(settings: &Settings) -> Result<RunSummary> {
    use std::time::Instant;

    let pipeline_start = Instant::now();

    // Phase 1: Load
    let document = rekordbox::read_document(&settings.input)?;
    let drops = resolve_drops(&document, settings)?;

    if drops.is_empty() {
        info!("No drop markers to apply, nothing to do");
        return Ok(RunSummary {
            output_path: None,
            report_path: None,
            result: BatchResult::default(),
        });
    }

    let options = settings.batch_options();

    // Dry run mode - show cues and exit
    if settings.dry_run {
        print_dry_run(&document, &drops, &options);
        return Ok(RunSummary {
            output_path: None,
            report_path: None,
            result: BatchResult::default(),
        });
    }

    // Phase 2: Apply cues
    info!("Applying drops to {} tracks", drops.len());
    let progress_bar = settings.show_progress.then(|| progress_bar(drops.len()));
    let (document, mut result) = process_batch_with_progress(document, &drops, &options, progress_bar.as_ref());

    // Phase 3: Export (a failure here discards the batch)
    let output_path = match &settings.output_file {
        Some(path) => {
            rekordbox::write_document(&document, path)?;
            path.clone()
        }
        None => rekordbox::export_document(&document, &settings.output_dir)?,
    };

    // The library is already written, so a failed report only warns
    let report_path = if settings.write_report {
        let path = output_path.with_extension("report.json");
        match export::write_report(&result, &settings.input, &output_path, &path) {
            Ok(()) => Some(path),
            Err(e) => {
                result.warn(format!("Failed to write batch report: {}", e));
                None
            }
        }
    } else {
        None
    };

    print_import_instructions(&output_path, result.successful());

    info!(
        "Total pipeline time: {:.2}s",
        pipeline_start.elapsed().as_secs_f64()
    );

    Ok(RunSummary {
        output_path: Some(output_path),
        report_path,
        result,
    })
}

/// Apply drops to a document
///
/// Each drop is handled independently; failures are recorded in the
/// returned [`BatchResult`] and never abort the loop. A track ID listed more
/// than once is processed once, with its last drop time. The document is
/// handed back for the caller to persist.
pub fn process_batch(document: Document, drops: &[DropPoint], options: &BatchOptions) -> (Document, BatchResult) {
    process_batch_with_progress(document, drops, options, None)
}

fn process_batch_with_progress(
    mut document: Document,
    drops: &[DropPoint],
    options: &BatchOptions,
    progress_bar: Option<&ProgressBar>,
) -> (Document, BatchResult) {
    let mut result = BatchResult::default();

    for drop in dedupe_drops(drops) {
        let processed = match document.find_track_mut(&drop.track_id) {
            Some(track) => {
                if let Some(pb) = progress_bar {
                    pb.set_message(track.display_name());
                }
                process_track(track, drop.time_ms, options, &mut result)
            }
            None => Err(AutocueError::TrackNotFound(drop.track_id.clone())),
        };

        let outcome = match processed {
            Ok(0) => TrackOutcome::Failed,
            Ok(markers_added) => {
                result.total_markers_added += markers_added;
                TrackOutcome::Success { markers_added }
            }
            Err(e) => {
                error!("Track {}: {}", drop.track_id, e);
                if let AutocueError::TrackNotFound(id) = &e {
                    result.warnings.push(format!("Track ID {} not found in XML", id));
                }
                TrackOutcome::from(&e)
            }
        };
        result.per_track.insert(drop.track_id, outcome);

        if let Some(pb) = progress_bar {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Cues applied");
    }

    info!(
        "Batch complete: {} successful, {} failed, {} cues added",
        result.successful(),
        result.failed(),
        result.total_markers_added
    );

    (document, result)
}

/// Collapse repeated track IDs, keeping the last drop at the first ID's position
fn dedupe_drops(drops: &[DropPoint]) -> Vec<DropPoint> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut unique: Vec<DropPoint> = Vec::with_capacity(drops.len());

    for drop in drops {
        match index.get(drop.track_id.as_str()) {
            Some(&i) => {
                warn!(
                    "Track ID {} has more than one drop, using {}",
                    drop.track_id,
                    format_time(drop.time_ms)
                );
                unique[i].time_ms = drop.time_ms;
            }
            None => {
                index.insert(&drop.track_id, unique.len());
                unique.push(drop.clone());
            }
        }
    }

    unique
}

/// Compute and validate, then rewrite one track's cues
///
/// Returns the number of cues inserted. Insertion problems are warnings;
/// calculation and validation failures are returned as errors.
fn process_track(
    track: &mut TrackRecord,
    drop_time_ms: f64,
    options: &BatchOptions,
    result: &mut BatchResult,
) -> Result<usize> {
    let track_name = track.display_name();
    debug!(
        "Processing {} ({:.2} BPM, {}), drop at {}",
        track_name,
        track.tempo,
        format_time(track.duration_ms),
        format_time(drop_time_ms)
    );

    let markers = plan_markers(track, drop_time_ms, options).map_err(|e| {
        result
            .warnings
            .push(format!("Failed to calculate cues for track '{}': {}", track_name, e));
        e
    })?;

    let validation = cues::validate(&markers, track.duration_ms, track.tempo);
    for warning in &validation.warnings {
        result.warn(format!("Track '{}': {}", track_name, warning));
    }
    if !validation.valid {
        return Err(AutocueError::ValidationFailed {
            track: track_name,
            warnings: validation.warnings,
        });
    }

    if options.remove_primary || options.remove_secondary {
        document::remove_markers(track, options.remove_primary, options.remove_secondary);
    }

    let mut markers_added = 0;
    for marker in &markers {
        let inserted = match marker.kind {
            CueKind::Primary => {
                document::insert_primary(track, marker.time_ms, &marker.label, marker.color.name(), None)
                    .map(|slot| slot.is_some())
            }
            CueKind::Secondary => {
                document::insert_secondary(track, marker.time_ms, &marker.label, marker.color.name())
                    .map(|()| true)
            }
        };

        match inserted {
            Ok(true) => {
                debug!(
                    "  + {}: {} at {} ({})",
                    marker.kind.display_name(),
                    marker.label,
                    format_time(marker.time_ms),
                    marker.color.name()
                );
                markers_added += 1;
            }
            Ok(false) => result.warn(format!(
                "No free hot cue slot for '{}' on track '{}'",
                marker.label, track_name
            )),
            Err(e) => result.warn(format!(
                "Failed to insert cue '{}' for track '{}': {}",
                marker.label, track_name, e
            )),
        }
    }

    Ok(markers_added)
}

/// Markers for a track's drop, snapping the drop first if configured
pub fn plan_markers(track: &TrackRecord, drop_time_ms: f64, options: &BatchOptions) -> Result<MarkerSet> {
    let drop_time_ms = match options.snap_resolution {
        Some(resolution) => {
            let snapped = cues::snap_to_grid(drop_time_ms, track.tempo, resolution)?;
            if (0.0..=track.duration_ms).contains(&snapped) {
                snapped
            } else {
                debug!("Snapped drop {:.0}ms is outside the track, keeping {:.0}ms", snapped, drop_time_ms);
                drop_time_ms
            }
        }
        None => drop_time_ms,
    };

    cues::compute_markers(track.tempo, drop_time_ms, track.duration_ms, &options.time_signature)
}

/// Combine command-line and file drops, then apply the playlist filter
fn resolve_drops(document: &Document, settings: &Settings) -> Result<Vec<DropPoint>> {
    let mut drops = settings.drops.clone();
    if let Some(path) = &settings.drops_file {
        drops.extend(load_drops_file(path)?);
    }
    let drops = dedupe_drops(&drops);

    let Some(name) = &settings.playlist else {
        return Ok(drops);
    };

    if document.playlist(name).is_none() {
        return Err(AutocueError::ConfigError(format!(
            "Playlist '{}' not found. Available playlists: {}",
            name,
            document.playlist_names().join(", ")
        )));
    }

    let members: HashSet<&str> = document
        .playlist_tracks(name)
        .into_iter()
        .map(|t| t.id.as_str())
        .collect();

    let (kept, skipped): (Vec<_>, Vec<_>) = drops
        .into_iter()
        .partition(|d| members.contains(d.track_id.as_str()));

    if !skipped.is_empty() {
        info!(
            "Skipping {} drops for tracks outside playlist '{}'",
            skipped.len(),
            name
        );
    }

    Ok(kept)
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb
}

/// Dry run mode - print the cue plan per track without touching the document
fn print_dry_run(document: &Document, drops: &[DropPoint], options: &BatchOptions) {
    println!();
    println!("=== DRY RUN MODE ===");
    println!();

    let mut planned = 0;
    for drop in drops {
        let Some(track) = document.find_track(&drop.track_id) else {
            println!("Track ID {}: not found", drop.track_id);
            println!();
            continue;
        };

        println!(
            "{} ({:.2} BPM, {})",
            track.display_name(),
            track.tempo,
            format_time(track.duration_ms)
        );

        match plan_markers(track, drop.time_ms, options) {
            Ok(markers) => {
                for marker in &markers {
                    println!(
                        "  {}  {:<10}  {:<8}  ({})",
                        format_time(marker.time_ms),
                        marker.kind.display_name(),
                        marker.label,
                        marker.color.name()
                    );
                }
                let validation = cues::validate(&markers, track.duration_ms, track.tempo);
                for warning in &validation.warnings {
                    println!("  ! {}", warning);
                }
                planned += markers.len();
            }
            Err(e) => println!("  cannot calculate cues: {}", e),
        }
        println!();
    }

    println!("─────────────────────────────────────────");
    println!("Would add {} cues across {} tracks", planned, drops.len());
    println!();
}

/// Print every playlist with its tracks
pub fn list_playlists(settings: &Settings) -> Result<()> {
    let document = rekordbox::read_document(&settings.input)?;

    let names = document.playlist_names();
    if names.is_empty() {
        println!("No playlists in {}", settings.input.display());
        return Ok(());
    }

    for name in names {
        let tracks = document.playlist_tracks(name);
        println!("{} ({} tracks)", name, tracks.len());
        for track in tracks {
            let audio = document
                .track_audio_path(&track.id)
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  [{}] {}  {:.1} BPM  {}  {}",
                track.id,
                track.display_name(),
                track.tempo,
                format_time(track.duration_ms),
                audio
            );
        }
        println!();
    }

    Ok(())
}

/// Print instructions for importing into Rekordbox
fn print_import_instructions(xml_path: &std::path::Path, track_count: usize) {
    println!();
    println!("✓ Wrote cues for {} tracks to {}", track_count, xml_path.display());
    println!();
    println!("┌─────────────────────────────────────────────────────────────────┐");
    println!("│ Rekordbox Import Instructions                                   │");
    println!("├─────────────────────────────────────────────────────────────────┤");
    println!("│ 1. Preferences → Advanced → rekordbox xml: select this file     │");
    println!("│ 2. In the tree view, open \"rekordbox xml\" → All Tracks          │");
    println!("│ 3. Select the tracks, right-click → \"Import To Collection\"      │");
    println!("│                                                                 │");
    println!("│ ⚠ Importing overwrites the cues of tracks already in rekordbox  │");
    println!("└─────────────────────────────────────────────────────────────────┘");
    println!();
}
