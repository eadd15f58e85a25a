//! Cue insertion and removal on a `TrackRecord`
//!
//! Stateless: everything is read from and written to the track passed in.
//! Hot cues (Primary) share an 8-slot namespace per track; memory cues
//! (Secondary) are unbounded.

use crate::error::{AutocueError, Result};
use crate::types::{CueColor, MarkKind, PositionMark, Rgb, TrackRecord};
use tracing::{debug, warn};

/// Hot cue slots A-H
pub const MAX_HOT_CUES: u8 = 8;

/// Remove cues of the selected kinds, returning how many were removed
pub fn remove_markers(track: &mut TrackRecord, remove_primary: bool, remove_secondary: bool) -> usize {
    let before = track.markers.len();
    track.markers.retain(|mark| match mark.kind {
        MarkKind::Primary { .. } => !remove_primary,
        MarkKind::Secondary => !remove_secondary,
    });
    let removed = before - track.markers.len();

    if removed > 0 {
        debug!("Removed {} existing cues from track {}", removed, track.id);
    }
    removed
}

/// Resolve a palette colour name, substituting white for unknown names
pub fn resolve_color(name: &str) -> Rgb {
    match CueColor::from_name(name) {
        Some(color) => color.rgb(),
        None => {
            warn!("Unknown cue color '{}', using white", name);
            Rgb::WHITE
        }
    }
}

/// Append a memory cue
///
/// # Errors
/// `InvalidArgument` if `time_ms` is negative or not finite.
pub fn insert_secondary(track: &mut TrackRecord, time_ms: f64, label: &str, color: &str) -> Result<()> {
    let mark = position_mark(time_ms, label, color, MarkKind::Secondary)?;
    track.markers.push(mark);
    Ok(())
}

/// Add a hot cue, returning the slot it was written to
///
/// With `slot = None` the lowest free slot is used. When all 8 slots are
/// taken nothing is inserted and `Ok(None)` is returned. An explicit slot
/// that is already in use is overwritten.
///
/// # Errors
/// `InvalidArgument` if `time_ms` is negative or not finite, or an explicit
/// slot is outside 0-7.
pub fn insert_primary(
    track: &mut TrackRecord,
    time_ms: f64,
    label: &str,
    color: &str,
    slot: Option<u8>,
) -> Result<Option<u8>> {
    let slot = match slot {
        Some(slot) if slot >= MAX_HOT_CUES => {
            return Err(AutocueError::invalid_argument(
                "hot cue slot",
                slot,
                format!("must be between 0 and {}", MAX_HOT_CUES - 1),
            ));
        }
        Some(slot) => slot,
        None => match lowest_free_slot(track) {
            Some(slot) => slot,
            None => {
                warn!(
                    "All {} hot cue slots are in use on track {}, skipping '{}'",
                    MAX_HOT_CUES, track.id, label
                );
                return Ok(None);
            }
        },
    };

    let mark = position_mark(time_ms, label, color, MarkKind::Primary { slot })?;

    let replaced = track.markers.len();
    track.markers.retain(|m| m.kind.slot() != Some(slot));
    if track.markers.len() != replaced {
        debug!("Replacing hot cue in slot {} on track {}", slot, track.id);
    }

    track.markers.push(mark);
    Ok(Some(slot))
}

fn lowest_free_slot(track: &TrackRecord) -> Option<u8> {
    let used: Vec<u8> = track.used_slots().collect();
    (0..MAX_HOT_CUES).find(|slot| !used.contains(slot))
}

fn position_mark(time_ms: f64, label: &str, color: &str, kind: MarkKind) -> Result<PositionMark> {
    if !time_ms.is_finite() || time_ms < 0.0 {
        return Err(AutocueError::invalid_argument(
            "cue time",
            time_ms,
            "must be a non-negative number of milliseconds",
        ));
    }

    Ok(PositionMark {
        name: label.to_string(),
        kind,
        // Millisecond precision, i.e. 3 decimals of seconds
        start_seconds: time_ms.round() / 1000.0,
        end_seconds: None,
        mark_type: PositionMark::TYPE_CUE,
        color: Some(resolve_color(color)),
    })
}
