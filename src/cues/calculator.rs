//! Bar-aligned cue layout around a drop
//!
//! Tempo arithmetic:
//! - Beat duration (ms) = 60000 / BPM (500ms at 120 BPM)
//! - Bar duration (ms) = beat duration × beats per bar (2000ms at 120 BPM, 4/4)
//! - Phrase offsets are whole bars, so 16 bars at 120 BPM is 32 seconds
//!
//! Layout relative to the drop:
//!
//! ```text
//!   -32 bars     -16 bars      DROP      +16 bars     +32 bars
//!   (orange)     (yellow)     (red)       (blue)       (aqua)
//!   memory       memory       HOT         memory       memory
//! ```

use crate::error::{AutocueError, Result};
use crate::types::{CueColor, CueKind, Marker, MarkerSet, TimeSignature};

/// One entry of the fixed layout
struct CueTemplate {
    bar_offset: i32,
    label: &'static str,
    kind: CueKind,
    color: CueColor,
}

const LAYOUT: [CueTemplate; 5] = [
    CueTemplate {
        bar_offset: -32,
        label: "-32 bars",
        kind: CueKind::Secondary,
        color: CueColor::Orange,
    },
    CueTemplate {
        bar_offset: -16,
        label: "-16 bars",
        kind: CueKind::Secondary,
        color: CueColor::Yellow,
    },
    CueTemplate {
        bar_offset: 0,
        label: "Drop",
        kind: CueKind::Primary,
        color: CueColor::Red,
    },
    CueTemplate {
        bar_offset: 16,
        label: "+16 bars",
        kind: CueKind::Secondary,
        color: CueColor::Blue,
    },
    CueTemplate {
        bar_offset: 32,
        label: "+32 bars",
        kind: CueKind::Secondary,
        color: CueColor::Aqua,
    },
];

/// Duration of one beat in milliseconds
pub fn beat_duration_ms(tempo: f64) -> f64 {
    60_000.0 / tempo
}

/// Duration of one bar in milliseconds
pub fn bar_duration_ms(tempo: f64, signature: TimeSignature) -> f64 {
    beat_duration_ms(tempo) * f64::from(signature.beats_per_bar)
}

/// Compute the cue markers for a track
///
/// Only markers falling within `[0, track_duration_ms]` (inclusive on both
/// ends) are returned, sorted by time. The drop marker is present whenever
/// `drop_time_ms` lies inside the track; a drop past the end can yield an
/// empty set.
///
/// A malformed `time_signature` falls back to 4/4.
///
/// # Errors
/// `InvalidArgument` if the tempo or duration is not positive, or the drop
/// time is negative (non-finite values are rejected too). A tempo so high
/// that the bar offsets round to the same time as the drop is rejected as
/// well.
///
/// # Example
///
/// ```
/// use autocue::cues::compute_markers;
///
/// // 120 BPM, drop at 60s, 3 minute track
/// let markers = compute_markers(120.0, 60_000.0, 180_000.0, "4/4").unwrap();
/// let times: Vec<f64> = markers.iter().map(|m| m.time_ms).collect();
/// assert_eq!(times, vec![28_000.0, 60_000.0, 92_000.0, 124_000.0]);
/// ```
pub fn compute_markers(
    tempo: f64,
    drop_time_ms: f64,
    track_duration_ms: f64,
    time_signature: &str,
) -> Result<MarkerSet> {
    check_tempo(tempo)?;
    if !drop_time_ms.is_finite() || drop_time_ms < 0.0 {
        return Err(AutocueError::invalid_argument(
            "drop time",
            drop_time_ms,
            "cannot be negative",
        ));
    }
    if !track_duration_ms.is_finite() || track_duration_ms <= 0.0 {
        return Err(AutocueError::invalid_argument(
            "track duration",
            track_duration_ms,
            "must be positive",
        ));
    }

    let bar_ms = bar_duration_ms(tempo, TimeSignature::parse(time_signature));

    let times: Vec<f64> = LAYOUT
        .iter()
        .map(|cue| drop_time_ms + f64::from(cue.bar_offset) * bar_ms)
        .collect();

    // A bar shorter than the float spacing at the drop makes offsets coincide
    if times.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(AutocueError::invalid_argument(
            "tempo",
            tempo,
            "too fast for the cue offsets to stay distinct",
        ));
    }

    let mut markers: MarkerSet = LAYOUT
        .iter()
        .zip(times)
        .filter(|(_, time_ms)| (0.0..=track_duration_ms).contains(time_ms))
        .map(|(cue, time_ms)| Marker {
            time_ms,
            kind: cue.kind,
            label: cue.label.to_string(),
            color: cue.color,
        })
        .collect();

    // Offsets are distinct, so this keeps layout order
    markers.sort_by(|a, b| a.time_ms.total_cmp(&b.time_ms));

    Ok(markers)
}

pub(crate) fn check_tempo(tempo: f64) -> Result<()> {
    if tempo.is_finite() && tempo > 0.0 {
        Ok(())
    } else {
        Err(AutocueError::invalid_argument("tempo", tempo, "BPM must be positive"))
    }
}
