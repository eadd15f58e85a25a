//! Sanity checks for a marker set
//!
//! Only bounds violations make a set invalid. Everything else (spacing,
//! track length, tempo range) is advisory and reported as a warning.

use super::calculator::bar_duration_ms;
use super::time::format_time;
use crate::types::{Marker, TimeSignature};

/// Cues closer than this are hard to tell apart on the waveform
const MIN_CUE_SPACING_MS: f64 = 1000.0;

/// Bars spanned by the full layout (32 before the drop + 32 after)
const STANDARD_PATTERN_BARS: f64 = 64.0;

/// Typical tempo range; outside it the BPM is probably half/double time
const TYPICAL_TEMPO: std::ops::RangeInclusive<f64> = 60.0..=200.0;

/// Outcome of [`validate`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Validation {
    /// False only when a marker lies outside the track
    pub valid: bool,
    /// Human-readable diagnostics, hard and soft, in check order
    pub warnings: Vec<String>,
}

/// Validate a marker list against a track
///
/// Works on any marker list, not only [`compute_markers`](super::compute_markers)
/// output, so bounds are checked again here.
pub fn validate(markers: &[Marker], track_duration_ms: f64, tempo: f64) -> Validation {
    let mut warnings = Vec::new();
    let mut valid = true;

    if markers.is_empty() {
        warnings.push("No markers generated".to_string());
        return Validation { valid, warnings };
    }

    for marker in markers {
        if marker.time_ms < 0.0 {
            warnings.push(format!(
                "Cue '{}' at {} is before track start",
                marker.label,
                format_time(marker.time_ms)
            ));
            valid = false;
        }
        if marker.time_ms > track_duration_ms {
            warnings.push(format!(
                "Cue '{}' at {} is after track end",
                marker.label,
                format_time(marker.time_ms)
            ));
            valid = false;
        }
    }

    let mut sorted: Vec<&Marker> = markers.iter().collect();
    sorted.sort_by(|a, b| a.time_ms.total_cmp(&b.time_ms));
    for pair in sorted.windows(2) {
        let spacing = pair[1].time_ms - pair[0].time_ms;
        if spacing < MIN_CUE_SPACING_MS {
            warnings.push(format!(
                "Cues '{}' and '{}' are too close together ({:.0}ms apart, minimum {:.0}ms recommended)",
                pair[0].label, pair[1].label, spacing, MIN_CUE_SPACING_MS
            ));
        }
    }

    if tempo > 0.0 {
        let standard_span_ms = bar_duration_ms(tempo, TimeSignature::COMMON) * STANDARD_PATTERN_BARS;
        if standard_span_ms > track_duration_ms {
            warnings.push(format!(
                "Track may be too short for full cue pattern. Standard pattern needs ~{:.0}s, track is {:.0}s",
                standard_span_ms / 1000.0,
                track_duration_ms / 1000.0
            ));
        }
    }

    if !TYPICAL_TEMPO.contains(&tempo) {
        warnings.push(format!(
            "BPM ({:.1}) is outside typical range (60-200). Verify BPM is correct.",
            tempo
        ));
    }

    Validation { valid, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CueColor, CueKind};

    fn marker(time_ms: f64, label: &str) -> Marker {
        Marker {
            time_ms,
            kind: CueKind::Secondary,
            label: label.to_string(),
            color: CueColor::Blue,
        }
    }

    #[test]
    fn test_empty_is_valid_with_note() {
        let v = validate(&[], 180_000.0, 120.0);
        assert!(v.valid);
        assert_eq!(v.warnings, vec!["No markers generated".to_string()]);
    }

    #[test]
    fn test_valid_markers_no_warnings() {
        let markers = [marker(28_000.0, "a"), marker(60_000.0, "b"), marker(92_000.0, "c")];
        let v = validate(&markers, 180_000.0, 120.0);
        assert!(v.valid);
        assert!(v.warnings.is_empty(), "{:?}", v.warnings);
    }

    #[test]
    fn test_marker_before_start() {
        let v = validate(&[marker(-4_000.0, "early")], 180_000.0, 120.0);
        assert!(!v.valid);
        assert!(v.warnings.iter().any(|w| w.contains("before track start")));
    }

    #[test]
    fn test_marker_after_end() {
        let v = validate(&[marker(200_000.0, "late")], 180_000.0, 120.0);
        assert!(!v.valid);
        assert!(v.warnings.iter().any(|w| w.contains("after track end")));
    }

    #[test]
    fn test_close_markers_are_soft() {
        let markers = [marker(60_000.0, "a"), marker(60_500.0, "b")];
        let v = validate(&markers, 180_000.0, 120.0);
        assert!(v.valid);
        assert!(v.warnings.iter().any(|w| w.contains("too close together")));
    }

    #[test]
    fn test_spacing_checked_in_time_order() {
        // Unsorted input: 10s and 10.2s are adjacent once sorted
        let markers = [marker(10_200.0, "b"), marker(50_000.0, "c"), marker(10_000.0, "a")];
        let v = validate(&markers, 180_000.0, 120.0);
        assert!(v.warnings.iter().any(|w| w.contains("'a' and 'b'")));
    }

    #[test]
    fn test_short_track_is_soft() {
        // 64 bars at 120 BPM = 128s
        let v = validate(&[marker(30_000.0, "a")], 60_000.0, 120.0);
        assert!(v.valid);
        assert!(v.warnings.iter().any(|w| w.contains("too short")));
    }

    #[test]
    fn test_unusual_tempo_is_soft() {
        let v = validate(&[marker(30_000.0, "a")], 600_000.0, 45.0);
        assert!(v.valid);
        assert!(v.warnings.iter().any(|w| w.contains("outside typical range")));

        let v = validate(&[marker(30_000.0, "a")], 600_000.0, 210.0);
        assert!(v.warnings.iter().any(|w| w.contains("outside typical range")));

        let v = validate(&[marker(30_000.0, "a")], 600_000.0, 200.0);
        assert!(!v.warnings.iter().any(|w| w.contains("outside typical range")));
    }
}
