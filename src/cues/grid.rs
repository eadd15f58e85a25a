//! Beat grid quantization

use super::calculator::{beat_duration_ms, check_tempo};
use crate::error::{AutocueError, Result};

/// Snap a time to the nearest grid line
///
/// `grid_resolution` counts subdivisions per whole note: 4 = quarter notes
/// (one line per beat), 8 = eighth notes, 16 = sixteenths.
///
/// Exact midpoints round half away from zero, so at 120 BPM on a quarter
/// grid 1250ms snaps to 1500ms and -250ms snaps to -500ms.
///
/// # Example
///
/// ```
/// use autocue::cues::snap_to_grid;
///
/// assert_eq!(snap_to_grid(1230.0, 120.0, 4).unwrap(), 1000.0);
/// assert_eq!(snap_to_grid(1230.0, 120.0, 8).unwrap(), 1250.0);
/// ```
pub fn snap_to_grid(time_ms: f64, tempo: f64, grid_resolution: u32) -> Result<f64> {
    check_tempo(tempo)?;
    if grid_resolution == 0 {
        return Err(AutocueError::invalid_argument(
            "grid resolution",
            grid_resolution,
            "must be positive",
        ));
    }

    let grid_interval_ms = beat_duration_ms(tempo) / (f64::from(grid_resolution) / 4.0);
    let lines = (time_ms / grid_interval_ms).round();

    Ok(lines * grid_interval_ms)
}
