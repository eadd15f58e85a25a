//! Time display and parsing

use crate::error::{AutocueError, Result};

/// Format milliseconds as "mm:ss"
///
/// Truncates to whole seconds, never rounds: 3999ms is "00:03".
/// Negative times keep their sign ("-00:04").
pub fn format_time(time_ms: f64) -> String {
    let sign = if time_ms < 0.0 { "-" } else { "" };
    let total_seconds = (time_ms.abs() / 1000.0).floor() as u64;
    format!("{}{:02}:{:02}", sign, total_seconds / 60, total_seconds % 60)
}

/// Parse a user-supplied time into milliseconds
///
/// Accepts plain milliseconds ("90000", "90000.5"), "mm:ss" ("1:30") and
/// "mm:ss.fff" ("1:30.250").
pub fn parse_time(input: &str) -> Result<f64> {
    let s = input.trim();
    let invalid = || AutocueError::invalid_argument("time", s, "expected milliseconds, mm:ss or mm:ss.fff");

    let ms = match s.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u64 = minutes.trim().parse().map_err(|_| invalid())?;
            let seconds: f64 = seconds.trim().parse().map_err(|_| invalid())?;
            if !(0.0..60.0).contains(&seconds) {
                return Err(invalid());
            }
            (minutes as f64 * 60.0 + seconds) * 1000.0
        }
        None => s.parse::<f64>().map_err(|_| invalid())?,
    };

    if !ms.is_finite() || ms < 0.0 {
        return Err(invalid());
    }
    Ok(ms)
}
