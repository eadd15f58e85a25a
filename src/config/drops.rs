//! Drop-time input: `ID=TIME` pairs and JSON drop files

use crate::cues::parse_time;
use crate::error::{AutocueError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// A user-marked drop for one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropPoint {
    pub track_id: String,
    /// Drop position in milliseconds
    pub time_ms: f64,
}

impl DropPoint {
    pub fn new(track_id: impl Into<String>, time_ms: f64) -> Self {
        Self {
            track_id: track_id.into(),
            time_ms,
        }
    }
}

impl FromStr for DropPoint {
    type Err = AutocueError;

    /// Parse `TRACK_ID=TIME`
    fn from_str(s: &str) -> Result<Self> {
        let (id, time) = s
            .split_once('=')
            .ok_or_else(|| AutocueError::InvalidDrop(s.to_string()))?;

        let id = id.trim();
        if id.is_empty() {
            return Err(AutocueError::InvalidDrop(s.to_string()));
        }
        let time_ms = parse_time(time).map_err(|_| AutocueError::InvalidDrop(s.to_string()))?;

        Ok(Self::new(id, time_ms))
    }
}

/// A drop time in a JSON file: milliseconds or a time string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DropValue {
    Millis(f64),
    Text(String),
}

/// Load `{"track_id": time, ...}` from a JSON file
///
/// Times may be numbers (milliseconds) or strings accepted by
/// [`parse_time`]. Entries come back ordered by track ID.
pub fn load_drops_file(path: &Path) -> Result<Vec<DropPoint>> {
    if !path.exists() {
        return Err(AutocueError::FileNotFound(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let entries: BTreeMap<String, DropValue> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AutocueError::parse_error(path, e))?;

    let drops = entries
        .into_iter()
        .map(|(id, value)| -> Result<DropPoint> {
            let time_ms = match value {
                DropValue::Millis(ms) if ms.is_finite() && ms >= 0.0 => ms,
                DropValue::Millis(ms) => {
                    return Err(AutocueError::InvalidDrop(format!("{}={}", id, ms)));
                }
                DropValue::Text(text) => parse_time(&text)
                    .map_err(|_| AutocueError::InvalidDrop(format!("{}={}", id, text)))?,
            };
            Ok(DropPoint::new(id, time_ms))
        })
        .collect::<Result<Vec<_>>>()?;

    debug!("Loaded {} drops from {}", drops.len(), path.display());
    Ok(drops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_pair() {
        assert_eq!("101=60000".parse::<DropPoint>().unwrap(), DropPoint::new("101", 60_000.0));
        assert_eq!(" 7 = 1:05.5".parse::<DropPoint>().unwrap(), DropPoint::new("7", 65_500.0));
    }

    #[test]
    fn test_parse_pair_errors() {
        assert!(matches!("101".parse::<DropPoint>(), Err(AutocueError::InvalidDrop(_))));
        assert!("=1000".parse::<DropPoint>().is_err());
        assert!("101=".parse::<DropPoint>().is_err());
        assert!("101=-5".parse::<DropPoint>().is_err());
    }

    #[test]
    fn test_load_drops_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"202": "1:30", "101": 60000}}"#).unwrap();

        let drops = load_drops_file(file.path()).unwrap();
        assert_eq!(
            drops,
            vec![DropPoint::new("101", 60_000.0), DropPoint::new("202", 90_000.0)]
        );
    }

    #[test]
    fn test_load_drops_file_bad_time() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"101": "later"}}"#).unwrap();
        assert!(matches!(load_drops_file(file.path()), Err(AutocueError::InvalidDrop(_))));
    }

    #[test]
    fn test_load_drops_file_not_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "101=60000").unwrap();
        assert!(matches!(load_drops_file(file.path()), Err(AutocueError::ParseError { .. })));
    }

    #[test]
    fn test_load_drops_file_missing() {
        assert!(matches!(
            load_drops_file(Path::new("/nonexistent/drops.json")),
            Err(AutocueError::FileNotFound(_))
        ));
    }
}
