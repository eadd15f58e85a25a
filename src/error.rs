//! Unified error types for autocue
//!
//! Error strategy:
//! - Per-track errors (bad tempo, unknown track id, out-of-bounds cues):
//!   Recoverable, record the outcome and continue the batch
//! - Document errors (load, parse, export): Fatal, abort the whole run
//!
//! All errors include actionable suggestions where possible.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for autocue operations
#[derive(Debug, Error)]
pub enum AutocueError {
    // =========================================================================
    // Recoverable errors - record outcome, continue batch
    // =========================================================================
    #[error("Invalid {name} ({value}): {reason}")]
    InvalidArgument {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Track ID {0} not found in the collection\n  Tip: Track IDs are the TrackID attribute of each COLLECTION/TRACK element")]
    TrackNotFound(String),

    #[error("Cue validation failed for track '{track}': {}", .warnings.join("; "))]
    ValidationFailed { track: String, warnings: Vec<String> },

    // =========================================================================
    // Fatal errors - abort the run
    // =========================================================================
    #[error("File not found: '{0}'\n  Tip: Export your library from Rekordbox via File → Export Collection in xml format")]
    FileNotFound(PathBuf),

    #[error("Failed to parse Rekordbox XML '{path}': {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Invalid drop marker '{0}'\n  Expected TRACK_ID=TIME where TIME is milliseconds, mm:ss or mm:ss.fff\n  Example: --drop 1234=1:30.500")]
    InvalidDrop(String),

    #[error("Cannot write output to '{path}': {reason}\n  Tip: Check write permissions for the output directory")]
    OutputError { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for autocue operations
pub type Result<T> = std::result::Result<T, AutocueError>;

impl AutocueError {
    /// Returns true if this error only affects a single track (skip it, continue batch)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AutocueError::InvalidArgument { .. }
                | AutocueError::TrackNotFound(_)
                | AutocueError::ValidationFailed { .. }
        )
    }

    /// Create an invalid argument error naming the offending value
    pub fn invalid_argument(
        name: &'static str,
        value: impl std::fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        AutocueError::InvalidArgument {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a parse error for a document
    pub fn parse_error(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        AutocueError::ParseError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an output error, checking for common issues
    pub fn output_error(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        let reason = match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                format!("Permission denied. Check that you have write access to {}", path.display())
            }
            std::io::ErrorKind::NotFound => {
                format!("Directory does not exist: {}", path.parent().map(|p| p.display().to_string()).unwrap_or_default())
            }
            _ => err.to_string(),
        };
        AutocueError::OutputError { path, reason }
    }
}
