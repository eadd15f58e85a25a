//! JSON batch report for record keeping and scripting

use crate::error::{AutocueError, Result};
use crate::pipeline::{BatchResult, TrackOutcome};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

/// JSON output schema version
const SCHEMA_VERSION: &str = "1.0";

/// Top-level JSON report structure
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchReportJson {
    /// Schema version for forward compatibility
    pub version: String,
    pub metadata: ReportMetadata,
    pub summary: SummaryJson,
    /// One entry per track ID, ordered by ID
    pub tracks: Vec<TrackReportJson>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// autocue version that generated this file
    pub generator_version: String,
    /// Timestamp of export
    pub exported_at: String,
    /// Library the batch read from
    pub source: String,
    /// Library the batch wrote to
    pub output: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryJson {
    pub tracks: usize,
    pub successful: usize,
    pub failed: usize,
    pub total_markers_added: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackReportJson {
    pub track_id: String,
    #[serde(flatten)]
    pub outcome: serde_json::Value,
}

/// Write a batch report
///
/// Uses atomic write pattern: writes to a temp file first, then renames.
pub fn write_report(result: &BatchResult, source: &Path, output: &Path, report_path: &Path) -> Result<()> {
    let temp_path = report_path.with_extension("json.tmp");

    let report = BatchReportJson {
        version: SCHEMA_VERSION.to_string(),
        metadata: ReportMetadata {
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: chrono::Utc::now().to_rfc3339(),
            source: source.to_string_lossy().to_string(),
            output: output.to_string_lossy().to_string(),
        },
        summary: SummaryJson {
            tracks: result.per_track.len(),
            successful: result.successful(),
            failed: result.failed(),
            total_markers_added: result.total_markers_added,
        },
        tracks: result
            .per_track
            .iter()
            .map(|(id, outcome)| track_to_json(id, outcome, report_path))
            .collect::<Result<_>>()?,
        warnings: result.warnings.clone(),
    };

    let file = File::create(&temp_path).map_err(|e| AutocueError::output_error(report_path, e))?;

    serde_json::to_writer_pretty(BufWriter::new(file), &report).map_err(|e| {
        // Clean up temp file on error
        let _ = std::fs::remove_file(&temp_path);
        AutocueError::OutputError {
            path: report_path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    std::fs::rename(&temp_path, report_path).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        AutocueError::OutputError {
            path: report_path.to_path_buf(),
            reason: format!("Failed to finalize file: {}", e),
        }
    })?;

    info!("Wrote batch report to {}", report_path.display());

    Ok(())
}

fn track_to_json(id: &str, outcome: &TrackOutcome, report_path: &Path) -> Result<TrackReportJson> {
    let outcome = serde_json::to_value(outcome).map_err(|e| AutocueError::OutputError {
        path: report_path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(TrackReportJson {
        track_id: id.to_string(),
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_report_contents() {
        let mut result = BatchResult::default();
        result
            .per_track
            .insert("1".into(), TrackOutcome::Success { markers_added: 4 });
        result.per_track.insert("2".into(), TrackOutcome::NotFound);
        result.per_track.insert(
            "3".into(),
            TrackOutcome::CalculationFailed {
                reason: "bad tempo".into(),
            },
        );
        result.total_markers_added = 4;
        result.warnings.push("Track ID 2 not found in XML".into());

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        write_report(&result, Path::new("in.xml"), Path::new("out.xml"), &path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(json["version"], "1.0");
        assert_eq!(json["metadata"]["source"], "in.xml");
        assert_eq!(json["summary"]["successful"], 1);
        assert_eq!(json["summary"]["failed"], 2);
        assert_eq!(json["summary"]["total_markers_added"], 4);

        let tracks = json["tracks"].as_array().unwrap();
        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks[0]["track_id"], "1");
        assert_eq!(tracks[0]["status"], "success");
        assert_eq!(tracks[0]["markers_added"], 4);
        assert_eq!(tracks[1]["status"], "not_found");
        assert_eq!(tracks[2]["reason"], "bad tempo");
        assert_eq!(json["warnings"].as_array().unwrap().len(), 1);

        assert!(!dir.path().join("report.json.tmp").exists());
    }
}
