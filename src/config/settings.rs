//! Runtime configuration settings

use super::drops::DropPoint;
use crate::pipeline::BatchOptions;
use std::path::PathBuf;

/// Runtime settings for a cue batch
#[derive(Debug, Clone)]
pub struct Settings {
    /// Rekordbox XML export to read
    pub input: PathBuf,
    /// Directory for the timestamped output file
    pub output_dir: PathBuf,
    /// Exact output file, overriding `output_dir`
    pub output_file: Option<PathBuf>,
    /// Drops given on the command line
    pub drops: Vec<DropPoint>,
    /// JSON file with more drops
    pub drops_file: Option<PathBuf>,
    /// Restrict the batch to one playlist
    pub playlist: Option<String>,
    /// Remove existing hot cues before inserting
    pub remove_hot_cues: bool,
    /// Remove existing memory cues before inserting
    pub remove_memory_cues: bool,
    /// Time signature for bar lengths
    pub time_signature: String,
    /// Grid resolution to snap drops to
    pub snap_resolution: Option<u32>,
    /// Write a JSON batch report
    pub write_report: bool,
    /// Show progress bars
    pub show_progress: bool,
    /// Dry run mode - show cues without exporting
    pub dry_run: bool,
}

impl Settings {
    /// Create settings from CLI arguments
    pub fn from_cli(cli: &super::cli::Cli) -> Self {
        Self {
            input: cli.input.clone(),
            output_dir: cli.output.clone(),
            output_file: cli.output_file.clone(),
            drops: cli.drops.clone(),
            drops_file: cli.drops_file.clone(),
            playlist: cli.playlist.clone(),
            remove_hot_cues: cli.remove_hot_cues,
            remove_memory_cues: !cli.keep_memory_cues,
            time_signature: cli.time_signature.clone(),
            snap_resolution: cli.snap,
            write_report: cli.report,
            show_progress: !cli.quiet,
            dry_run: cli.dry_run,
        }
    }

    /// Per-track processing options for the orchestrator
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            remove_primary: self.remove_hot_cues,
            remove_secondary: self.remove_memory_cues,
            time_signature: self.time_signature.clone(),
            snap_resolution: self.snap_resolution,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: PathBuf::from("rekordbox.xml"),
            output_dir: PathBuf::from("./output"),
            output_file: None,
            drops: Vec::new(),
            drops_file: None,
            playlist: None,
            remove_hot_cues: false,
            remove_memory_cues: true,
            time_signature: "4/4".to_string(),
            snap_resolution: None,
            write_report: false,
            show_progress: true,
            dry_run: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Cli;
    use clap::Parser;

    #[test]
    fn test_defaults_match_batch_defaults() {
        let from_settings = Settings::default().batch_options();
        assert_eq!(from_settings, BatchOptions::default());
    }

    #[test]
    fn test_from_cli_flags() {
        let cli = Cli::try_parse_from([
            "autocue",
            "-i",
            "lib.xml",
            "--remove-hot-cues",
            "--keep-memory-cues",
            "--snap",
            "16",
            "-q",
        ])
        .unwrap();
        let settings = Settings::from_cli(&cli);
        let options = settings.batch_options();

        assert!(options.remove_primary);
        assert!(!options.remove_secondary);
        assert_eq!(options.snap_resolution, Some(16));
        assert!(!settings.show_progress);
    }
}
