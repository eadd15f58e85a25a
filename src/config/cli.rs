//! CLI argument parsing and configuration

use super::drops::DropPoint;
use clap::Parser;
use std::path::PathBuf;

/// autocue - Bar-aligned cue points for Rekordbox libraries
///
/// Reads a Rekordbox XML export, places a hot cue on each marked drop and
/// memory cues 16 and 32 bars either side of it, and writes a new XML file
/// ready for re-import.
#[derive(Parser, Debug)]
#[command(name = "autocue")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Rekordbox XML export to read
    #[arg(short, long, value_name = "XML")]
    pub input: PathBuf,

    /// Output directory for the modified XML (file name is timestamped)
    #[arg(short, long, value_name = "DIR", default_value = "./output")]
    pub output: PathBuf,

    /// Write to this exact file instead of a timestamped name in --output
    #[arg(long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Drop position for a track: TRACK_ID=TIME (milliseconds, mm:ss or mm:ss.fff)
    #[arg(short, long = "drop", value_name = "ID=TIME")]
    pub drops: Vec<DropPoint>,

    /// JSON file mapping track IDs to drop times, e.g. {"101": 60000, "102": "1:30"}
    #[arg(long, value_name = "FILE")]
    pub drops_file: Option<PathBuf>,

    /// Only apply drops to tracks in this playlist
    #[arg(short, long, value_name = "NAME")]
    pub playlist: Option<String>,

    /// Also remove existing hot cues before adding new ones
    #[arg(long, default_value = "false")]
    pub remove_hot_cues: bool,

    /// Keep existing memory cues (by default they are replaced)
    #[arg(long, default_value = "false")]
    pub keep_memory_cues: bool,

    /// Time signature used for bar lengths
    #[arg(long, value_name = "N/M", default_value = "4/4")]
    pub time_signature: String,

    /// Snap each drop to the beat grid first (4 = quarter notes, 8 = eighths, ...)
    #[arg(long, value_name = "RES")]
    #[arg(value_parser = clap::value_parser!(u32).range(1..=64))]
    pub snap: Option<u32>,

    /// Write a JSON report of the batch next to the output XML
    #[arg(long, default_value = "false")]
    pub report: bool,

    /// List playlists and their tracks, then exit
    #[arg(long, default_value = "false")]
    pub list_playlists: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress progress bars)
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,

    /// Dry run - show the cues that would be written without exporting
    #[arg(long, default_value = "false")]
    pub dry_run: bool,
}

impl Cli {
    /// Get the log level based on verbosity flags
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            return tracing::Level::ERROR;
        }
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
