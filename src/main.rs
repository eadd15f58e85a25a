//! autocue CLI entry point

use autocue::config::{Cli, Settings};
use autocue::pipeline;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Warnings printed in the summary before truncating
const MAX_PRINTED_WARNINGS: usize = 10;

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(&cli);

    // Build settings from CLI
    let settings = Settings::from_cli(&cli);

    // Validate inputs
    if let Err(e) = validate_inputs(&cli) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    if cli.list_playlists {
        return match pipeline::list_playlists(&settings) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Fatal error: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    // Run the batch
    match pipeline::run(&settings) {
        Ok(summary) => {
            let result = &summary.result;
            if result.per_track.is_empty() {
                return ExitCode::SUCCESS;
            }

            if !result.warnings.is_empty() {
                println!("Warnings ({}):", result.warnings.len());
                for warning in result.warnings.iter().take(MAX_PRINTED_WARNINGS) {
                    println!("  - {}", warning);
                }
                if result.warnings.len() > MAX_PRINTED_WARNINGS {
                    println!("  ... and {} more", result.warnings.len() - MAX_PRINTED_WARNINGS);
                }
                println!();
            }

            println!(
                "Summary: {} successful, {} failed (of {} tracks), {} cues added",
                result.successful(),
                result.failed(),
                result.per_track.len(),
                result.total_markers_added
            );
            if let Some(report) = &summary.report_path {
                println!("Report: {}", report.display());
            }

            if result.failed() > 0 {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Fatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter = cli.log_level().to_string().to_lowercase();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

fn validate_inputs(cli: &Cli) -> Result<(), String> {
    if !cli.input.is_file() {
        return Err(format!(
            "Input file does not exist: {}\n\n  Tip: Export your collection from Rekordbox (File → Export Collection in xml format).\n  Examples:\n    autocue -i rekordbox.xml --drop 101=1:30\n    autocue -i rekordbox.xml --drops-file drops.json -o ./output",
            cli.input.display()
        ));
    }

    if !cli.list_playlists && cli.drops.is_empty() && cli.drops_file.is_none() {
        return Err(
            "No drops given\n\n  Tip: Mark drops with --drop TRACK_ID=TIME or --drops-file FILE.\n  Use --list-playlists to see track IDs."
                .to_string(),
        );
    }

    // Check output parent directory exists (we'll create the output dir itself).
    // An explicit --output-file bypasses the directory and fails at export instead.
    if let Some(parent) = cli.output.parent().filter(|_| cli.output_file.is_none()) {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(format!(
                "Output parent directory does not exist: {}\n\n  Tip: The output directory will be created automatically,\n  but its parent directory must exist.\n  Example: mkdir -p {}",
                parent.display(),
                parent.display()
            ));
        }
    }

    Ok(())
}
