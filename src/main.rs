//! keymix CLI entry point

use clap::Parser;
use keymix::config::{Cli, Settings};
use keymix::pipeline;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(&cli);

    // Build settings from CLI
    let settings = match Settings::from_cli(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Validate inputs
    if let Err(e) = validate_inputs(&cli) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    // Run the pipeline
    match pipeline::run(&settings) {
        Ok(result) => {
            match (&result.playlist_id, &settings.pivot) {
                (None, _) => println!("Summary: {} playlists", result.total_tracks),
                (Some(id), None) => println!(
                    "Summary: {} tracks loaded from {} ({} without tempo)",
                    result.total_tracks, id, result.unranked
                ),
                (Some(id), Some(pivot)) => println!(
                    "Summary: {} of {} tracks in {} match {} ({} without tempo)",
                    result.matched, result.total_tracks, id, pivot, result.unranked
                ),
            }
            if let Some(path) = &result.output {
                println!("Wrote {}", path.display());
            }
            ExitCode::SUCCESS
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
        .with_writer(std::io::stderr)
        .init();
}

fn validate_inputs(cli: &Cli) -> Result<(), String> {
    if !cli.library.is_file() {
        return Err(format!(
            "Library file does not exist: {}\n\n  Tip: Check the path is correct and accessible.\n  Examples:\n    keymix -l ./library.json\n    keymix -l ./library.json -p warmup --pivot t1 -o ./sorted.json",
            cli.library.display()
        ));
    }

    if let Some(output) = &cli.output {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(format!(
                    "Output directory does not exist: {}\n\n  Tip: Create it first.\n  Example: mkdir -p {}",
                    parent.display(),
                    parent.display()
                ));
            }
        }
    }

    Ok(())
}
