//! Runtime configuration settings

use crate::error::{KeymixError, Result};
use crate::pipeline::LoadOptions;
use crate::source::library::DEFAULT_PAGE_SIZE;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime settings for a keymix run
#[derive(Debug, Clone)]
pub struct Settings {
    /// Library document
    pub library: PathBuf,
    /// Playlist to load; `None` lists playlists only
    pub playlist: Option<String>,
    /// Pivot track; `None` prints the loaded playlist unsorted
    pub pivot: Option<String>,
    /// JSON export target
    pub output: Option<PathBuf>,
    /// Number of fetch worker threads
    pub workers: usize,
    /// Load deadline
    pub timeout: Option<Duration>,
    /// Track ids per playlist page
    pub page_size: usize,
    /// Show progress bars
    pub show_progress: bool,
}

impl Settings {
    /// Create settings from CLI arguments
    pub fn from_cli(cli: &super::cli::Cli) -> Result<Self> {
        let default_workers = num_cpus::get().saturating_sub(1).max(1);

        let workers = match cli.threads {
            Some(0) => {
                return Err(KeymixError::ConfigError(
                    "--threads must be at least 1".to_string(),
                ))
            }
            Some(n) => n,
            None => default_workers,
        };

        let timeout = cli
            .timeout
            .map(|secs| {
                Duration::try_from_secs_f64(secs).map_err(|_| {
                    KeymixError::ConfigError(format!("--timeout must be a non-negative number of seconds, got {}", secs))
                })
            })
            .transpose()?;

        if cli.page_size == 0 {
            return Err(KeymixError::ConfigError(
                "--page-size must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            library: cli.library.clone(),
            playlist: cli.playlist.clone(),
            pivot: cli.pivot.clone(),
            output: cli.output.clone(),
            workers,
            timeout,
            page_size: cli.page_size,
            show_progress: !cli.quiet,
        })
    }

    /// Fan-out options for playlist loads
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            workers: self.workers,
            timeout: self.timeout,
            show_progress: self.show_progress,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            library: PathBuf::from("library.json"),
            playlist: None,
            pivot: None,
            output: None,
            workers: num_cpus::get().saturating_sub(1).max(1),
            timeout: None,
            page_size: DEFAULT_PAGE_SIZE,
            show_progress: true,
        }
    }
}
