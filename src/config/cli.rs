//! CLI argument parsing and configuration

use clap::Parser;
use std::path::PathBuf;

/// keymix - Harmonic playlist sorting for DJs
///
/// Loads a playlist from a library, classifies every track on the Camelot
/// wheel and reorders it around a pivot track: harmonically compatible tracks
/// first, closest tempo first, everything else after.
#[derive(Parser, Debug)]
#[command(name = "keymix")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Library document (JSON with user, playlists, tracks and analyses)
    #[arg(short, long, value_name = "FILE")]
    pub library: PathBuf,

    /// Playlist to load (omit to list the user's playlists)
    #[arg(short, long, value_name = "ID")]
    pub playlist: Option<String>,

    /// Pivot track to sort around (omit to print the playlist as loaded)
    #[arg(long, value_name = "TRACK_ID", requires = "playlist")]
    pub pivot: Option<String>,

    /// Write the sorted playlist to this JSON file
    #[arg(short, long, value_name = "FILE", requires = "pivot")]
    pub output: Option<PathBuf>,

    /// Number of fetch worker threads (defaults to CPU count - 1)
    #[arg(short = 'j', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Abort the playlist load after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<f64>,

    /// Track ids requested per playlist page
    #[arg(long, value_name = "N", default_value_t = crate::source::library::DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only, no progress bar)
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_command_line() {
        let cli = Cli::try_parse_from([
            "keymix", "-l", "lib.json", "-p", "p1", "--pivot", "t1", "-o", "out.json", "-j", "3",
            "--timeout", "2.5", "--page-size", "10", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.library, PathBuf::from("lib.json"));
        assert_eq!(cli.playlist.as_deref(), Some("p1"));
        assert_eq!(cli.pivot.as_deref(), Some("t1"));
        assert_eq!(cli.threads, Some(3));
        assert_eq!(cli.timeout, Some(2.5));
        assert_eq!(cli.page_size, 10);
        assert_eq!(cli.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_pivot_requires_playlist() {
        assert!(Cli::try_parse_from(["keymix", "-l", "lib.json", "--pivot", "t1"]).is_err());
    }

    #[test]
    fn test_quiet_overrides_verbose() {
        let cli = Cli::try_parse_from(["keymix", "-l", "lib.json", "-q", "-v"]).unwrap();
        assert_eq!(cli.log_level(), tracing::Level::ERROR);
        assert_eq!(cli.page_size, crate::source::library::DEFAULT_PAGE_SIZE);
    }
}
