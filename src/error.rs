//! Unified error types for keymix
//!
//! Error strategy:
//! - Per-track errors (invalid analysis): Recoverable, keep the degraded track and continue
//! - Matching errors (pivot missing/unclassified): Fatal to the call, surfaced to the caller
//! - Source errors (library, platform): Propagated unchanged, never retried
//!
//! All errors include actionable suggestions where possible.

use crate::types::Track;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Top-level error type for keymix operations
#[derive(Debug, Error)]
pub enum KeymixError {
    // =========================================================================
    // Recoverable errors - keep the track, continue the load
    // =========================================================================
    #[error("Invalid audio analysis for track '{}': {reason}\n  The track is kept but excluded from tempo ranking", .track.id)]
    InvalidAnalysis { track: Box<Track>, reason: String },

    // =========================================================================
    // Matching errors - fatal to a single sort call
    // =========================================================================
    #[error("Pivot track '{pivot_id}' is not part of the loaded playlist\n  Tip: Use one of the track ids printed by the load step")]
    PivotNotFound { pivot_id: String },

    #[error("Pivot track '{pivot_id}' has no Camelot classification (key: {key_name})\n  Tip: Choose a pivot track with a detected key")]
    PivotUnclassified { pivot_id: String, key_name: String },

    // =========================================================================
    // Source errors - propagated unchanged
    // =========================================================================
    #[error("Track not found in source: '{0}'")]
    TrackNotFound(String),

    #[error("Playlist not found in source: '{0}'\n  Tip: Run without --playlist to list the available playlists")]
    PlaylistNotFound(String),

    #[error("Track source failed: {reason}")]
    Source { reason: String },

    #[error("Playlist load timed out after {:.1}s; all outstanding fetches were aborted", .elapsed.as_secs_f64())]
    Timeout { elapsed: Duration },

    #[error("Playlist load was cancelled")]
    Cancelled,

    // =========================================================================
    // Service errors
    // =========================================================================
    #[error("Unknown or expired session: {0}\n  Tip: Log in again to start a new session")]
    SessionNotFound(uuid::Uuid),

    #[error("No playlist loaded in this session\n  Tip: Load a playlist before sorting it")]
    NoPlaylistLoaded,

    // =========================================================================
    // Fatal errors - abort the run
    // =========================================================================
    #[error("Harmonic tables are inconsistent: {0}")]
    TableInconsistency(String),

    #[error("Cannot read library '{path}': {reason}\n  Tip: The library must be a JSON document with user, playlists, tracks and analyses")]
    InputError { path: PathBuf, reason: String },

    #[error("Cannot write output to '{path}': {reason}\n  Tip: Check write permissions for the output directory")]
    OutputError { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

/// Result type alias for keymix operations
pub type Result<T> = std::result::Result<T, KeymixError>;

impl KeymixError {
    /// Returns true if this error is recoverable (keep going with a degraded track)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, KeymixError::InvalidAnalysis { .. })
    }

    /// Returns true if the error was caused by aborting the fan-out rather than by a fetch
    pub fn is_abort(&self) -> bool {
        matches!(self, KeymixError::Cancelled)
    }

    /// Recover the degraded track carried by an `InvalidAnalysis` error
    pub fn into_degraded_track(self) -> std::result::Result<Track, KeymixError> {
        match self {
            KeymixError::InvalidAnalysis { track, .. } => Ok(*track),
            other => Err(other),
        }
    }

    /// Create a source error from any displayable failure
    pub fn source(reason: impl std::fmt::Display) -> Self {
        KeymixError::Source {
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
                format!(
                    "Directory does not exist: {}",
                    path.parent().map(|p| p.display().to_string()).unwrap_or_default()
                )
            }
            _ => err.to_string(),
        };
        KeymixError::OutputError { path, reason }
    }
}
