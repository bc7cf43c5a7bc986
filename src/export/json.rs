//! JSON export of a sorted playlist

use crate::error::{KeymixError, Result};
use crate::types::Track;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

/// JSON output schema version
pub const SCHEMA_VERSION: &str = "1.0";

/// Top-level JSON output structure
#[derive(Debug, Serialize, Deserialize)]
pub struct SortedPlaylistJson {
    /// Schema version for forward compatibility
    pub version: String,
    pub metadata: ExportMetadata,
    /// Tracks in mixing order
    pub tracks: Vec<TrackJson>,
}

/// Export metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// keymix version that generated this file
    pub generator_version: String,
    /// Timestamp of export
    pub exported_at: String,
    pub playlist_id: String,
    pub pivot_id: String,
    pub track_count: usize,
    /// Tracks harmonically compatible with the pivot (pivot included)
    pub matched_count: usize,
}

/// JSON representation of a sorted track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackJson {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tempo: Option<f64>,
    pub key: KeyJson,
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyJson {
    /// Key name (e.g. "A♭-Min")
    pub name: String,
    /// Camelot code (e.g. "a1"); absent when the key was not detected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camelot: Option<String>,
}

/// A sorted playlist ready for export
#[derive(Debug, Clone, Copy)]
pub struct SortedPlaylist<'a> {
    pub playlist_id: &'a str,
    pub pivot_id: &'a str,
    pub tracks: &'a [Track],
}

/// Write a sorted playlist to a JSON file
///
/// Writes to a temp file next to the target, then renames it into place.
pub fn write_json(playlist: &SortedPlaylist<'_>, output_path: &Path) -> Result<()> {
    let temp_path = output_path.with_extension("json.tmp");

    let file = File::create(&temp_path).map_err(|e| KeymixError::output_error(output_path, e))?;
    let writer = BufWriter::new(file);

    let output = SortedPlaylistJson {
        version: SCHEMA_VERSION.to_string(),
        metadata: ExportMetadata {
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: chrono::Utc::now().to_rfc3339(),
            playlist_id: playlist.playlist_id.to_string(),
            pivot_id: playlist.pivot_id.to_string(),
            track_count: playlist.tracks.len(),
            matched_count: playlist.tracks.iter().filter(|t| t.matched).count(),
        },
        tracks: playlist.tracks.iter().map(track_to_json).collect(),
    };

    serde_json::to_writer_pretty(writer, &output).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        KeymixError::OutputError {
            path: output_path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    std::fs::rename(&temp_path, output_path).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        KeymixError::OutputError {
            path: output_path.to_path_buf(),
            reason: format!("Failed to finalize file: {}", e),
        }
    })?;

    info!(
        "Wrote {} tracks ({} matched) to {}",
        output.metadata.track_count,
        output.metadata.matched_count,
        output_path.display()
    );

    Ok(())
}

fn track_to_json(track: &Track) -> TrackJson {
    TrackJson {
        id: track.id.clone(),
        title: track.title.clone(),
        artist: track.artist.clone(),
        album: track.album.clone(),
        duration_ms: track.duration_ms,
        tempo: track.tempo,
        key: KeyJson {
            name: track.key_name.clone(),
            camelot: track.camelot_code.clone(),
        },
        matched: track.matched,
        preview_url: track.preview_url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_json_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sorted.json");

        let mut pivot = Track::fixture("t1", Some("a5"), Some(120.0));
        pivot.matched = true;
        let tail = Track::fixture("t2", None, None);
        let tracks = vec![pivot, tail];

        let playlist = SortedPlaylist {
            playlist_id: "p1",
            pivot_id: "t1",
            tracks: &tracks,
        };
        write_json(&playlist, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json["version"], SCHEMA_VERSION);
        assert_eq!(json["metadata"]["playlist_id"], "p1");
        assert_eq!(json["metadata"]["track_count"], 2);
        assert_eq!(json["metadata"]["matched_count"], 1);
        assert_eq!(json["tracks"][0]["key"]["camelot"], "a5");
        assert!(json["tracks"][1]["key"].get("camelot").is_none());
        assert!(json["tracks"][1].get("tempo").is_none());

        assert!(!dir.path().join("sorted.json.tmp").exists());
    }

    #[test]
    fn test_write_json_missing_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("sorted.json");
        let playlist = SortedPlaylist {
            playlist_id: "p1",
            pivot_id: "t1",
            tracks: &[],
        };
        let err = write_json(&playlist, &path).unwrap_err();
        assert!(matches!(err, KeymixError::OutputError { .. }));
    }
}
