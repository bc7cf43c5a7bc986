//! File-backed track source
//!
//! Serves playlists, metadata and analysis from a single JSON document:
//!
//! ```json
//! {
//!   "user": { "id": "dj", "display_name": "DJ" },
//!   "playlists": [{ "id": "p1", "title": "Warmup", "track_ids": ["t1", "t2"] }],
//!   "tracks": [{ "id": "t1", "title": "...", "artists": ["..."], "album": "...", "duration_ms": 1 }],
//!   "analyses": { "t1": { "tempo": 124.0, "key": 9, "mode": "MINOR" } }
//! }
//! ```

use super::traits::{Page, TrackSource};
use crate::error::{KeymixError, Result};
use crate::types::{Playlist, RawAudioAnalysis, RawTrackMetadata, UserProfile};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

/// Default number of track ids per playlist page
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Top-level library document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryJson {
    /// The user this library belongs to
    pub user: UserProfile,
    #[serde(default)]
    pub playlists: Vec<PlaylistJson>,
    #[serde(default)]
    pub tracks: Vec<RawTrackMetadata>,
    /// Analysis per track id
    #[serde(default)]
    pub analyses: HashMap<String, RawAudioAnalysis>,
}

/// JSON representation of a playlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistJson {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Owning user id; playlists without an owner belong to the library user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default)]
    pub track_ids: Vec<String>,
}

/// Track source backed by a [`LibraryJson`] document
#[derive(Debug)]
pub struct LibrarySource {
    document: LibraryJson,
    tracks: HashMap<String, usize>,
    page_size: usize,
}

impl LibrarySource {
    /// Read a library document from disk
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| KeymixError::InputError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let document: LibraryJson =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| KeymixError::InputError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        info!(
            "Loaded library {} ({} playlists, {} tracks, {} analyses)",
            path.display(),
            document.playlists.len(),
            document.tracks.len(),
            document.analyses.len()
        );

        Ok(Self::from_document(document))
    }

    /// Serve an in-memory document
    pub fn from_document(document: LibraryJson) -> Self {
        let tracks = document
            .tracks
            .iter()
            .enumerate()
            .map(|(index, track)| (track.id.clone(), index))
            .collect();

        Self {
            document,
            tracks,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Change the playlist page size (minimum 1)
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn playlist(&self, playlist_id: &str) -> Result<&PlaylistJson> {
        self.document
            .playlists
            .iter()
            .find(|p| p.id == playlist_id)
            .ok_or_else(|| KeymixError::PlaylistNotFound(playlist_id.to_string()))
    }
}

impl TrackSource for LibrarySource {
    fn current_user(&self) -> Result<UserProfile> {
        Ok(self.document.user.clone())
    }

    fn playlists(&self, user_id: &str) -> Result<Vec<Playlist>> {
        let playlists = self
            .document
            .playlists
            .iter()
            .filter(|p| {
                p.owner
                    .as_deref()
                    .map_or(self.document.user.id == user_id, |owner| owner == user_id)
            })
            .map(|p| Playlist {
                id: p.id.clone(),
                title: p.title.clone(),
                track_count: p.track_ids.len(),
                image_url: p.image_url.clone(),
            })
            .collect();
        Ok(playlists)
    }

    fn playlist_page(&self, playlist_id: &str, offset: usize) -> Result<Page<String>> {
        let playlist = self.playlist(playlist_id)?;
        let total = playlist.track_ids.len();
        let items: Vec<String> = playlist
            .track_ids
            .iter()
            .skip(offset)
            .take(self.page_size)
            .cloned()
            .collect();

        debug!(
            "Page of {} at offset {}: {} of {} ids",
            playlist_id,
            offset,
            items.len(),
            total
        );

        Ok(Page { items, total })
    }

    fn track_metadata(&self, track_id: &str) -> Result<RawTrackMetadata> {
        self.tracks
            .get(track_id)
            .map(|&index| self.document.tracks[index].clone())
            .ok_or_else(|| KeymixError::TrackNotFound(track_id.to_string()))
    }

    fn audio_analysis(&self, track_id: &str) -> Result<RawAudioAnalysis> {
        self.document
            .analyses
            .get(track_id)
            .cloned()
            .ok_or_else(|| KeymixError::source(format!("no audio analysis for track '{}'", track_id)))
    }

    fn name(&self) -> &'static str {
        "library"
    }
}
