//! Track source abstraction
//!
//! The source is whatever platform holds the user's playlists and the
//! per-track analysis. Implementations own all I/O; their errors are
//! propagated unchanged.

use crate::error::Result;
use crate::types::{Playlist, RawAudioAnalysis, RawTrackMetadata, UserProfile};

/// One page of a paged listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: usize,
}

/// Playlist and analysis provider
pub trait TrackSource: Send + Sync {
    /// Profile of the user the source is authorised for
    fn current_user(&self) -> Result<UserProfile>;

    /// All playlists owned by `user_id`
    fn playlists(&self, user_id: &str) -> Result<Vec<Playlist>>;

    /// Track ids of a playlist, starting at `offset`
    fn playlist_page(&self, playlist_id: &str, offset: usize) -> Result<Page<String>>;

    /// Title, artists, album etc. of one track
    fn track_metadata(&self, track_id: &str) -> Result<RawTrackMetadata>;

    /// Key and tempo analysis of one track
    fn audio_analysis(&self, track_id: &str) -> Result<RawAudioAnalysis>;

    /// Get the name of this source (for logging)
    fn name(&self) -> &'static str;
}
