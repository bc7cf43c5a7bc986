//! Host-facing mixing service
//!
//! Wraps a [`TrackSource`] with per-session state: log in, list playlists,
//! load one, and sort it around a pivot track. Sessions are independent, so
//! one service can serve many users concurrently.

pub mod session;

pub use session::{Session, SessionStore, DEFAULT_IDLE_TIMEOUT};

use crate::analysis::validate_tables;
use crate::error::{KeymixError, Result};
use crate::matcher::match_and_sort;
use crate::pipeline::{self, CancelToken, LoadOptions};
use crate::source::TrackSource;
use crate::types::{Playlist, Track, UserProfile};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// Session-scoped harmonic mixing service
#[derive(Debug)]
pub struct MixService<S: TrackSource> {
    source: S,
    sessions: SessionStore,
    options: LoadOptions,
}

impl<S: TrackSource> MixService<S> {
    /// Create a service; fails if the harmonic tables are inconsistent
    pub fn new(source: S, options: LoadOptions) -> Result<Self> {
        validate_tables()?;
        Ok(Self {
            source,
            sessions: SessionStore::default(),
            options,
        })
    }

    /// Replace the session idle timeout
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.sessions = SessionStore::new(idle_timeout);
        self
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Start a session for the source's current user
    pub fn login(&self) -> Result<Uuid> {
        let user = self.source.current_user()?;
        Ok(self.sessions.create(user))
    }

    /// End a session; returns false if it was already gone
    pub fn logout(&self, session: Uuid) -> bool {
        self.sessions.remove(session)
    }

    /// Profile of the session's user
    pub fn user(&self, session: Uuid) -> Result<UserProfile> {
        self.sessions.with_session(session, |s| s.user.clone())
    }

    /// List the user's playlists and remember them in the session
    pub fn playlists(&self, session: Uuid) -> Result<Vec<Playlist>> {
        let user_id = self.sessions.with_session(session, |s| s.user.id.clone())?;
        let playlists = self.source.playlists(&user_id)?;
        debug!("{} playlists for {}", playlists.len(), user_id);

        self.sessions
            .with_session(session, |s| s.playlists = playlists.clone())?;
        Ok(playlists)
    }

    /// Load and classify a playlist, replacing the session's loaded playlist
    ///
    /// Only playlists listed for the session's user can be loaded; the listing
    /// is refreshed once when `playlist_id` is not in it. No session lock is
    /// held while fetching.
    pub fn load_playlist(
        &self,
        session: Uuid,
        playlist_id: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<Track>> {
        let listed = self
            .sessions
            .with_session(session, |s| s.playlists.iter().any(|p| p.id == playlist_id))?;
        if !listed && !self.playlists(session)?.iter().any(|p| p.id == playlist_id) {
            return Err(KeymixError::PlaylistNotFound(playlist_id.to_string()));
        }

        let loaded = pipeline::load_playlist(&self.source, playlist_id, &self.options, cancel)?;
        let tracks = loaded.tracks.clone();

        self.sessions
            .with_session(session, |s| s.loaded = Some(loaded))?;
        Ok(tracks)
    }

    /// Sort the session's loaded playlist around `pivot_id`
    pub fn sort_playlist(&self, session: Uuid, pivot_id: &str) -> Result<Vec<Track>> {
        let (playlist_id, tracks) = self
            .sessions
            .with_session(session, |s| {
                s.loaded
                    .as_ref()
                    .map(|loaded| (loaded.playlist_id.clone(), loaded.tracks.clone()))
            })?
            .ok_or(KeymixError::NoPlaylistLoaded)?;

        info!("Sorting {} around {}", playlist_id, pivot_id);
        match_and_sort(tracks, pivot_id)
    }
}
