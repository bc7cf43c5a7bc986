//! Per-session state
//!
//! Every login gets its own [`Session`] keyed by a random id, so concurrent
//! users never see each other's playlists. Sessions end on logout or after
//! an idle timeout.

use crate::error::{KeymixError, Result};
use crate::pipeline::LoadedPlaylist;
use crate::types::{Playlist, UserProfile};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use uuid::Uuid;

/// Sessions idle for longer than this are evicted
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// State owned by one logged-in user
#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserProfile,
    /// Playlists listed most recently; loads are restricted to these
    pub playlists: Vec<Playlist>,
    /// Playlist loaded most recently, in playlist order
    pub loaded: Option<LoadedPlaylist>,
    last_seen: Instant,
}

impl Session {
    fn new(user: UserProfile) -> Self {
        Self {
            user,
            playlists: Vec::new(),
            loaded: None,
            last_seen: Instant::now(),
        }
    }

    fn is_expired(&self, idle_timeout: Duration) -> bool {
        self.last_seen.elapsed() > idle_timeout
    }
}

/// Keyed store of live sessions
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Start a session for `user`
    pub fn create(&self, user: UserProfile) -> Uuid {
        let id = Uuid::new_v4();
        info!("Session {} started for {}", id, user.id);
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Session::new(user));
        id
    }

    /// End a session; returns false if it did not exist
    pub fn remove(&self, id: Uuid) -> bool {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some();
        if removed {
            info!("Session {} ended", id);
        }
        removed
    }

    /// Run `f` on a live session and mark it as used
    ///
    /// An expired session is evicted and reported as not found.
    pub fn with_session<R>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> R) -> Result<R> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);

        let expired = match sessions.get(&id) {
            Some(session) => session.is_expired(self.idle_timeout),
            None => return Err(KeymixError::SessionNotFound(id)),
        };
        if expired {
            sessions.remove(&id);
            debug!("Session {} expired", id);
            return Err(KeymixError::SessionNotFound(id));
        }

        let session = sessions
            .get_mut(&id)
            .ok_or(KeymixError::SessionNotFound(id))?;
        session.last_seen = Instant::now();
        Ok(f(session))
    }

    /// Drop every session idle for longer than the timeout
    pub fn evict_expired(&self) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(self.idle_timeout));
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {} idle sessions", evicted);
        }
        evicted
    }

    /// Number of live (possibly not yet evicted) sessions
    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TIMEOUT)
    }
}
