//! Concurrent playlist loading
//!
//! Fetches metadata and analysis for every track of a playlist on a bounded
//! worker pool and assembles them in playlist order. The load either produces
//! the complete track list or fails as a whole.

use crate::analysis::assemble;
use crate::error::{KeymixError, Result};
use crate::source::TrackSource;
use crate::types::Track;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Cancellation flag shared between a caller and a running load
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort every outstanding fetch of the load using this token
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Tuning for a playlist load
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Number of fetch worker threads
    pub workers: usize,
    /// Abort the whole load once this much time has passed
    pub timeout: Option<Duration>,
    /// Show a progress bar
    pub show_progress: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().saturating_sub(1).max(1),
            timeout: None,
            show_progress: false,
        }
    }
}

/// A fully assembled playlist
#[derive(Debug, Clone)]
pub struct LoadedPlaylist {
    pub playlist_id: String,
    /// Tracks in playlist order
    pub tracks: Vec<Track>,
    /// Tracks kept without a usable tempo
    pub unranked: usize,
}

/// Abort conditions checked by every task before and after fetching
struct Guard<'a> {
    started: Instant,
    timeout: Option<Duration>,
    caller: &'a CancelToken,
    aborted: AtomicBool,
}

impl Guard<'_> {
    fn check(&self) -> Result<()> {
        if let Some(timeout) = self.timeout {
            let elapsed = self.started.elapsed();
            if elapsed >= timeout {
                self.abort();
                return Err(KeymixError::Timeout { elapsed });
            }
        }
        if self.caller.is_cancelled() || self.aborted.load(Ordering::SeqCst) {
            return Err(KeymixError::Cancelled);
        }
        Ok(())
    }

    fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }
}

/// Collect every track id of a playlist, page by page
pub fn collect_track_ids<S>(source: &S, playlist_id: &str) -> Result<Vec<String>>
where
    S: TrackSource + ?Sized,
{
    let first = source.playlist_page(playlist_id, 0)?;
    let total = first.total;
    let mut ids = first.items;

    while ids.len() < total {
        let page = source.playlist_page(playlist_id, ids.len())?;
        if page.items.is_empty() {
            return Err(KeymixError::source(format!(
                "playlist '{}' reports {} tracks but stopped after {}",
                playlist_id,
                total,
                ids.len()
            )));
        }
        ids.extend(page.items);
    }

    debug!("Collected {} track ids for {}", ids.len(), playlist_id);
    Ok(ids)
}

/// Load and assemble every track of a playlist
///
/// Per-track metadata and analysis fetches run concurrently on a pool of
/// `options.workers` threads; results are returned in playlist order. A
/// failed fetch, an expired timeout or a cancelled `cancel` token aborts the
/// remaining fetches and fails the whole load. Tracks with an invalid
/// analysis are kept (without tempo) and logged.
pub fn load_playlist<S>(
    source: &S,
    playlist_id: &str,
    options: &LoadOptions,
    cancel: &CancelToken,
) -> Result<LoadedPlaylist>
where
    S: TrackSource + ?Sized,
{
    let guard = Guard {
        started: Instant::now(),
        timeout: options.timeout,
        caller: cancel,
        aborted: AtomicBool::new(false),
    };
    guard.check()?;

    let ids = collect_track_ids(source, playlist_id)?;
    if ids.is_empty() {
        info!("Playlist {} is empty", playlist_id);
        return Ok(LoadedPlaylist {
            playlist_id: playlist_id.to_string(),
            tracks: Vec::new(),
            unranked: 0,
        });
    }

    let workers = options.workers.max(1);
    info!(
        "Loading {} tracks of {} from {} with {} workers",
        ids.len(),
        playlist_id,
        source.name(),
        workers
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|index| format!("keymix-fetch-{}", index))
        .build()
        .map_err(|e| KeymixError::ConfigError(format!("Failed to build fetch pool: {}", e)))?;

    let progress_bar = if options.show_progress {
        let pb = ProgressBar::new(ids.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    // Indexed parallel iterator: results come back in playlist order
    let results: Vec<Result<Track>> = pool.install(|| {
        ids.par_iter()
            .map(|track_id| {
                let result = fetch_track(source, track_id, &guard);
                if result.is_err() {
                    guard.abort();
                }
                if let Some(ref pb) = progress_bar {
                    pb.inc(1);
                }
                result
            })
            .collect()
    });

    let mut tracks = Vec::with_capacity(results.len());
    let mut failure: Option<KeymixError> = None;
    for result in results {
        match result {
            Ok(track) => tracks.push(track),
            Err(e) => {
                // Report the root cause, not the aborts it triggered
                let replace = failure
                    .as_ref()
                    .map_or(true, |current| current.is_abort() && !e.is_abort());
                if replace {
                    failure = Some(e);
                }
            }
        }
    }

    if let Some(e) = failure {
        if let Some(pb) = progress_bar {
            pb.abandon_with_message("Load aborted");
        }
        warn!("Loading {} failed: {}", playlist_id, e);
        return Err(e);
    }

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Playlist loaded");
    }

    let unranked = tracks.iter().filter(|t| !t.has_tempo()).count();
    info!(
        "Loaded {} tracks of {} in {:.2}s ({} without usable tempo)",
        tracks.len(),
        playlist_id,
        guard.started.elapsed().as_secs_f64(),
        unranked
    );

    Ok(LoadedPlaylist {
        playlist_id: playlist_id.to_string(),
        tracks,
        unranked,
    })
}

/// Fetch metadata and analysis of one track concurrently and assemble it
fn fetch_track<S>(source: &S, track_id: &str, guard: &Guard<'_>) -> Result<Track>
where
    S: TrackSource + ?Sized,
{
    guard.check()?;

    let (meta, analysis) = rayon::join(
        || source.track_metadata(track_id),
        || source.audio_analysis(track_id),
    );
    let meta = meta?;
    let analysis = analysis?;

    guard.check()?;

    assemble(meta, &analysis).or_else(|e| {
        warn!("{}", e);
        e.into_degraded_track()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{LibraryJson, LibrarySource, Page};
    use crate::types::{Playlist, RawAudioAnalysis, RawTrackMetadata, UserProfile};
    use std::sync::atomic::AtomicUsize;

    fn library(count: usize) -> LibrarySource {
        let ids: Vec<String> = (0..count).map(|i| format!("t{}", i)).collect();
        let document: LibraryJson = serde_json::from_value(serde_json::json!({
            "user": { "id": "dj", "display_name": "DJ" },
            "playlists": [{ "id": "p1", "title": "Set", "track_ids": ids }],
            "tracks": ids.iter().map(|id| serde_json::json!({ "id": id, "title": id })).collect::<Vec<_>>(),
            "analyses": ids.iter().enumerate().map(|(i, id)| {
                (id.clone(), serde_json::json!({ "tempo": 100.0 + i as f64, "key": (i % 12) as i64, "mode": "MINOR" }))
            }).collect::<serde_json::Map<_, _>>()
        }))
        .unwrap();
        LibrarySource::from_document(document).with_page_size(7)
    }

    fn options(workers: usize) -> LoadOptions {
        LoadOptions {
            workers,
            timeout: None,
            show_progress: false,
        }
    }

    #[test]
    fn test_order_follows_playlist() {
        let source = library(40);
        let loaded = load_playlist(&source, "p1", &options(4), &CancelToken::new()).unwrap();
        let ids: Vec<String> = loaded.tracks.iter().map(|t| t.id.clone()).collect();
        let expected: Vec<String> = (0..40).map(|i| format!("t{}", i)).collect();
        assert_eq!(ids, expected);
        assert_eq!(loaded.unranked, 0);
    }

    #[test]
    fn test_empty_playlist() {
        let source = library(0);
        let loaded = load_playlist(&source, "p1", &options(2), &CancelToken::new()).unwrap();
        assert!(loaded.tracks.is_empty());
    }

    #[test]
    fn test_cancelled_before_start() {
        let source = library(5);
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = load_playlist(&source, "p1", &options(2), &cancel).unwrap_err();
        assert!(matches!(err, KeymixError::Cancelled));
    }

    #[test]
    fn test_zero_timeout_fails_whole_load() {
        let source = library(5);
        let mut opts = options(2);
        opts.timeout = Some(Duration::ZERO);
        let err = load_playlist(&source, "p1", &opts, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, KeymixError::Timeout { .. }));
    }

    /// Source whose analysis call fails for one track and counts fetches
    struct FlakySource {
        inner: LibrarySource,
        failing: &'static str,
        fetches: AtomicUsize,
    }

    impl TrackSource for FlakySource {
        fn current_user(&self) -> Result<UserProfile> {
            self.inner.current_user()
        }
        fn playlists(&self, user_id: &str) -> Result<Vec<Playlist>> {
            self.inner.playlists(user_id)
        }
        fn playlist_page(&self, playlist_id: &str, offset: usize) -> Result<Page<String>> {
            self.inner.playlist_page(playlist_id, offset)
        }
        fn track_metadata(&self, track_id: &str) -> Result<RawTrackMetadata> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.inner.track_metadata(track_id)
        }
        fn audio_analysis(&self, track_id: &str) -> Result<RawAudioAnalysis> {
            if track_id == self.failing {
                return Err(KeymixError::source("platform returned 503"));
            }
            self.inner.audio_analysis(track_id)
        }
        fn name(&self) -> &'static str {
            "flaky"
        }
    }

    #[test]
    fn test_source_error_is_root_cause() {
        let source = FlakySource {
            inner: library(30),
            failing: "t3",
            fetches: AtomicUsize::new(0),
        };
        let err = load_playlist(&source, "p1", &options(1), &CancelToken::new()).unwrap_err();
        assert!(matches!(err, KeymixError::Source { ref reason } if reason.contains("503")));
        // Single worker: tracks after the failure are never fetched
        assert!(source.fetches.load(Ordering::SeqCst) < 30);
    }

    #[test]
    fn test_invalid_tempo_is_kept() {
        let document: LibraryJson = serde_json::from_value(serde_json::json!({
            "user": { "id": "dj", "display_name": "DJ" },
            "playlists": [{ "id": "p1", "title": "Set", "track_ids": ["a", "b"] }],
            "tracks": [{ "id": "a", "title": "A" }, { "id": "b", "title": "B" }],
            "analyses": {
                "a": { "tempo": 120.0, "key": 1, "mode": "MAJOR" },
                "b": { "tempo": "n/a", "key": 1, "mode": "MINOR" }
            }
        }))
        .unwrap();

        let source = LibrarySource::from_document(document);
        let loaded = load_playlist(&source, "p1", &options(2), &CancelToken::new()).unwrap();
        assert_eq!(loaded.tracks.len(), 2);
        assert_eq!(loaded.unranked, 1);
        assert_eq!(loaded.tracks[0].key_name, "D♭-Maj");
        assert_eq!(loaded.tracks[1].tempo, None);
        assert_eq!(loaded.tracks[1].camelot_code.as_deref(), Some("a12"));
    }

    /// Source whose metadata calls take a while, optionally cancelling the
    /// load from inside the n-th fetch
    struct SlowSource {
        inner: LibrarySource,
        delay: Duration,
        cancel_at: Option<(usize, CancelToken)>,
        fetches: AtomicUsize,
    }

    impl SlowSource {
        fn new(count: usize, delay: Duration) -> Self {
            Self {
                inner: library(count),
                delay,
                cancel_at: None,
                fetches: AtomicUsize::new(0),
            }
        }
    }

    impl TrackSource for SlowSource {
        fn current_user(&self) -> Result<UserProfile> {
            self.inner.current_user()
        }
        fn playlists(&self, user_id: &str) -> Result<Vec<Playlist>> {
            self.inner.playlists(user_id)
        }
        fn playlist_page(&self, playlist_id: &str, offset: usize) -> Result<Page<String>> {
            self.inner.playlist_page(playlist_id, offset)
        }
        fn track_metadata(&self, track_id: &str) -> Result<RawTrackMetadata> {
            let fetched = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some((at, token)) = &self.cancel_at {
                if fetched == *at {
                    token.cancel();
                }
            }
            std::thread::sleep(self.delay);
            self.inner.track_metadata(track_id)
        }
        fn audio_analysis(&self, track_id: &str) -> Result<RawAudioAnalysis> {
            self.inner.audio_analysis(track_id)
        }
        fn name(&self) -> &'static str {
            "slow"
        }
    }

    #[test]
    fn test_timeout_during_load_aborts_remaining_fetches() {
        let source = SlowSource::new(50, Duration::from_millis(20));
        let mut opts = options(2);
        opts.timeout = Some(Duration::from_millis(100));

        let err = load_playlist(&source, "p1", &opts, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, KeymixError::Timeout { .. }), "got {:?}", err);
        assert!(source.fetches.load(Ordering::SeqCst) < 50);
    }

    #[test]
    fn test_cancel_during_load_aborts_remaining_fetches() {
        let cancel = CancelToken::new();
        let mut source = SlowSource::new(50, Duration::from_millis(20));
        source.cancel_at = Some((5, cancel.clone()));

        let err = load_playlist(&source, "p1", &options(2), &cancel).unwrap_err();
        assert!(matches!(err, KeymixError::Cancelled), "got {:?}", err);
        assert!(cancel.is_cancelled());
        assert!(source.fetches.load(Ordering::SeqCst) < 50);
    }

    /// Source that claims more ids than it serves
    struct ShortSource(LibrarySource);

    impl TrackSource for ShortSource {
        fn current_user(&self) -> Result<UserProfile> {
            self.0.current_user()
        }
        fn playlists(&self, user_id: &str) -> Result<Vec<Playlist>> {
            self.0.playlists(user_id)
        }
        fn playlist_page(&self, playlist_id: &str, offset: usize) -> Result<Page<String>> {
            let mut page = self.0.playlist_page(playlist_id, offset)?;
            page.total += 5;
            Ok(page)
        }
        fn track_metadata(&self, track_id: &str) -> Result<RawTrackMetadata> {
            self.0.track_metadata(track_id)
        }
        fn audio_analysis(&self, track_id: &str) -> Result<RawAudioAnalysis> {
            self.0.audio_analysis(track_id)
        }
        fn name(&self) -> &'static str {
            "short"
        }
    }

    #[test]
    fn test_short_paging_is_an_error() {
        let source = ShortSource(library(10));
        let err = collect_track_ids(&source, "p1").unwrap_err();
        assert!(matches!(err, KeymixError::Source { .. }));
    }
}
