//! End-to-end run used by the CLI
//!
//! Opens the library, starts a session, then either lists playlists, prints
//! a loaded playlist, or sorts it around a pivot and optionally exports it.

use crate::config::Settings;
use crate::error::Result;
use crate::export::{self, SortedPlaylist};
use crate::pipeline::CancelToken;
use crate::service::MixService;
use crate::source::LibrarySource;
use crate::types::{Playlist, Track};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// Run result summary
#[derive(Debug)]
pub struct RunResult {
    /// Loaded playlist; `None` when only listing
    pub playlist_id: Option<String>,
    /// Playlists listed (listing runs) or tracks loaded
    pub total_tracks: usize,
    /// Tracks harmonically compatible with the pivot (pivot included)
    pub matched: usize,
    /// Tracks without a usable tempo
    pub unranked: usize,
    /// Export written, if any
    pub output: Option<PathBuf>,
    /// Final track order, in the order printed
    pub tracks: Vec<Track>,
}

/// Run one CLI invocation
pub fn run(settings: &Settings) -> Result<RunResult> {
    let run_start = Instant::now();

    let source = LibrarySource::open(&settings.library)?.with_page_size(settings.page_size);
    let service = MixService::new(source, settings.load_options())?;
    let session = service.login()?;

    let result = run_session(&service, session, settings);
    service.logout(session);

    info!("Total run time: {:.2}s", run_start.elapsed().as_secs_f64());
    result
}

fn run_session(
    service: &MixService<LibrarySource>,
    session: uuid::Uuid,
    settings: &Settings,
) -> Result<RunResult> {
    let Some(playlist_id) = settings.playlist.as_deref() else {
        let playlists = service.playlists(session)?;
        print_playlists(&playlists);
        return Ok(RunResult {
            playlist_id: None,
            total_tracks: playlists.len(),
            matched: 0,
            unranked: 0,
            output: None,
            tracks: Vec::new(),
        });
    };

    let load_start = Instant::now();
    let loaded = service.load_playlist(session, playlist_id, &CancelToken::new())?;
    let unranked = loaded.iter().filter(|t| !t.has_tempo()).count();
    debug!(
        "Loaded {} in {:.2}s",
        playlist_id,
        load_start.elapsed().as_secs_f64()
    );

    let Some(pivot_id) = settings.pivot.as_deref() else {
        print_tracks(&loaded);
        return Ok(RunResult {
            playlist_id: Some(playlist_id.to_string()),
            total_tracks: loaded.len(),
            matched: 0,
            unranked,
            output: None,
            tracks: loaded,
        });
    };

    let sorted = service.sort_playlist(session, pivot_id)?;
    let matched = sorted.iter().filter(|t| t.matched).count();
    print_tracks(&sorted);

    if let Some(path) = &settings.output {
        let playlist = SortedPlaylist {
            playlist_id,
            pivot_id,
            tracks: &sorted,
        };
        export::write_json(&playlist, path)?;
    }

    Ok(RunResult {
        playlist_id: Some(playlist_id.to_string()),
        total_tracks: sorted.len(),
        matched,
        unranked,
        output: settings.output.clone(),
        tracks: sorted,
    })
}

fn print_playlists(playlists: &[Playlist]) {
    println!();
    println!("{:<24} {:>6}  {}", "ID", "TRACKS", "TITLE");
    for playlist in playlists {
        println!(
            "{:<24} {:>6}  {}",
            playlist.id, playlist.track_count, playlist.title
        );
    }
    println!();
}

fn print_tracks(tracks: &[Track]) {
    println!();
    println!(
        "{:<3} {:<24} {:>7} {:<7} {:<8} {}",
        "", "ID", "BPM", "CAMELOT", "KEY", "TITLE"
    );
    for track in tracks {
        let tempo = track
            .tempo
            .map(|t| format!("{:.1}", t))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<3} {:<24} {:>7} {:<7} {:<8} {} - {}",
            if track.matched { "*" } else { "" },
            track.id,
            tempo,
            track.camelot_code.as_deref().unwrap_or("-"),
            track.key_name,
            track.artist,
            track.title
        );
    }
    println!();
}
