//! Playlist loading and end-to-end runs

pub mod fetch;
pub mod orchestrator;

pub use fetch::{collect_track_ids, load_playlist, CancelToken, LoadOptions, LoadedPlaylist};
pub use orchestrator::{run, RunResult};
