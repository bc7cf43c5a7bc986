//! Export of sorted playlists

pub mod json;

pub use json::{write_json, SortedPlaylist};
