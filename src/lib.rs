//! keymix - Harmonic playlist matching for DJs
//!
//! Classifies playlist tracks on the Camelot wheel and reorders a playlist
//! around a pivot track: tracks in a compatible key come first, ranked by
//! tempo closeness, followed by everything else in playlist order.
//!
//! # Architecture
//!
//! - `analysis`: key naming, Camelot mapping, harmonic graph, track assembly
//! - `matcher`: pivot-based match-and-sort
//! - `source`: the track source seam and the JSON library source
//! - `pipeline`: concurrent playlist loading and the CLI run
//! - `service`: per-session host service
//! - `export`: JSON output of sorted playlists
//! - `config`: CLI argument parsing and runtime settings
//!
//! # Example
//!
//! ```no_run
//! use keymix::{config::Settings, pipeline};
//!
//! let settings = Settings {
//!     playlist: Some("warmup".to_string()),
//!     pivot: Some("t1".to_string()),
//!     ..Settings::default()
//! };
//! let result = pipeline::run(&settings).expect("Run failed");
//! println!("{} of {} tracks match", result.matched, result.total_tracks);
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod export;
pub mod matcher;
pub mod pipeline;
pub mod service;
pub mod source;
pub mod types;

// Re-export key types at crate root
pub use error::{KeymixError, Result};
pub use matcher::match_and_sort;
pub use service::MixService;
pub use types::{Mode, Playlist, Track, UserProfile};
