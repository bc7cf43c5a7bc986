//! Track sources (playlists, metadata, analysis)

pub mod library;
pub mod traits;

pub use library::{LibraryJson, LibrarySource, PlaylistJson};
pub use traits::{Page, TrackSource};
