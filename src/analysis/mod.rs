//! Harmonic analysis of externally analysed tracks
//!
//! Turns raw pitch class / mode / tempo data into classified tracks.
//! Key and tempo detection from audio is not done here; the values come
//! from the track source.

pub mod assemble;
pub mod key;

pub use assemble::assemble;
pub use key::camelot::{camelot_code, validate_tables};
pub use key::harmony::{compatible_set, neighbors};
pub use key::{key_name, NO_KEY};
