//! Key naming and harmonic lookup tables
//!
//! The key name is the bridge between the raw analysis (pitch class + mode)
//! and the Camelot wheel: `key_name` produces it, `camelot::camelot_code`
//! places it on the wheel, and `harmony::neighbors` walks the wheel.

pub mod camelot;
pub mod harmony;

use crate::types::{Mode, PitchClass};

/// Key name reported when no key was detected
pub const NO_KEY: &str = "NO_KEY";

/// Human-readable key name for a raw pitch class and mode
///
/// - `-1` (undetected) yields `"NO_KEY"` regardless of mode
/// - `0..=11` yields the spelled root plus `"-Maj"` / `"-Min"`, e.g. `"D♭-Min"`
///
/// Values outside the domain are treated like an undetected key.
pub fn key_name(pitch_class: i8, mode: Mode) -> String {
    match PitchClass::from_index(pitch_class) {
        Some(pitch) => format!("{}-{}", pitch.spelling(), mode.suffix()),
        None => NO_KEY.to_string(),
    }
}
