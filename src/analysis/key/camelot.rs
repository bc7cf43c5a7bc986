//! Camelot Wheel notation mapping
//!
//! The Camelot Wheel is a visual representation of musical keys that
//! makes harmonic mixing intuitive for DJs.
//!
//! - Numbers 1-12 represent positions on the wheel
//! - 'a' prefix = minor key, 'b' prefix = major key
//! - Adjacent numbers are harmonically compatible (perfect fifth)
//! - Same number, different letter = relative major/minor

use super::harmony;
use super::key_name;
use crate::error::{KeymixError, Result};
use crate::types::Mode;
use std::collections::HashSet;
use tracing::debug;

/// Key name to Camelot code
static CAMELOT: [(&str, &str); 24] = [
    // Minor keys (a)
    ("A♭-Min", "a1"),
    ("E♭-Min", "a2"),
    ("B♭-Min", "a3"),
    ("F-Min", "a4"),
    ("C-Min", "a5"),
    ("G-Min", "a6"),
    ("D-Min", "a7"),
    ("A-Min", "a8"),
    ("E-Min", "a9"),
    ("B-Min", "a10"),
    ("F♯-Min", "a11"),
    ("D♭-Min", "a12"),
    // Major keys (b)
    ("B-Maj", "b1"),
    ("F♯-Maj", "b2"),
    ("D♭-Maj", "b3"),
    ("A♭-Maj", "b4"),
    ("E♭-Maj", "b5"),
    ("B♭-Maj", "b6"),
    ("F-Maj", "b7"),
    ("C-Maj", "b8"),
    ("G-Maj", "b9"),
    ("D-Maj", "b10"),
    ("A-Maj", "b11"),
    ("E-Maj", "b12"),
];

/// Camelot code for a key name, or `None` if the key cannot be placed on the wheel
///
/// `"NO_KEY"` and any unknown spelling are unclassifiable, not errors.
pub fn camelot_code(key_name: &str) -> Option<&'static str> {
    CAMELOT
        .iter()
        .find(|(name, _)| *name == key_name)
        .map(|(_, code)| *code)
}

/// All 24 Camelot codes produced by [`camelot_code`]
pub fn all_codes() -> impl Iterator<Item = &'static str> {
    CAMELOT.iter().map(|(_, code)| *code)
}

/// Check that the key, Camelot and harmony tables agree with each other
///
/// - 24 distinct codes, reachable from every (pitch class, mode) pair
/// - every code has exactly 3 distinct neighbours, none of them itself
/// - neighbours stay inside the code set and the relation is symmetric
pub fn validate_tables() -> Result<()> {
    let codes: HashSet<&str> = all_codes().collect();
    if codes.len() != 24 {
        return Err(inconsistent(format!(
            "expected 24 distinct Camelot codes, found {}",
            codes.len()
        )));
    }

    for pitch in 0..12 {
        for mode in [Mode::Major, Mode::Minor] {
            let name = key_name(pitch, mode);
            if camelot_code(&name).is_none() {
                return Err(inconsistent(format!("key '{}' has no Camelot code", name)));
            }
        }
    }

    let nodes: HashSet<&str> = harmony::nodes().collect();
    if nodes != codes {
        let mut orphans: Vec<_> = nodes.symmetric_difference(&codes).copied().collect();
        orphans.sort_unstable();
        return Err(inconsistent(format!(
            "harmony graph and Camelot table disagree on {:?}",
            orphans
        )));
    }

    for code in &codes {
        let neighbors = harmony::neighbors(code)
            .ok_or_else(|| inconsistent(format!("'{}' has no harmony entry", code)))?;

        let distinct: HashSet<&str> = neighbors.iter().copied().collect();
        if distinct.len() != 3 || distinct.contains(code) {
            return Err(inconsistent(format!(
                "'{}' must have 3 distinct neighbours other than itself, has {:?}",
                code, neighbors
            )));
        }

        for neighbor in neighbors {
            if !codes.contains(neighbor) {
                return Err(inconsistent(format!(
                    "'{}' lists unknown neighbour '{}'",
                    code, neighbor
                )));
            }
            let symmetric = harmony::neighbors(neighbor)
                .map(|back| back.contains(code))
                .unwrap_or(false);
            if !symmetric {
                return Err(inconsistent(format!(
                    "'{}' lists '{}' but not the other way round",
                    code, neighbor
                )));
            }
        }
    }

    debug!("Harmonic tables validated ({} codes)", codes.len());
    Ok(())
}

fn inconsistent(reason: String) -> KeymixError {
    KeymixError::TableInconsistency(reason)
}
