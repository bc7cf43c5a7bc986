//! Harmonic playlist matching
//!
//! Reorders a playlist around a pivot track: tracks whose Camelot code is the
//! pivot's or one of its wheel neighbours come first, closest tempo first,
//! followed by everything else in playlist order.

use crate::analysis::key::harmony;
use crate::error::{KeymixError, Result};
use crate::types::Track;
use std::cmp::Ordering;
use tracing::{debug, info, warn};

/// Where a track lands in the reordered playlist
#[derive(Debug, Clone, Copy)]
enum Slot {
    /// The pivot itself, always first
    Pivot,
    /// Harmonically compatible, ranked by distance to the pivot tempo
    Matched(f64),
    /// Everything else, kept in playlist order
    Tail,
}

impl Slot {
    fn group(self) -> u8 {
        match self {
            Slot::Pivot => 0,
            Slot::Matched(_) => 1,
            Slot::Tail => 2,
        }
    }

    fn distance(self) -> f64 {
        match self {
            Slot::Matched(distance) => distance,
            Slot::Pivot | Slot::Tail => 0.0,
        }
    }

    fn cmp_rank(self, other: Self) -> Ordering {
        self.group()
            .cmp(&other.group())
            .then_with(|| self.distance().total_cmp(&other.distance()))
    }
}

/// Reorder `tracks` around the track with id `pivot_id`
///
/// 1. Every `matched` flag is cleared first.
/// 2. The pivot is the first track with the given id; duplicates are
///    treated as ordinary tracks.
/// 3. Tracks whose Camelot code is the pivot's code or one of its neighbours
///    are flagged `matched` and ranked by |tempo - pivot tempo|, ties kept in
///    playlist order. The pivot always ranks first.
/// 4. All other tracks follow in playlist order.
///
/// A compatible track without a usable tempo cannot be ranked; it is left
/// unmatched in the tail. If the pivot itself has no tempo, compatible tracks
/// keep their playlist order behind it.
///
/// The result is always a permutation of the input.
pub fn match_and_sort(mut tracks: Vec<Track>, pivot_id: &str) -> Result<Vec<Track>> {
    for track in &mut tracks {
        track.matched = false;
    }

    let pivot_index = tracks
        .iter()
        .position(|t| t.id == pivot_id)
        .ok_or_else(|| KeymixError::PivotNotFound {
            pivot_id: pivot_id.to_string(),
        })?;

    let pivot = &tracks[pivot_index];
    let compatible = pivot
        .camelot_code
        .as_deref()
        .and_then(harmony::compatible_set)
        .ok_or_else(|| KeymixError::PivotUnclassified {
            pivot_id: pivot_id.to_string(),
            key_name: pivot.key_name.clone(),
        })?;
    let pivot_tempo = pivot.tempo;

    if pivot_tempo.is_none() {
        warn!(
            "Pivot {} has no usable tempo, compatible tracks keep playlist order",
            pivot_id
        );
    }

    let mut unranked = 0usize;
    let slots: Vec<Slot> = tracks
        .iter_mut()
        .enumerate()
        .map(|(index, track)| {
            if index == pivot_index {
                track.matched = true;
                return Slot::Pivot;
            }

            let is_compatible = track
                .camelot_code
                .as_deref()
                .is_some_and(|code| compatible.contains(&code));
            if !is_compatible {
                return Slot::Tail;
            }

            match (track.tempo, pivot_tempo) {
                (Some(tempo), Some(pivot_tempo)) => {
                    track.matched = true;
                    Slot::Matched((tempo - pivot_tempo).abs())
                }
                (Some(_), None) => {
                    track.matched = true;
                    Slot::Matched(0.0)
                }
                (None, _) => {
                    debug!("Track {} is compatible but has no tempo, leaving it unranked", track.id);
                    unranked += 1;
                    Slot::Tail
                }
            }
        })
        .collect();

    let matched = tracks.iter().filter(|t| t.matched).count();

    // Stable sort: equal ranks keep playlist order
    let mut ranked: Vec<(Slot, Track)> = slots.into_iter().zip(tracks).collect();
    ranked.sort_by(|(a, _), (b, _)| a.cmp_rank(*b));

    info!(
        "Matched {} of {} tracks around {} ({}), {} compatible but unranked",
        matched,
        ranked.len(),
        pivot_id,
        compatible[0],
        unranked
    );

    Ok(ranked.into_iter().map(|(_, track)| track).collect())
}
