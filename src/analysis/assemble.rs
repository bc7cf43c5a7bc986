//! Track assembly
//!
//! Merges the source's per-track metadata with its audio analysis into a
//! classified [`Track`].

use crate::analysis::key::{camelot, key_name};
use crate::error::{KeymixError, Result};
use crate::types::{RawAudioAnalysis, RawTrackMetadata, Track};
use tracing::trace;

/// Build a classified track from raw metadata and analysis
///
/// The key name and Camelot code are derived from the analysis; the tempo is
/// kept exactly as supplied. A non-finite tempo fails with
/// [`KeymixError::InvalidAnalysis`], which still carries the fully assembled
/// track (with `tempo: None`) so callers can keep it out of ranking instead of
/// dropping it.
pub fn assemble(meta: RawTrackMetadata, analysis: &RawAudioAnalysis) -> Result<Track> {
    let key_name = key_name(analysis.pitch_class, analysis.mode);
    let camelot_code = camelot::camelot_code(&key_name).map(str::to_string);
    let tempo = analysis.tempo.is_finite().then_some(analysis.tempo);

    let RawTrackMetadata {
        id,
        title,
        artists,
        album,
        duration_ms,
        preview_url,
    } = meta;

    let track = Track {
        id,
        title,
        artist: artists.into_iter().next().unwrap_or_default(),
        album,
        duration_ms,
        tempo,
        pitch_class: analysis.pitch_class,
        mode: analysis.mode,
        key_name,
        camelot_code,
        matched: false,
        preview_url,
    };

    trace!(
        "Assembled {}: key={}, camelot={:?}, tempo={:?}",
        track.id,
        track.key_name,
        track.camelot_code,
        track.tempo
    );

    if track.tempo.is_none() {
        return Err(KeymixError::InvalidAnalysis {
            reason: format!("tempo {} is not a finite number", analysis.tempo),
            track: Box::new(track),
        });
    }

    Ok(track)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::key::NO_KEY;
    use crate::types::Mode;

    fn meta(id: &str) -> RawTrackMetadata {
        RawTrackMetadata {
            id: id.to_string(),
            title: "Opus".to_string(),
            artists: vec!["Eric Prydz".to_string(), "Guest".to_string()],
            album: "Opus".to_string(),
            duration_ms: 543_000,
            preview_url: Some("https://example.com/preview.mp3".to_string()),
        }
    }

    fn analysis(tempo: f64, pitch_class: i8, mode: Mode) -> RawAudioAnalysis {
        RawAudioAnalysis {
            tempo,
            pitch_class,
            mode,
        }
    }

    #[test]
    fn test_minor_key_classification() {
        let track = assemble(meta("t1"), &analysis(126.0, 1, Mode::Minor)).unwrap();
        assert_eq!(track.key_name, "D♭-Min");
        assert_eq!(track.camelot_code.as_deref(), Some("a12"));
    }

    #[test]
    fn test_major_key_classification() {
        let track = assemble(meta("t1"), &analysis(126.0, 11, Mode::Major)).unwrap();
        assert_eq!(track.key_name, "B-Maj");
        assert_eq!(track.camelot_code.as_deref(), Some("b1"));
    }

    #[test]
    fn test_metadata_is_copied() {
        let track = assemble(meta("t42"), &analysis(127.93, 9, Mode::Minor)).unwrap();
        assert_eq!(track.id, "t42");
        assert_eq!(track.title, "Opus");
        assert_eq!(track.artist, "Eric Prydz");
        assert_eq!(track.album, "Opus");
        assert_eq!(track.duration_ms, 543_000);
        assert_eq!(track.preview_url.as_deref(), Some("https://example.com/preview.mp3"));
        // Tempo is kept as supplied, not rounded
        assert_eq!(track.tempo, Some(127.93));
        assert!(!track.matched);
    }

    #[test]
    fn test_missing_artist_is_empty() {
        let mut raw = meta("t1");
        raw.artists.clear();
        let track = assemble(raw, &analysis(120.0, 0, Mode::Major)).unwrap();
        assert_eq!(track.artist, "");
    }

    #[test]
    fn test_undetected_key_is_unclassified() {
        let track = assemble(meta("t1"), &analysis(120.0, -1, Mode::Major)).unwrap();
        assert_eq!(track.key_name, NO_KEY);
        assert_eq!(track.camelot_code, None);
        assert!(!track.is_classified());
    }

    #[test]
    fn test_invalid_tempo_keeps_degraded_track() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = assemble(meta("t7"), &analysis(bad, 8, Mode::Minor)).unwrap_err();
            assert!(err.is_recoverable());

            let track = err.into_degraded_track().unwrap();
            assert_eq!(track.id, "t7");
            assert_eq!(track.tempo, None);
            assert_eq!(track.camelot_code.as_deref(), Some("a1"));
        }
    }
}
