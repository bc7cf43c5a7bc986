//! Core data types for keymix
//!
//! These types represent the domain model and flow from the track source,
//! through assembly, into the matcher.

use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Musical primitives
// =============================================================================

/// The 12 pitch classes, spelled the way DJ key displays usually show them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PitchClass {
    C,
    Db,
    D,
    Eb,
    E,
    F,
    Fs,
    G,
    Ab,
    A,
    Bb,
    B,
}

impl PitchClass {
    /// Pitch class reported for an undetected key
    pub const UNDETECTED: i8 = -1;

    /// Convert from numeric index (0 = C, 1 = D♭, ..., 11 = B)
    ///
    /// Anything outside 0..=11, including the "undetected" marker -1, yields `None`.
    pub fn from_index(index: i8) -> Option<Self> {
        match index {
            0 => Some(PitchClass::C),
            1 => Some(PitchClass::Db),
            2 => Some(PitchClass::D),
            3 => Some(PitchClass::Eb),
            4 => Some(PitchClass::E),
            5 => Some(PitchClass::F),
            6 => Some(PitchClass::Fs),
            7 => Some(PitchClass::G),
            8 => Some(PitchClass::Ab),
            9 => Some(PitchClass::A),
            10 => Some(PitchClass::Bb),
            11 => Some(PitchClass::B),
            _ => None,
        }
    }

    /// Key spelling with a fixed mix of flats and sharps (e.g. "D♭", "F♯")
    pub fn spelling(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::Db => "D♭",
            PitchClass::D => "D",
            PitchClass::Eb => "E♭",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F♯",
            PitchClass::G => "G",
            PitchClass::Ab => "A♭",
            PitchClass::A => "A",
            PitchClass::Bb => "B♭",
            PitchClass::B => "B",
        }
    }
}

/// Major or Minor scale
///
/// Classification is binary: anything that is not major counts as minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    Major,
    Minor,
}

impl Mode {
    /// Interpret a textual mode label ("MAJOR", "major", "MINOR", ...)
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("major") {
            Mode::Major
        } else {
            Mode::Minor
        }
    }

    /// Interpret the platform's numeric mode flag (1 = major, 0 = minor)
    pub fn from_flag(flag: i64) -> Self {
        if flag == 1 {
            Mode::Major
        } else {
            Mode::Minor
        }
    }

    /// Suffix used in key names ("Maj" / "Min")
    pub fn suffix(self) -> &'static str {
        match self {
            Mode::Major => "Maj",
            Mode::Minor => "Min",
        }
    }
}

// =============================================================================
// Raw collaborator data
// =============================================================================

/// Per-track metadata as delivered by the track source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTrackMetadata {
    pub id: String,
    pub title: String,
    /// Performing artists, main artist first
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub preview_url: Option<String>,
}

/// Externally supplied key and tempo analysis for one track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAudioAnalysis {
    /// Tempo in BPM; non-finite when the source delivered something unparseable
    #[serde(default = "missing_tempo", deserialize_with = "lenient_tempo")]
    pub tempo: f64,
    /// Pitch class 0..=11, or -1 when no key was detected
    #[serde(alias = "key")]
    pub pitch_class: i8,
    #[serde(deserialize_with = "lenient_mode")]
    pub mode: Mode,
}

fn missing_tempo() -> f64 {
    f64::NAN
}

/// Tempo may arrive as a number or as text; unparseable text becomes NaN
fn lenient_tempo<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTempo {
        Number(f64),
        Text(String),
        Missing(()),
    }

    Ok(match RawTempo::deserialize(deserializer)? {
        RawTempo::Number(value) => value,
        RawTempo::Text(text) => text.trim().parse().unwrap_or(f64::NAN),
        RawTempo::Missing(()) => f64::NAN,
    })
}

/// Mode may arrive as a label ("MAJOR") or as the platform's 1/0 flag
fn lenient_mode<'de, D>(deserializer: D) -> Result<Mode, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawMode {
        Flag(i64),
        Label(String),
    }

    Ok(match RawMode::deserialize(deserializer)? {
        RawMode::Flag(flag) => Mode::from_flag(flag),
        RawMode::Label(label) => Mode::from_label(&label),
    })
}

// =============================================================================
// Assembled domain records
// =============================================================================

/// A playlist entry with its harmonic classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Source track id (unique within a playlist)
    pub id: String,
    pub title: String,
    /// Main artist
    pub artist: String,
    pub album: String,
    pub duration_ms: u64,
    /// Tempo in BPM; `None` when the analysis carried no usable tempo
    pub tempo: Option<f64>,
    /// Raw pitch class (-1 = undetected)
    pub pitch_class: i8,
    pub mode: Mode,
    /// Derived key name (e.g. "A♭-Min", "NO_KEY")
    pub key_name: String,
    /// Camelot code ("a1".."a12" minor, "b1".."b12" major); `None` if unclassifiable
    pub camelot_code: Option<String>,
    /// Set by the matcher; meaningful only for the result of one matching call
    pub matched: bool,
    pub preview_url: Option<String>,
}

impl Track {
    /// True if the track can take part in tempo ranking
    pub fn has_tempo(&self) -> bool {
        self.tempo.is_some()
    }

    /// True if the track has a position on the Camelot wheel
    pub fn is_classified(&self) -> bool {
        self.camelot_code.is_some()
    }

    #[cfg(test)]
    pub(crate) fn fixture(id: &str, camelot: Option<&str>, tempo: Option<f64>) -> Self {
        Self {
            id: id.to_string(),
            title: format!("Track {}", id),
            artist: "Test Artist".to_string(),
            album: "Test Album".to_string(),
            duration_ms: 180_000,
            tempo,
            pitch_class: if camelot.is_some() { 0 } else { PitchClass::UNDETECTED },
            mode: Mode::Minor,
            key_name: "fixture".to_string(),
            camelot_code: camelot.map(str::to_string),
            matched: false,
            preview_url: None,
        }
    }
}

/// Read-only playlist summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub title: String,
    pub track_count: usize,
    pub image_url: Option<String>,
}

/// Profile of the user a session belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub url: String,
}
