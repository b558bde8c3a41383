//! # Note Classification
//!
//! Maps a frequency onto its pitch class and octave, and names the pitch
//! class in three systems: Western letter names, Hindustani swaras and
//! chromatic fixed-do solfège.
//!
//! All three tables are keyed to a fixed tonic of C (C = Sa = Do). Indian
//! classical practice uses a movable Sa chosen by the performer; this module
//! does not model that.

use serde::Serialize;

use crate::pitch::FrequencyEstimate;
use crate::tuning::midi_note_number;

/// Placeholder shown for every field of an unknown classification.
pub const UNKNOWN_LABEL: &str = "unknown";

const WESTERN_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
const SWARA_NAMES: [&str; 12] = [
    "Sa", "ri", "Re", "ga", "Ga", "ma", "Ma", "Pa", "da", "Dha", "ni", "Ni",
];
const SOLFEGE_NAMES: [&str; 12] = [
    "Do", "Di", "Re", "Ri", "Mi", "Fa", "Fi", "Sol", "Si", "La", "Li", "Ti",
];

/// One of the twelve equal-tempered pitch classes, C first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PitchClass {
    C,
    Cs,
    D,
    Ds,
    E,
    F,
    Fs,
    G,
    Gs,
    A,
    As,
    B,
}

impl PitchClass {
    /// All pitch classes in chromatic order starting at C.
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Cs,
        PitchClass::D,
        PitchClass::Ds,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Fs,
        PitchClass::G,
        PitchClass::Gs,
        PitchClass::A,
        PitchClass::As,
        PitchClass::B,
    ];

    /// Pitch class for a MIDI note number (any integer, wraps into `[0, 12)`).
    pub fn from_note_number(note_number: i32) -> Self {
        Self::ALL[note_number.rem_euclid(12) as usize]
    }

    /// Semitones above C, `0..12`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Western letter name, sharps only.
    pub fn name(self) -> &'static str {
        WESTERN_NAMES[self.index()]
    }

    /// Swara with C as Sa. Lower-case marks komal, `Ma` is tivra.
    pub fn swara(self) -> &'static str {
        SWARA_NAMES[self.index()]
    }

    /// Chromatic solfège syllable with C as Do.
    pub fn solfege(self) -> &'static str {
        SOLFEGE_NAMES[self.index()]
    }
}

impl std::fmt::Display for PitchClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified note: pitch class plus scientific octave (C4 = middle C).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    pub pitch_class: PitchClass,
    pub octave: i32,
}

impl Note {
    /// Note for a MIDI note number. `octave = floor(n / 12) - 1`.
    pub fn from_note_number(note_number: i32) -> Self {
        Self {
            pitch_class: PitchClass::from_note_number(note_number),
            octave: note_number.div_euclid(12) - 1,
        }
    }

    pub fn name(&self) -> &'static str {
        self.pitch_class.name()
    }

    pub fn swara(&self) -> &'static str {
        self.pitch_class.swara()
    }

    pub fn solfege(&self) -> &'static str {
        self.pitch_class.solfege()
    }
}

// Exported with all three naming systems spelled out.
impl Serialize for Note {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Note", 4)?;
        state.serialize_field("noteName", self.name())?;
        state.serialize_field("octave", &self.octave)?;
        state.serialize_field("swara", self.swara())?;
        state.serialize_field("solfege", self.solfege())?;
        state.end()
    }
}

impl std::fmt::Display for Note {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.pitch_class.name(), self.octave)
    }
}

/// Outcome of classifying one frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteClassification {
    Known(Note),
    /// Silent or invalid input; every label reads "unknown".
    Unknown,
}

impl NoteClassification {
    pub fn note(&self) -> Option<Note> {
        match self {
            NoteClassification::Known(note) => Some(*note),
            NoteClassification::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, NoteClassification::Known(_))
    }

    pub fn note_name(&self) -> &'static str {
        self.note().map_or(UNKNOWN_LABEL, |n| n.name())
    }

    /// `None` when unknown; the octave is undefined then.
    pub fn octave(&self) -> Option<i32> {
        self.note().map(|n| n.octave)
    }

    pub fn swara(&self) -> &'static str {
        self.note().map_or(UNKNOWN_LABEL, |n| n.swara())
    }

    pub fn solfege(&self) -> &'static str {
        self.note().map_or(UNKNOWN_LABEL, |n| n.solfege())
    }
}

/// Classifies a frequency in Hz.
///
/// Zero, negative and non-finite frequencies are [`NoteClassification::Unknown`].
pub fn classify(freq: f32) -> NoteClassification {
    if !(freq.is_finite() && freq > 0.0) {
        return NoteClassification::Unknown;
    }
    NoteClassification::Known(Note::from_note_number(midi_note_number(freq)))
}

/// Classifies a detector estimate; `NoSignal` is unknown.
pub fn classify_estimate(estimate: FrequencyEstimate) -> NoteClassification {
    estimate.hz().map_or(NoteClassification::Unknown, classify)
}
