//! # Musical Tuning Module
//!
//! Equal-temperament arithmetic shared by the smoother, the classifier and
//! callers that compare a reading against a target pitch.
//!
//! ## Features
//! - MIDI note numbers from frequencies (A4 = 69 = 440 Hz)
//! - Equal temperament frequency calculations
//! - Snapping to the nearest equal-tempered pitch
//! - Cent deviation calculations for tuning accuracy
//! - Note name ("C#4", "Bb2") to frequency conversions

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

use crate::note::PitchClass;

/// Reference pitch for A4 in Hz.
pub const A4_FREQUENCY: f32 = 440.0;
/// MIDI note number of A4.
pub const A4_NOTE_NUMBER: i32 = 69;
/// Smoothed values closer than this (Hz) to an equal-tempered pitch snap onto it.
pub const SNAP_THRESHOLD_HZ: f32 = 3.0;

/// Lowest and highest octaves accepted by [`parse_note_name`].
const OCTAVE_RANGE: std::ops::RangeInclusive<i32> = -1..=9;

/// Note names mapped to MIDI note numbers, sharps and flats alike.
///
/// Built once on first lookup. Covers C-1 (0) through B9.
static NOTE_NUMBERS: Lazy<BTreeMap<String, i32>> = Lazy::new(|| {
    const FLAT_NAMES: [&str; 12] = [
        "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
    ];
    let mut map = BTreeMap::new();
    for octave in OCTAVE_RANGE {
        for (index, pitch_class) in PitchClass::ALL.iter().enumerate() {
            let number = (octave + 1) * 12 + index as i32;
            map.insert(format!("{}{}", pitch_class.name(), octave), number);
            map.insert(format!("{}{}", FLAT_NAMES[index], octave), number);
        }
    }
    map
});

/// Nearest MIDI note number for a frequency.
///
/// `round(12 * log2(f / 440) + 69)`. Only meaningful for positive, finite input.
pub fn midi_note_number(freq: f32) -> i32 {
    (12.0 * (freq / A4_FREQUENCY).log2() + A4_NOTE_NUMBER as f32).round() as i32
}

/// Equal-tempered frequency of a MIDI note number.
pub fn equal_tempered_frequency(note_number: i32) -> f32 {
    A4_FREQUENCY * 2.0_f32.powf((note_number - A4_NOTE_NUMBER) as f32 / 12.0)
}

/// Snaps a frequency onto the nearest equal-tempered pitch when it is within
/// [`SNAP_THRESHOLD_HZ`]; otherwise returns it unchanged.
pub fn snap_to_equal_temperament(freq: f32) -> f32 {
    if !(freq.is_finite() && freq > 0.0) {
        return freq;
    }
    let standard = equal_tempered_frequency(midi_note_number(freq));
    if (freq - standard).abs() < SNAP_THRESHOLD_HZ {
        standard
    } else {
        freq
    }
}

/// Calculates the deviation from a target frequency in cents.
///
/// Cents are a logarithmic unit of pitch measurement where:
/// - 100 cents = 1 semitone
/// - 1200 cents = 1 octave
/// - Positive values indicate sharpness, negative values indicate flatness
///
/// # Arguments
/// * `freq` - Measured frequency in Hz
/// * `target_freq` - Target frequency in Hz
///
/// # Returns
/// * Cent deviation (positive = sharp, negative = flat)
pub fn calculate_cents_deviation(freq: f32, target_freq: f32) -> f32 {
    1200.0 * (freq / target_freq).log2()
}

/// Looks up the frequency of a note name such as `"A4"`, `"C#3"` or `"Bb2"`.
///
/// # Returns
/// * `Some(frequency)` - Equal-tempered frequency of the note
/// * `None` - Unknown name or octave out of range
pub fn parse_note_name(name: &str) -> Option<f32> {
    NOTE_NUMBERS
        .get(name.trim())
        .map(|&number| equal_tempered_frequency(number))
}
