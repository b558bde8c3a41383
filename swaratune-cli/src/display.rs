//! Terminal rendering of readings and the flat/sharp indicator.

use anyhow::{Result, bail};
use swaratune_core::tuning::{calculate_cents_deviation, parse_note_name};
use swaratune_core::{Reading, ReadingStatus};

/// Where a reading sits relative to the target pitch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TuningStatus {
    InTune,
    Flat(f32),
    Sharp(f32),
}

impl TuningStatus {
    pub fn from_frequency(freq: f32, target: f32, tolerance_cents: f32) -> Self {
        let cents = calculate_cents_deviation(freq, target);
        if cents.abs() <= tolerance_cents {
            TuningStatus::InTune
        } else if cents < 0.0 {
            TuningStatus::Flat(cents)
        } else {
            TuningStatus::Sharp(cents)
        }
    }

    pub fn label(&self) -> String {
        match self {
            TuningStatus::InTune => "In Tune".to_string(),
            TuningStatus::Flat(cents) => format!("Flat {:+.0}c", cents),
            TuningStatus::Sharp(cents) => format!("Sharp {:+.0}c", cents),
        }
    }
}

/// Parses a target given as a note name ("A4", "Bb2") or Hz ("440", "440Hz").
pub fn parse_target(input: &str) -> Result<f32> {
    if let Some(freq) = parse_note_name(input) {
        return Ok(freq);
    }
    let trimmed = input.trim().trim_end_matches("Hz").trim_end_matches("hz").trim();
    match trimmed.parse::<f32>() {
        Ok(freq) if freq.is_finite() && freq > 0.0 => Ok(freq),
        _ => bail!("target {input:?} is neither a note name nor a frequency in Hz"),
    }
}

/// One status line for a reading.
pub fn format_reading(reading: &Reading, target: f32, tolerance_cents: f32) -> String {
    match (reading.status, reading.frequency_hz) {
        (ReadingStatus::Listening, Some(freq)) => {
            let octave = reading.octave().map(|o| o.to_string()).unwrap_or_default();
            format!(
                "{:>8.1} Hz  {:<2}{:<3} {:<4} {:<4} {}",
                freq,
                reading.note_name(),
                octave,
                reading.swara(),
                reading.solfege(),
                TuningStatus::from_frequency(freq, target, tolerance_cents).label(),
            )
        }
        _ => format!("{:>8} Hz  Waiting for sound...", "--.-"),
    }
}
