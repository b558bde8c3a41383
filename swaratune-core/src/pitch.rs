//! # Pitch Detection Module
//!
//! This module estimates the fundamental frequency of a frame using normalized
//! time-domain autocorrelation. It works on raw samples, with no FFT involved.
//!
//! ## Features
//! - RMS noise gate to reject silence
//! - Lock-on at the first strong, rising correlation peak (avoids octave errors)
//! - Neighbour-slope refinement for sub-sample accuracy
//! - Fallback to the best rising peak when no lag locks on

use crate::error::TunerError;
use crate::frame::{SampleFrame, is_valid_frame_size, rms};

/// Frames quieter than this RMS level carry no usable pitch.
const RMS_NOISE_FLOOR: f32 = 0.01;
/// A rising correlation above this value locks on to a period.
const LOCK_ON_CORRELATION: f32 = 0.9;
/// Minimum best correlation for the unlocked fallback.
const FALLBACK_CORRELATION: f32 = 0.01;
/// Scale applied to the refinement shift.
const SHIFT_FACTOR: f32 = 8.0;

/// Result of analysing one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrequencyEstimate {
    /// Estimated fundamental in Hz, always positive and finite.
    Pitch(f32),
    /// Not enough energy or periodicity to estimate a pitch.
    NoSignal,
}

impl FrequencyEstimate {
    /// The estimate in Hz, if there is one.
    pub fn hz(self) -> Option<f32> {
        match self {
            FrequencyEstimate::Pitch(hz) => Some(hz),
            FrequencyEstimate::NoSignal => None,
        }
    }

    pub fn is_signal(self) -> bool {
        matches!(self, FrequencyEstimate::Pitch(_))
    }

    fn from_hz(hz: f32) -> Self {
        if hz.is_finite() && hz > 0.0 {
            FrequencyEstimate::Pitch(hz)
        } else {
            FrequencyEstimate::NoSignal
        }
    }
}

/// A reusable autocorrelation detector bound to one frame size.
///
/// The correlation scratch buffer is allocated once, so a detector can run
/// every capture tick without allocating.
#[derive(Debug, Clone)]
pub struct PitchDetector {
    frame_size: usize,
    correlations: Vec<f32>,
}

impl PitchDetector {
    /// Creates a detector for frames of exactly `frame_size` samples.
    ///
    /// # Arguments
    /// * `frame_size` - Number of samples per frame, a non-zero power of two
    ///
    /// # Returns
    /// * `Ok(detector)` - Ready to analyse frames
    /// * `Err(TunerError::InvalidFrameSize)` - Unusable frame size
    pub fn new(frame_size: usize) -> Result<Self, TunerError> {
        if !is_valid_frame_size(frame_size) {
            return Err(TunerError::InvalidFrameSize(frame_size));
        }
        Ok(Self {
            frame_size,
            correlations: vec![0.0; frame_size / 2],
        })
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Estimates the fundamental frequency of one frame.
    ///
    /// # Arguments
    /// * `frame` - A validated frame; its length must match the detector
    ///
    /// # Returns
    /// * `Ok(FrequencyEstimate::Pitch(hz))` - Detected fundamental
    /// * `Ok(FrequencyEstimate::NoSignal)` - Silence or no clear period
    /// * `Err(TunerError::MalformedFrame)` - Frame length does not match
    pub fn detect(&mut self, frame: &SampleFrame) -> Result<FrequencyEstimate, TunerError> {
        if frame.len() != self.frame_size {
            return Err(TunerError::MalformedFrame {
                expected: self.frame_size,
                got: frame.len(),
            });
        }
        Ok(autocorrelate(
            frame.samples(),
            frame.sample_rate(),
            &mut self.correlations,
        ))
    }
}

/// One-shot autocorrelation pitch estimate of a validated frame of any
/// supported size.
///
/// Raw samples go through [`SampleFrame::new`] first, which rejects
/// non-finite samples and non-power-of-two lengths. Allocates its own
/// scratch buffer; prefer [`PitchDetector`] inside a capture loop.
///
/// # Returns
/// * `FrequencyEstimate::Pitch(hz)` - Detected frequency in Hz
/// * `FrequencyEstimate::NoSignal` - Silence or no usable periodicity
///
/// The `8 * shift` refinement is not normalized for level, so accuracy
/// depends on amplitude above roughly 900 Hz: quiet tones read slightly
/// sharp and full-scale tones slightly flat, by up to a few percent.
pub fn detect_pitch_autocorrelation(frame: &SampleFrame) -> FrequencyEstimate {
    let mut correlations = vec![0.0; frame.len() / 2];
    autocorrelate(frame.samples(), frame.sample_rate(), &mut correlations)
}

fn autocorrelate(signal: &[f32], sample_rate: u32, correlations: &mut [f32]) -> FrequencyEstimate {
    // --- Noise Gate: RMS over the full frame ---
    if rms(signal) < RMS_NOISE_FLOOR {
        return FrequencyEstimate::NoSignal;
    }

    let half = signal.len() / 2;
    if half < 2 || sample_rate == 0 {
        return FrequencyEstimate::NoSignal;
    }
    let sample_rate = sample_rate as f32;

    let mut best_offset = 0usize;
    let mut best_correlation = 0.0f32;
    let mut last_correlation = 1.0f32;
    let mut locked = false;

    for offset in 0..half {
        // Mean absolute difference against the shifted copy.
        let mut distance = 0.0f32;
        for i in 0..half {
            distance += (signal[i] - signal[i + offset]).abs();
        }
        let correlation = 1.0 - distance / half as f32;
        correlations[offset] = correlation;

        let rising = correlation > last_correlation;
        if rising {
            if correlation > LOCK_ON_CORRELATION {
                locked = true;
            }
            if correlation > best_correlation {
                best_correlation = correlation;
                best_offset = offset;
            }
        } else if locked {
            // Past the peak. best_offset >= 1 because lag 0 can never rise,
            // and best_offset + 1 <= offset has already been filled in.
            let shift = (correlations[best_offset + 1] - correlations[best_offset - 1])
                / correlations[best_offset].max(1.0);
            let period = best_offset as f32 + SHIFT_FACTOR * shift;
            log::trace!("autocorrelation locked at lag {best_offset}, shift {shift:.4}");
            return FrequencyEstimate::from_hz(sample_rate / period);
        }
        last_correlation = correlation;
    }

    if best_offset > 0 && best_correlation > FALLBACK_CORRELATION {
        return FrequencyEstimate::from_hz(sample_rate / best_offset as f32);
    }
    FrequencyEstimate::NoSignal
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const SAMPLE_RATE: u32 = 44_100;
    const FRAME: usize = 2048;

    fn sine(freq: f32, amplitude: f32) -> Vec<f32> {
        (0..FRAME)
            .map(|i| amplitude * (2.0 * PI * freq * i as f32 / SAMPLE_RATE as f32).sin())
            .collect()
    }

    fn relative_error(freq: f32, amplitude: f32) -> f32 {
        let frame = SampleFrame::new(sine(freq, amplitude), SAMPLE_RATE).unwrap();
        let estimate = detect_pitch_autocorrelation(&frame);
        assert!(estimate.is_signal(), "{freq} Hz at {amplitude} gave no pitch");
        let hz = estimate.hz().unwrap();
        (hz - freq) / freq
    }

    #[test]
    fn detects_sines_within_one_percent() {
        let mut detector = PitchDetector::new(FRAME).unwrap();
        for freq in [82.41, 110.0, 196.0, 261.63, 440.0, 659.25, 987.77, 1500.0, 2000.0] {
            let frame = SampleFrame::new(sine(freq, 0.5), SAMPLE_RATE).unwrap();
            let estimate = detector.detect(&frame).unwrap();
            let hz = estimate.hz().expect("sine should produce a pitch");
            let error = (hz - freq).abs() / freq;
            assert!(error < 0.01, "{freq} Hz detected as {hz} Hz ({:.3}%)", error * 100.0);
        }
    }

    #[test]
    fn detects_quiet_sines_just_above_the_gate() {
        // Amplitude 0.015 is an RMS of ~0.0106.
        for freq in [82.41, 110.0, 196.0, 261.63, 330.0, 440.0, 523.25, 659.25, 880.0] {
            let error = relative_error(freq, 0.015);
            assert!(error.abs() < 0.01, "{freq} Hz off by {:.3}%", error * 100.0);
        }
    }

    #[test]
    fn high_notes_drift_with_level() {
        // Quiet high notes read sharp, full-scale ones read flat.
        let quiet = relative_error(1500.0, 0.015);
        assert!(quiet > 0.01 && quiet < 0.02, "quiet 1500 Hz off by {quiet}");
        for freq in [1500.0, 1900.0] {
            let loud = relative_error(freq, 1.0);
            assert!(loud < -0.01 && loud > -0.025, "loud {freq} Hz off by {loud}");
        }
        // Same notes at a moderate level stay within 1%.
        for freq in [1500.0, 1900.0] {
            assert!(relative_error(freq, 0.5).abs() < 0.01);
        }
    }

    #[test]
    fn raw_samples_are_validated_before_detection() {
        let mut samples = sine(440.0, 0.5);
        samples[10] = f32::NAN;
        assert_eq!(
            SampleFrame::new(samples.clone(), SAMPLE_RATE),
            Err(TunerError::NonFiniteSample { index: 10 })
        );
        samples[10] = f32::INFINITY;
        assert_eq!(
            SampleFrame::new(samples, SAMPLE_RATE),
            Err(TunerError::NonFiniteSample { index: 10 })
        );
        assert_eq!(
            SampleFrame::new(sine(440.0, 0.5)[..1000].to_vec(), SAMPLE_RATE),
            Err(TunerError::InvalidFrameSize(1000))
        );
    }
    #[test]
    fn silence_is_no_signal() {
        let mut detector = PitchDetector::new(FRAME).unwrap();
        let frame = SampleFrame::new(vec![0.0; FRAME], SAMPLE_RATE).unwrap();
        assert_eq!(detector.detect(&frame).unwrap(), FrequencyEstimate::NoSignal);
    }

    #[test]
    fn quiet_signal_is_gated() {
        // RMS of a 0.01 amplitude sine is ~0.007, under the floor.
        let frame = SampleFrame::new(sine(440.0, 0.01), SAMPLE_RATE).unwrap();
        let estimate = detect_pitch_autocorrelation(&frame);
        assert_eq!(estimate, FrequencyEstimate::NoSignal);
        assert!(!estimate.is_signal());
    }

    #[test]
    fn rejects_frames_of_the_wrong_length() {
        let mut detector = PitchDetector::new(FRAME).unwrap();
        let frame = SampleFrame::new(vec![0.1; 1024], SAMPLE_RATE).unwrap();
        assert_eq!(
            detector.detect(&frame),
            Err(TunerError::MalformedFrame { expected: FRAME, got: 1024 })
        );
    }

    #[test]
    fn rejects_invalid_frame_sizes() {
        assert!(PitchDetector::new(0).is_err());
        assert!(PitchDetector::new(3000).is_err());
    }

    #[test]
    fn free_function_matches_detector() {
        let frame = SampleFrame::new(sine(330.0, 0.4), SAMPLE_RATE).unwrap();
        let mut detector = PitchDetector::new(FRAME).unwrap();
        assert_eq!(detector.detect(&frame).unwrap(), detect_pitch_autocorrelation(&frame));
    }
}
