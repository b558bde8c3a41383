//! # Sample Frames
//!
//! A [`SampleFrame`] is one fixed-length block of mono samples together with
//! the rate it was captured at. Frames are validated once on construction and
//! are immutable afterwards, so the detector never sees NaNs or odd lengths.

use crate::error::TunerError;

/// Default number of samples per analysis frame (~46ms at 44.1kHz).
pub const DEFAULT_FRAME_SIZE: usize = 2048;

/// One captured block of mono audio.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleFrame {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl SampleFrame {
    /// Builds a frame, rejecting empty or non-power-of-two lengths,
    /// a zero sample rate and any non-finite sample.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, TunerError> {
        if !is_valid_frame_size(samples.len()) {
            return Err(TunerError::InvalidFrameSize(samples.len()));
        }
        if sample_rate == 0 {
            return Err(TunerError::InvalidSampleRate);
        }
        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(TunerError::NonFiniteSample { index });
        }
        Ok(Self { samples, sample_rate })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Root-mean-square level over the whole frame.
    pub fn rms(&self) -> f32 {
        rms(&self.samples)
    }
}

pub(crate) fn is_valid_frame_size(len: usize) -> bool {
    len > 0 && len.is_power_of_two()
}

pub(crate) fn rms(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    (signal.iter().map(|&s| s * s).sum::<f32>() / signal.len() as f32).sqrt()
}
