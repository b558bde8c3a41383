//! # Tuner Configuration
//!
//! Per-instance settings, deserializable from the `[tuner]` table of a
//! config file. Every field has a default.

use serde::Deserialize;

use crate::frame::DEFAULT_FRAME_SIZE;

/// Tunable parameters of a [`crate::Tuner`].
///
/// Detection thresholds, the smoothing window, the debounce interval and the
/// history capacity are fixed and not part of this struct.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TunerConfig {
    /// Samples per analysis frame; a non-zero power of two.
    #[serde(default = "default_frame_size")]
    pub frame_size: usize,
    /// Snap smoothed values onto nearby equal-tempered pitches.
    #[serde(default = "default_quantize")]
    pub quantize: bool,
    #[serde(default = "default_sample_rate")]
    pub preferred_sample_rate: u32,
    /// Input device name; the host default when unset.
    #[serde(default)]
    pub device: Option<String>,
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            frame_size: default_frame_size(),
            quantize: default_quantize(),
            preferred_sample_rate: default_sample_rate(),
            device: None,
        }
    }
}

fn default_frame_size() -> usize { DEFAULT_FRAME_SIZE }
fn default_quantize() -> bool { true }
fn default_sample_rate() -> u32 { 44_100 }
