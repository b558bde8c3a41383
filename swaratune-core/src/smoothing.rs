//! # Frequency Smoothing
//!
//! De-jitters detector output with a short trailing mean and optionally snaps
//! the result onto the nearest equal-tempered pitch.

use std::collections::VecDeque;

use crate::pitch::FrequencyEstimate;
use crate::tuning::snap_to_equal_temperament;

/// Number of valid estimates averaged together.
pub const SMOOTHING_WINDOW: usize = 5;

/// Trailing-mean smoother over the last [`SMOOTHING_WINDOW`] valid estimates.
///
/// Silent ticks are never averaged in. Each one evicts the oldest entry
/// instead, so after `SMOOTHING_WINDOW` silent ticks the window is empty and
/// stale pitches stop being reported.
#[derive(Debug, Clone)]
pub struct Smoother {
    window: VecDeque<f32>,
    quantize: bool,
}

impl Smoother {
    pub fn new(quantize: bool) -> Self {
        Self {
            window: VecDeque::with_capacity(SMOOTHING_WINDOW),
            quantize,
        }
    }

    /// Feeds one detector estimate and returns the smoothed frequency.
    ///
    /// # Returns
    /// * `Some(hz)` - Mean of the window, snapped when quantization is on
    /// * `None` - The window is empty
    pub fn push(&mut self, estimate: FrequencyEstimate) -> Option<f32> {
        match estimate {
            FrequencyEstimate::Pitch(hz) => {
                if self.window.len() == SMOOTHING_WINDOW {
                    self.window.pop_front();
                }
                self.window.push_back(hz);
            }
            FrequencyEstimate::NoSignal => {
                self.window.pop_front();
            }
        }
        self.current()
    }

    /// Smoothed value for the current window without feeding anything.
    pub fn current(&self) -> Option<f32> {
        if self.window.is_empty() {
            return None;
        }
        let mean = self.window.iter().sum::<f32>() / self.window.len() as f32;
        Some(if self.quantize {
            snap_to_equal_temperament(mean)
        } else {
            mean
        })
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn quantize(&self) -> bool {
        self.quantize
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }
}

impl Default for Smoother {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use FrequencyEstimate::{NoSignal, Pitch};

    #[test]
    fn near_pitch_mean_snaps_exactly() {
        let mut smoother = Smoother::new(true);
        let mut out = None;
        for hz in [441.0, 443.0, 442.0, 440.0, 444.0] {
            out = smoother.push(Pitch(hz));
        }
        // Mean is 442, within 3 Hz of A4.
        assert_eq!(out, Some(440.0));
    }

    #[test]
    fn far_mean_is_left_alone() {
        let mut smoother = Smoother::new(true);
        smoother.push(Pitch(452.0));
        assert_eq!(smoother.push(Pitch(454.0)), Some(453.0));
    }

    #[test]
    fn quantization_can_be_disabled() {
        let mut smoother = Smoother::new(false);
        assert_eq!(smoother.push(Pitch(442.0)), Some(442.0));
    }

    #[test]
    fn window_keeps_last_five() {
        let mut smoother = Smoother::new(false);
        for hz in [100.0, 200.0, 300.0, 400.0, 500.0, 600.0] {
            smoother.push(Pitch(hz));
        }
        assert_eq!(smoother.len(), SMOOTHING_WINDOW);
        assert_relative_eq!(smoother.current().unwrap(), 400.0);
    }

    #[test]
    fn silence_drains_the_window() {
        let mut smoother = Smoother::new(false);
        for hz in [300.0, 310.0, 320.0, 330.0, 340.0] {
            smoother.push(Pitch(hz));
        }
        assert_relative_eq!(smoother.push(NoSignal).unwrap(), 325.0);
        for _ in 0..3 {
            assert!(smoother.push(NoSignal).is_some());
        }
        assert_eq!(smoother.push(NoSignal), None);
        assert!(smoother.is_empty());
        assert_eq!(smoother.push(NoSignal), None);
    }
}
