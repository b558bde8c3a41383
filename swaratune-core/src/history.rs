//! # Frequency History
//!
//! Bounded ring of recent smoothed frequencies, oldest first, for trend
//! graphs. Silent ticks decay the previous value instead of dropping to zero
//! so a graph fades out rather than jumping.

use std::collections::VecDeque;

/// Number of samples kept for display.
pub const HISTORY_CAPACITY: usize = 100;
/// Multiplier applied to the previous value on a silent tick.
pub const SILENCE_DECAY: f32 = 0.98;
/// Decayed values below this (Hz) are stored as the `0.0` silence sentinel.
const SILENCE_FLOOR_HZ: f32 = 1.0;

#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    samples: VecDeque<f32>,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Appends a frequency, evicting the oldest sample when full.
    pub fn push(&mut self, hz: f32) {
        if self.samples.len() == HISTORY_CAPACITY {
            self.samples.pop_front();
        }
        self.samples.push_back(hz);
    }

    /// Appends `previous × 0.98` for a tick without signal.
    pub fn push_silence(&mut self) {
        let decayed = self.latest().unwrap_or(0.0) * SILENCE_DECAY;
        self.push(if decayed < SILENCE_FLOOR_HZ { 0.0 } else { decayed });
    }

    pub fn latest(&self) -> Option<f32> {
        self.samples.back().copied()
    }

    /// Iterates oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples.iter().copied()
    }

    /// Copy of the buffer, oldest first.
    pub fn snapshot(&self) -> Vec<f32> {
        self.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        HISTORY_CAPACITY
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}
