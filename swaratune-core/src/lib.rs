// swaratune-core/src/lib.rs

//! The core logic for the swaratune instrument tuner.
//! This crate is responsible for audio capture, pitch detection, smoothing,
//! note classification (Western, swara and solfège), note recording and
//! the frequency history. It is completely headless and contains no UI code.

pub mod audio;
pub mod config;
pub mod error;
pub mod frame;
pub mod history;
pub mod note;
pub mod pitch;
pub mod recorder;
pub mod session;
pub mod smoothing;
pub mod tuner;
pub mod tuning;

pub use audio::{AudioSource, AudioStream, CpalSource, ToneSource};
pub use config::TunerConfig;
pub use error::{CaptureError, TunerError};
pub use frame::SampleFrame;
pub use history::HistoryBuffer;
pub use note::{Note, NoteClassification, PitchClass, classify};
pub use pitch::{FrequencyEstimate, PitchDetector};
pub use recorder::{NoteEvent, NoteRecorder, RecorderState};
pub use session::CaptureSession;
pub use smoothing::Smoother;
pub use tuner::Tuner;

/// Whether the last tick carried a usable pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingStatus {
    /// A pitch was detected this tick.
    Listening,
    /// The signal was too weak; waiting for sound.
    Waiting,
}

/// Represents the result of a single tick, refreshed every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// The smoothed frequency in Hz, `None` while waiting.
    pub frequency_hz: Option<f32>,
    /// The note the smoothed frequency falls on.
    pub classification: NoteClassification,
    pub status: ReadingStatus,
}

impl Reading {
    /// The reading shown while no signal is present.
    pub fn waiting() -> Self {
        Self {
            frequency_hz: None,
            classification: NoteClassification::Unknown,
            status: ReadingStatus::Waiting,
        }
    }

    pub fn note_name(&self) -> &'static str {
        self.classification.note_name()
    }

    pub fn octave(&self) -> Option<i32> {
        self.classification.octave()
    }

    pub fn swara(&self) -> &'static str {
        self.classification.swara()
    }

    pub fn solfege(&self) -> &'static str {
        self.classification.solfege()
    }
}
