//! # Note Recorder
//!
//! A debounced log of note changes. The recorder is either `Idle` or `Armed`;
//! only an armed recorder appends events, and a stopped recorder keeps its log
//! frozen until the next recording starts.
//!
//! Starting a new recording always discards the previous log, exported or
//! not.

use serde::Serialize;
use std::time::Duration;

use crate::note::{Note, NoteClassification, PitchClass};

/// Minimum time between two recorded events.
pub const DEBOUNCE_INTERVAL: Duration = Duration::from_millis(200);

/// Recording state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Armed,
}

/// One accepted note change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoteEvent {
    pub note: Note,
    /// Time on the caller's clock, in milliseconds when serialized.
    #[serde(rename = "timestampMs", serialize_with = "serialize_millis")]
    pub timestamp: Duration,
}

fn serialize_millis<S: serde::Serializer>(
    value: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(value.as_millis() as u64)
}

#[derive(Debug, Clone)]
pub struct NoteRecorder {
    state: RecorderState,
    events: Vec<NoteEvent>,
    last_pitch_class: Option<PitchClass>,
    last_event_at: Option<Duration>,
    // Set once a session has been started, so `export` can tell an empty
    // finished session from "never recorded".
    has_session: bool,
}

impl NoteRecorder {
    pub fn new() -> Self {
        Self {
            state: RecorderState::Idle,
            events: Vec::new(),
            last_pitch_class: None,
            last_event_at: None,
            has_session: false,
        }
    }

    /// Arms the recorder with an empty log and fresh debounce trackers.
    pub fn start(&mut self) {
        if !self.events.is_empty() {
            log::info!("Discarding {} previously recorded events", self.events.len());
        }
        self.events.clear();
        self.last_pitch_class = None;
        self.last_event_at = None;
        self.has_session = true;
        self.state = RecorderState::Armed;
    }

    /// Disarms the recorder. The log is kept. Safe to call while idle.
    pub fn stop(&mut self) {
        if self.state == RecorderState::Armed {
            log::info!("Recording stopped with {} events", self.events.len());
        }
        self.state = RecorderState::Idle;
    }

    /// Offers one classification taken at `now`.
    ///
    /// A known note is appended when the recorder is armed, its pitch class
    /// differs from the last recorded one, and more than
    /// [`DEBOUNCE_INTERVAL`] has passed since the last recorded event.
    /// Unknown classifications are ignored and leave the trackers untouched.
    ///
    /// # Returns
    /// * `true` - An event was appended
    /// * `false` - Nothing recorded
    pub fn record(&mut self, classification: &NoteClassification, now: Duration) -> bool {
        if self.state != RecorderState::Armed {
            return false;
        }
        let Some(note) = classification.note() else {
            return false;
        };
        if self.last_pitch_class == Some(note.pitch_class) {
            return false;
        }
        if let Some(last) = self.last_event_at {
            // A clock running backwards saturates to zero and is rejected.
            if now.saturating_sub(last) <= DEBOUNCE_INTERVAL {
                return false;
            }
        }

        log::debug!("Recorded {} at {} ms", note, now.as_millis());
        self.events.push(NoteEvent { note, timestamp: now });
        self.last_pitch_class = Some(note.pitch_class);
        self.last_event_at = Some(now);
        true
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.state == RecorderState::Armed
    }

    /// The current log, live while armed.
    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    /// The frozen log of the most recent completed recording.
    ///
    /// `None` while a recording is in progress or before any recording.
    pub fn export(&self) -> Option<&[NoteEvent]> {
        match self.state {
            RecorderState::Idle if self.has_session => Some(&self.events),
            _ => None,
        }
    }
}

impl Default for NoteRecorder {
    fn default() -> Self {
        Self::new()
    }
}
