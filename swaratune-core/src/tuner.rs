//! # Tuner
//!
//! The single owner of all per-instance state: the detector, the smoothing
//! window, the history ring, the recorder and at most one capture session.
//!
//! The tuner never schedules itself. A caller drives it with [`Tuner::tick`]
//! (pull a frame from the active session) or [`Tuner::step`] (analyse a frame
//! it already has) at whatever cadence suits it; ticks must be serial.
//!
//! Per tick: frame -> detector -> smoother -> classifier -> recorder, and the
//! smoothed value (or a decayed one on silence) goes into the history.

use std::time::Duration;

use crate::audio::AudioSource;
use crate::config::TunerConfig;
use crate::error::TunerError;
use crate::frame::SampleFrame;
use crate::history::HistoryBuffer;
use crate::note::{NoteClassification, classify};
use crate::pitch::{FrequencyEstimate, PitchDetector};
use crate::recorder::{NoteEvent, NoteRecorder, RecorderState};
use crate::session::CaptureSession;
use crate::smoothing::Smoother;
use crate::{Reading, ReadingStatus};

#[derive(Debug)]
pub struct Tuner {
    config: TunerConfig,
    detector: PitchDetector,
    smoother: Smoother,
    history: HistoryBuffer,
    recorder: NoteRecorder,
    session: Option<CaptureSession>,
}

impl Tuner {
    /// # Returns
    /// * `Err(TunerError::InvalidFrameSize)` - `config.frame_size` is unusable
    pub fn new(config: TunerConfig) -> Result<Self, TunerError> {
        let detector = PitchDetector::new(config.frame_size)?;
        let smoother = Smoother::new(config.quantize);
        Ok(Self {
            config,
            detector,
            smoother,
            history: HistoryBuffer::new(),
            recorder: NoteRecorder::new(),
            session: None,
        })
    }

    pub fn config(&self) -> &TunerConfig {
        &self.config
    }

    // --- Capture lifecycle ---

    /// Opens a capture session on `source`.
    ///
    /// Any active session is fully disposed first, so at most one device
    /// handle is ever open. If acquisition fails the tuner is left without a
    /// session and the recorder is not touched.
    pub fn start_listening(&mut self, source: &mut dyn AudioSource) -> Result<(), TunerError> {
        self.stop_listening();
        match CaptureSession::start(source, self.config.frame_size) {
            Ok(session) => {
                self.smoother.reset();
                self.session = Some(session);
                Ok(())
            }
            Err(e) => {
                log::warn!("Could not start capture: {}", e);
                Err(TunerError::DeviceUnavailable(e))
            }
        }
    }

    /// Disposes the active session, if any. Safe to call repeatedly.
    pub fn stop_listening(&mut self) {
        if let Some(session) = self.session.take() {
            session.dispose();
        }
    }

    pub fn is_listening(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&CaptureSession> {
        self.session.as_ref()
    }

    /// Pulls the freshest frame from the active session and analyses it.
    ///
    /// # Returns
    /// * `Ok(Some(reading))` - A frame was analysed
    /// * `Ok(None)` - No new frame this tick
    /// * `Err(TunerError::NotListening)` - No active session
    /// * `Err(TunerError::DeviceUnavailable)` - The stream failed; the session
    ///   is torn down and any recording is stopped with its events kept
    pub fn tick(&mut self, now: Duration) -> Result<Option<Reading>, TunerError> {
        let session = self.session.as_mut().ok_or(TunerError::NotListening)?;
        let frame = match session.read_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(None),
            Err(e @ TunerError::DeviceUnavailable(_)) => {
                log::warn!("Capture failed mid-session: {}", e);
                self.stop_listening();
                self.recorder.stop();
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        self.step(&frame, now).map(Some)
    }

    /// Runs one frame through the whole pipeline.
    ///
    /// A frame of the wrong length is rejected before any state changes.
    pub fn step(&mut self, frame: &SampleFrame, now: Duration) -> Result<Reading, TunerError> {
        let estimate = self.detector.detect(frame)?;
        let smoothed = self.smoother.push(estimate);

        let reading = match (estimate, smoothed) {
            (FrequencyEstimate::Pitch(_), Some(hz)) => {
                let classification = classify(hz);
                self.history.push(hz);
                self.recorder.record(&classification, now);
                Reading {
                    frequency_hz: Some(hz),
                    classification,
                    status: ReadingStatus::Listening,
                }
            }
            _ => {
                self.history.push_silence();
                Reading::waiting()
            }
        };

        log::debug!(
            "tick {} ms: raw {:?}, smoothed {:?}, note {}",
            now.as_millis(),
            estimate.hz(),
            reading.frequency_hz,
            reading.classification.note_name()
        );
        Ok(reading)
    }

    // --- Recording ---

    /// Starts a fresh recording, discarding any previous log.
    pub fn start_recording(&mut self) {
        self.recorder.start();
        log::info!("Recording started");
    }

    /// Freezes the current recording. Safe to call when not recording.
    pub fn stop_recording(&mut self) {
        self.recorder.stop();
    }

    pub fn recorder_state(&self) -> RecorderState {
        self.recorder.state()
    }

    pub fn recorded_events(&self) -> &[NoteEvent] {
        self.recorder.events()
    }

    /// Frozen events of the most recent completed recording.
    pub fn export_events(&self) -> Option<&[NoteEvent]> {
        self.recorder.export()
    }

    // --- Visualisation ---

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// Classification of the current smoothed value, without feeding a frame.
    pub fn current_classification(&self) -> NoteClassification {
        self.smoother
            .current()
            .map_or(NoteClassification::Unknown, classify)
    }
}

impl Drop for Tuner {
    fn drop(&mut self) {
        self.stop_listening();
    }
}
