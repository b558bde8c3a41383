//! Integration tests for the capture lifecycle and the per-tick pipeline,
//! driven by scripted audio sources.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::f32::consts::PI;
use std::rc::Rc;
use std::time::Duration;

use swaratune_core::{
    AudioSource, AudioStream, CaptureError, RecorderState, ReadingStatus, ToneSource, Tuner,
    TunerConfig, TunerError,
};

const SAMPLE_RATE: u32 = 44_100;
const FRAME: usize = 2048;

/// What a scripted stream hands out on each read.
#[derive(Clone)]
enum Step {
    Tone(f32),
    Silence,
    Nothing,
    Fail,
}

#[derive(Default)]
struct DeviceLog {
    opened: usize,
    closed: usize,
}

impl DeviceLog {
    fn open_handles(&self) -> usize {
        self.opened - self.closed
    }
}

struct ScriptedSource {
    script: Vec<Step>,
    refuse: Option<CaptureError>,
    log: Rc<RefCell<DeviceLog>>,
}

impl ScriptedSource {
    fn new(script: Vec<Step>) -> Self {
        Self {
            script,
            refuse: None,
            log: Rc::default(),
        }
    }

    fn refusing(error: CaptureError) -> Self {
        Self {
            refuse: Some(error),
            ..Self::new(Vec::new())
        }
    }
}

impl AudioSource for ScriptedSource {
    fn open(&mut self, frame_size: usize) -> Result<Box<dyn AudioStream>, CaptureError> {
        if let Some(error) = &self.refuse {
            return Err(error.clone());
        }
        self.log.borrow_mut().opened += 1;
        Ok(Box::new(ScriptedStream {
            steps: self.script.iter().cloned().collect(),
            frame_size,
            log: Rc::clone(&self.log),
            closed: false,
        }))
    }
}

struct ScriptedStream {
    steps: VecDeque<Step>,
    frame_size: usize,
    log: Rc<RefCell<DeviceLog>>,
    closed: bool,
}

impl AudioStream for ScriptedStream {
    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn next_frame(&mut self) -> Result<Option<Vec<f32>>, CaptureError> {
        match self.steps.pop_front().unwrap_or(Step::Nothing) {
            Step::Tone(freq) => Ok(Some(
                (0..self.frame_size)
                    .map(|i| 0.5 * (2.0 * PI * freq * i as f32 / SAMPLE_RATE as f32).sin())
                    .collect(),
            )),
            Step::Silence => Ok(Some(vec![0.0; self.frame_size])),
            Step::Nothing => Ok(None),
            Step::Fail => Err(CaptureError::Unavailable("unplugged".into())),
        }
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.log.borrow_mut().closed += 1;
        }
    }
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn tuner() -> Tuner {
    Tuner::new(TunerConfig::default()).unwrap()
}

#[test]
fn ticks_produce_readings_from_the_session() {
    let mut source = ScriptedSource::new(vec![Step::Tone(440.0), Step::Nothing, Step::Silence]);
    let mut tuner = tuner();
    tuner.start_listening(&mut source).unwrap();

    let reading = tuner.tick(ms(0)).unwrap().unwrap();
    assert_eq!(reading.note_name(), "A");
    assert_eq!(reading.status, ReadingStatus::Listening);

    assert_eq!(tuner.tick(ms(16)).unwrap(), None);

    let reading = tuner.tick(ms(32)).unwrap().unwrap();
    assert_eq!(reading.status, ReadingStatus::Waiting);
    assert_eq!(reading.note_name(), "unknown");
}

#[test]
fn acquisition_failure_leaves_no_residual_state() {
    let mut tuner = tuner();
    tuner.start_recording();
    let mut refused = ScriptedSource::refusing(CaptureError::PermissionDenied("user said no".into()));

    let err = tuner.start_listening(&mut refused).unwrap_err();
    assert_eq!(
        err,
        TunerError::DeviceUnavailable(CaptureError::PermissionDenied("user said no".into()))
    );
    assert!(!tuner.is_listening());
    assert_eq!(tuner.tick(ms(0)), Err(TunerError::NotListening));
    assert_eq!(tuner.recorder_state(), RecorderState::Armed);
}

#[test]
fn restarting_disposes_the_previous_session_first() {
    let mut first = ScriptedSource::new(vec![Step::Tone(440.0)]);
    let mut second = ScriptedSource::new(vec![Step::Tone(261.63)]);
    let mut tuner = tuner();

    tuner.start_listening(&mut first).unwrap();
    tuner.start_listening(&mut second).unwrap();
    assert_eq!(first.log.borrow().open_handles(), 0);
    assert_eq!(second.log.borrow().open_handles(), 1);

    // The new session is the one being read.
    assert_eq!(tuner.tick(ms(0)).unwrap().unwrap().note_name(), "C");
}

#[test]
fn stop_is_idempotent() {
    let mut source = ScriptedSource::new(Vec::new());
    let mut tuner = tuner();
    tuner.stop_listening();

    tuner.start_listening(&mut source).unwrap();
    tuner.stop_listening();
    tuner.stop_listening();
    assert!(!tuner.is_listening());
    assert_eq!(source.log.borrow().opened, 1);
    assert_eq!(source.log.borrow().closed, 1);
}

#[test]
fn dropping_the_tuner_releases_the_device() {
    let mut source = ScriptedSource::new(Vec::new());
    {
        let mut tuner = tuner();
        tuner.start_listening(&mut source).unwrap();
        assert_eq!(source.log.borrow().open_handles(), 1);
    }
    assert_eq!(source.log.borrow().open_handles(), 0);
}

#[test]
fn device_failure_keeps_partial_recording() {
    let mut source = ScriptedSource::new(vec![
        Step::Tone(440.0),
        Step::Tone(440.0),
        Step::Tone(440.0),
        Step::Tone(440.0),
        Step::Tone(440.0),
        Step::Fail,
    ]);
    let mut tuner = tuner();
    tuner.start_listening(&mut source).unwrap();
    tuner.start_recording();

    for tick in 0..5 {
        tuner.tick(ms(tick * 16)).unwrap();
    }
    let err = tuner.tick(ms(80)).unwrap_err();
    assert!(matches!(err, TunerError::DeviceUnavailable(CaptureError::Unavailable(_))));

    assert!(!tuner.is_listening());
    assert_eq!(source.log.borrow().open_handles(), 0);
    assert_eq!(tuner.recorder_state(), RecorderState::Idle);
    let exported = tuner.export_events().expect("partial log is exportable");
    assert_eq!(exported.len(), 1);
    assert_eq!(exported[0].note.name(), "A");
}

#[test]
fn recording_follows_a_melody() {
    // Sa Re Ga, 100 ms ticks.
    let melody = [
        261.63, 261.63, 261.63, 293.66, 293.66, 293.66, 329.63, 329.63, 329.63, 329.63,
        329.63, 329.63,
    ];
    let mut source = ScriptedSource::new(melody.iter().map(|&f| Step::Tone(f)).collect());
    let mut tuner = Tuner::new(TunerConfig {
        quantize: true,
        ..TunerConfig::default()
    })
    .unwrap();
    tuner.start_listening(&mut source).unwrap();
    tuner.start_recording();

    for tick in 0..melody.len() as u64 {
        tuner.tick(ms(tick * 100)).unwrap();
    }
    tuner.stop_recording();

    let swaras: Vec<_> = tuner
        .export_events()
        .unwrap()
        .iter()
        .map(|e| e.note.swara())
        .collect();
    // The trailing mean lags a tick or two behind each change, and can
    // pass through an in-between note, but the log starts on Sa and
    // reaches Ga in order.
    assert_eq!(swaras.first(), Some(&"Sa"));
    assert_eq!(swaras.last(), Some(&"Ga"));
    let events = tuner.export_events().unwrap();
    assert!(events.windows(2).all(|w| w[1].timestamp - w[0].timestamp > ms(200)));
}

#[test]
fn new_recording_starts_empty() {
    let mut source = ScriptedSource::new(vec![Step::Tone(440.0), Step::Tone(440.0)]);
    let mut tuner = tuner();
    tuner.start_listening(&mut source).unwrap();

    tuner.start_recording();
    tuner.tick(ms(0)).unwrap();
    tuner.stop_recording();
    assert_eq!(tuner.export_events().map(|events| events.len()), Some(1));

    tuner.start_recording();
    assert!(tuner.recorded_events().is_empty());
    assert_eq!(tuner.export_events(), None);
}

#[test]
fn history_holds_the_last_hundred_ticks() {
    let mut source = ToneSource::new(440.0, 0.5, SAMPLE_RATE);
    let mut tuner = tuner();
    tuner.start_listening(&mut source).unwrap();
    for tick in 0..150 {
        tuner.tick(ms(tick * 16)).unwrap();
    }
    let history = tuner.history().snapshot();
    assert_eq!(history.len(), 100);
    assert!(history.iter().all(|&hz| hz == 440.0));
}

#[test]
fn frame_size_follows_config() {
    let mut source = ScriptedSource::new(vec![Step::Tone(440.0)]);
    let mut tuner = Tuner::new(TunerConfig {
        frame_size: 4096,
        ..TunerConfig::default()
    })
    .unwrap();
    tuner.start_listening(&mut source).unwrap();
    assert_eq!(tuner.session().map(|s| s.frame_size()), Some(FRAME * 2));
    let reading = tuner.tick(ms(0)).unwrap().unwrap();
    assert_eq!(reading.frequency_hz, Some(440.0));
}
