//! # Capture Sessions
//!
//! A [`CaptureSession`] owns exactly one open audio stream. It is the only
//! handle to the device: disposing it (or dropping it) stops the stream and
//! releases the device, and there is no global teardown hook.

use crate::audio::{AudioSource, AudioStream};
use crate::error::{CaptureError, TunerError};
use crate::frame::SampleFrame;

pub struct CaptureSession {
    stream: Option<Box<dyn AudioStream>>,
    frame_size: usize,
}

impl CaptureSession {
    /// Acquires a stream from `source`.
    ///
    /// # Returns
    /// * `Ok(session)` - The device is open and delivering frames
    /// * `Err(e)` - Acquisition failed; no handle is held
    pub fn start(source: &mut dyn AudioSource, frame_size: usize) -> Result<Self, CaptureError> {
        let stream = source.open(frame_size)?;
        log::info!("Capture session started at {} Hz", stream.sample_rate());
        Ok(Self {
            stream: Some(stream),
            frame_size,
        })
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.stream.as_ref().map(|s| s.sample_rate())
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Reads the freshest frame, validated.
    ///
    /// # Returns
    /// * `Ok(Some(frame))` - A new frame is ready
    /// * `Ok(None)` - Nothing new since the last read
    /// * `Err(TunerError::DeviceUnavailable)` - The stream failed or is closed
    /// * `Err(TunerError::NonFiniteSample)` and friends - The device produced garbage
    pub fn read_frame(&mut self) -> Result<Option<SampleFrame>, TunerError> {
        let stream = self.stream.as_mut().ok_or(CaptureError::StreamClosed)?;
        let sample_rate = stream.sample_rate();
        match stream.next_frame()? {
            Some(samples) => SampleFrame::new(samples, sample_rate).map(Some),
            None => Ok(None),
        }
    }

    /// Stops the stream and releases the device.
    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.close();
            log::info!("Capture session disposed");
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("open", &self.is_open())
            .field("frame_size", &self.frame_size)
            .finish()
    }
}
