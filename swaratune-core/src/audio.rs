//! # Audio Capture Module
//!
//! This module defines the seam between the tuner and whatever produces
//! samples, and provides two implementations of it:
//!
//! - [`CpalSource`]: real-time capture from an input device using CPAL
//!   (Cross-Platform Audio Library)
//! - [`ToneSource`]: a deterministic sine generator for demos and tests
//!
//! ## Features
//! - Default or named input device selection
//! - Sample rate negotiation around a preferred rate
//! - Interleaved channels downmixed to mono
//! - Frame accumulation on the audio thread, handed over through a
//!   bounded crossbeam channel
//! - Stream errors surfaced on the next read instead of being printed

use anyhow::{Context, anyhow};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SupportedStreamConfigRange;
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::f64::consts::PI;

use crate::error::CaptureError;

/// Frames buffered between the audio callback and the tuner.
const FRAME_QUEUE_DEPTH: usize = 4;

/// Something that can open a capture stream, such as a microphone.
pub trait AudioSource {
    /// Acquires the device and starts delivering frames.
    ///
    /// On failure nothing may be left running or held open.
    fn open(&mut self, frame_size: usize) -> Result<Box<dyn AudioStream>, CaptureError>;
}

/// An open capture stream. Exactly one device handle per stream.
pub trait AudioStream {
    /// Rate of the frames this stream produces, in Hz.
    fn sample_rate(&self) -> u32;

    /// Takes the freshest complete frame of mono samples.
    ///
    /// # Returns
    /// * `Ok(Some(samples))` - A frame of exactly the requested size
    /// * `Ok(None)` - No complete frame yet; try again next tick
    /// * `Err(e)` - The stream failed and should be torn down
    fn next_frame(&mut self) -> Result<Option<Vec<f32>>, CaptureError>;

    /// Stops the stream and releases the device. Must be idempotent.
    fn close(&mut self);
}

/// Capture from a CPAL input device.
#[derive(Debug, Clone)]
pub struct CpalSource {
    device_name: Option<String>,
    preferred_sample_rate: u32,
}

impl CpalSource {
    /// Uses the host's default input device.
    pub fn new(preferred_sample_rate: u32) -> Self {
        Self {
            device_name: None,
            preferred_sample_rate,
        }
    }

    /// Uses the input device with exactly this name.
    pub fn with_device(device_name: impl Into<String>, preferred_sample_rate: u32) -> Self {
        Self {
            device_name: Some(device_name.into()),
            preferred_sample_rate,
        }
    }

    fn select_device(&self) -> Result<cpal::Device, CaptureError> {
        let host = cpal::default_host();
        match &self.device_name {
            None => host.default_input_device().ok_or(CaptureError::NoDevice),
            Some(wanted) => {
                let devices = host
                    .input_devices()
                    .map_err(|e| CaptureError::Unavailable(e.to_string()))?;
                for device in devices {
                    if device.name().is_ok_and(|name| &name == wanted) {
                        return Ok(device);
                    }
                }
                Err(CaptureError::Unavailable(format!("no input device named {wanted:?}")))
            }
        }
    }
}

impl AudioSource for CpalSource {
    fn open(&mut self, frame_size: usize) -> Result<Box<dyn AudioStream>, CaptureError> {
        let device = self.select_device()?;
        let stream = start_audio_capture(&device, self.preferred_sample_rate, frame_size)
            .map_err(classify_capture_failure)?;
        Ok(Box::new(stream))
    }
}

/// An open CPAL input stream plus the channels fed by its callbacks.
pub struct CpalStream {
    stream: Option<cpal::Stream>,
    frames: Receiver<Vec<f32>>,
    errors: Receiver<String>,
    sample_rate: u32,
}

impl AudioStream for CpalStream {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn next_frame(&mut self) -> Result<Option<Vec<f32>>, CaptureError> {
        if self.stream.is_none() {
            return Err(CaptureError::StreamClosed);
        }
        if let Ok(message) = self.errors.try_recv() {
            return Err(CaptureError::Unavailable(message));
        }

        // Drain to the newest frame so the display never lags behind.
        let mut latest = None;
        loop {
            match self.frames.try_recv() {
                Ok(frame) => latest = Some(frame),
                Err(TryRecvError::Empty) => return Ok(latest),
                Err(TryRecvError::Disconnected) => {
                    return latest.map(Some).ok_or(CaptureError::StreamClosed);
                }
            }
        }
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                log::warn!("Error pausing input stream: {}", e);
            }
            drop(stream);
            log::info!("Input stream released");
        }
    }
}

impl Drop for CpalStream {
    fn drop(&mut self) {
        self.close();
    }
}

/// Starts audio capture from `device`.
///
/// This function:
/// 1. Picks the f32 configuration closest to `preferred_sample_rate`
/// 2. Builds an input stream whose callback downmixes to mono and
///    accumulates `frame_size` samples per frame
/// 3. Starts the stream
///
/// # Returns
/// * `Ok(stream)` - Running stream handle
/// * `Err(e)` - Error if audio setup fails; nothing is left running
fn start_audio_capture(
    device: &cpal::Device,
    preferred_sample_rate: u32,
    frame_size: usize,
) -> anyhow::Result<CpalStream> {
    let name = device.name().unwrap_or_else(|_| "<unnamed>".to_string());
    log::info!("Using audio input device: {}", name);

    let configs = device
        .supported_input_configs()
        .context("querying supported input configs")?
        .collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, preferred_sample_rate)
        .ok_or_else(|| anyhow!("No suitable f32 input format found"))?;

    let rate = preferred_sample_rate.clamp(
        supported_config.min_sample_rate().0,
        supported_config.max_sample_rate().0,
    );
    let config = supported_config.with_sample_rate(cpal::SampleRate(rate));
    let channels = config.channels().max(1) as usize;
    let config: cpal::StreamConfig = config.into();
    log::info!("Selected sample rate: {} Hz, {} channel(s)", rate, channels);

    let (frame_tx, frame_rx) = crossbeam_channel::bounded(FRAME_QUEUE_DEPTH);
    let (error_tx, error_rx) = crossbeam_channel::bounded(1);

    let mut accumulator = FrameAccumulator::new(frame_size, channels, frame_tx);
    let err_fn = move |err: cpal::StreamError| {
        log::warn!("An error occurred on the audio stream: {}", err);
        // Only the first error matters; the session is torn down on it.
        let _ = error_tx.try_send(err.to_string());
    };

    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| accumulator.push(data),
            err_fn,
            None,
        )
        .context("building input stream")?;
    stream.play().context("starting input stream")?;

    Ok(CpalStream {
        stream: Some(stream),
        frames: frame_rx,
        errors: error_rx,
        sample_rate: rate,
    })
}

/// Finds the best supported audio configuration for the target sample rate.
///
/// Only 32-bit float formats qualify. Mono is preferred over multi-channel,
/// then the range closest to `target_rate` wins.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let rate_distance = if (c.min_sample_rate().0..=c.max_sample_rate().0).contains(&target_rate) {
                0
            } else {
                let min_diff = (c.min_sample_rate().0 as i64 - target_rate as i64).abs();
                let max_diff = (c.max_sample_rate().0 as i64 - target_rate as i64).abs();
                min_diff.min(max_diff)
            };
            (c.channels() != 1, rate_distance)
        })
}

/// Maps setup failures onto the capture error the tuner reports.
fn classify_capture_failure(error: anyhow::Error) -> CaptureError {
    let message = format!("{:#}", error);
    let lower = message.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") || lower.contains("not authorized") {
        CaptureError::PermissionDenied(message)
    } else {
        CaptureError::Unavailable(message)
    }
}

/// Collects interleaved callback buffers into mono frames.
struct FrameAccumulator {
    frame_size: usize,
    channels: usize,
    buffer: Vec<f32>,
    sender: Sender<Vec<f32>>,
}

impl FrameAccumulator {
    fn new(frame_size: usize, channels: usize, sender: Sender<Vec<f32>>) -> Self {
        Self {
            frame_size,
            channels,
            buffer: Vec::with_capacity(frame_size * 2),
            sender,
        }
    }

    fn push(&mut self, data: &[f32]) {
        if self.channels == 1 {
            self.buffer.extend_from_slice(data);
        } else {
            let scale = 1.0 / self.channels as f32;
            self.buffer.extend(
                data.chunks(self.channels)
                    .map(|frame| frame.iter().sum::<f32>() * scale),
            );
        }

        // While we have enough data for a full frame, hand it over.
        while self.buffer.len() >= self.frame_size {
            let frame: Vec<f32> = self.buffer.drain(..self.frame_size).collect();
            // A full queue means the tuner is behind; drop the frame.
            let _ = self.sender.try_send(frame);
        }
    }
}

/// Lists the names of all input devices on the default host.
pub fn list_input_devices() -> Result<Vec<String>, CaptureError> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| CaptureError::Unavailable(e.to_string()))?;
    Ok(devices.filter_map(|device| device.name().ok()).collect())
}

/// Name of the default input device, if there is one.
pub fn default_input_device_name() -> Option<String> {
    cpal::default_host()
        .default_input_device()
        .and_then(|device| device.name().ok())
}

/// A synthetic source producing a continuous sine tone.
#[derive(Debug, Clone)]
pub struct ToneSource {
    frequency: f32,
    amplitude: f32,
    sample_rate: u32,
}

impl ToneSource {
    pub fn new(frequency: f32, amplitude: f32, sample_rate: u32) -> Self {
        Self {
            frequency,
            amplitude,
            sample_rate,
        }
    }
}

impl AudioSource for ToneSource {
    fn open(&mut self, frame_size: usize) -> Result<Box<dyn AudioStream>, CaptureError> {
        if self.sample_rate == 0 {
            return Err(CaptureError::Unavailable("tone sample rate is zero".into()));
        }
        log::info!("Generating a {:.2} Hz test tone", self.frequency);
        Ok(Box::new(ToneStream {
            source: self.clone(),
            frame_size,
            position: 0,
            open: true,
        }))
    }
}

struct ToneStream {
    source: ToneSource,
    frame_size: usize,
    position: u64,
    open: bool,
}

impl AudioStream for ToneStream {
    fn sample_rate(&self) -> u32 {
        self.source.sample_rate
    }

    fn next_frame(&mut self) -> Result<Option<Vec<f32>>, CaptureError> {
        if !self.open {
            return Err(CaptureError::StreamClosed);
        }
        let step = 2.0 * PI * self.source.frequency as f64 / self.source.sample_rate as f64;
        let start = self.position;
        let frame: Vec<f32> = (0..self.frame_size as u64)
            .map(|i| self.source.amplitude * ((start + i) as f64 * step).sin() as f32)
            .collect();
        self.position += self.frame_size as u64;
        Ok(Some(frame))
    }

    fn close(&mut self) {
        self.open = false;
    }
}
