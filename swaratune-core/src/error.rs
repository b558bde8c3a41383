//! # Error Types
//!
//! Errors surfaced by the tuner core. A weak signal is deliberately *not* an
//! error: it travels as [`crate::FrequencyEstimate::NoSignal`] and a
//! `Waiting` reading status.

use thiserror::Error;

/// Failures raised while acquiring or reading from an audio capture device.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CaptureError {
    /// The host reports no input device at all.
    #[error("no audio input device available")]
    NoDevice,

    /// The platform refused access to the microphone.
    #[error("microphone access denied: {0}")]
    PermissionDenied(String),

    /// The device exists but could not be opened or configured.
    #[error("audio device unavailable: {0}")]
    Unavailable(String),

    /// The stream stopped delivering frames after it was opened.
    #[error("audio stream closed unexpectedly")]
    StreamClosed,
}

/// Errors returned by the tuner pipeline and its capture lifecycle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TunerError {
    /// A frame did not have the length the detector was built for.
    #[error("expected frame of length {expected}, got {got}")]
    MalformedFrame {
        /// Frame length the detector was configured with.
        expected: usize,
        /// Length of the frame that was handed in.
        got: usize,
    },

    /// Frame sizes must be non-zero powers of two.
    #[error("frame size {0} is not a non-zero power of two")]
    InvalidFrameSize(usize),

    /// A sample was NaN or infinite.
    #[error("sample {index} is not finite")]
    NonFiniteSample {
        /// Position of the first offending sample.
        index: usize,
    },

    /// Sample rates must be positive.
    #[error("sample rate must be greater than zero")]
    InvalidSampleRate,

    /// Capture failed. Fatal to the capture session only.
    #[error(transparent)]
    DeviceUnavailable(#[from] CaptureError),

    /// `tick` was called without an active capture session.
    #[error("no active capture session")]
    NotListening,
}
