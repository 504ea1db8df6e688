//! Error types for the WAV backend.

use auricle_spec::BackendError;
use thiserror::Error;

/// Result type for encoding operations.
pub type EncodingResult<T> = Result<T, EncodingError>;

/// Errors that can occur while encoding a WAV file.
///
/// Out-of-range and non-finite samples are not errors; they are clamped or
/// zeroed. These variants cover input the container cannot represent.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// Sample rate of zero.
    #[error("invalid sample rate: {rate}")]
    InvalidSampleRate {
        /// The invalid sample rate.
        rate: u32,
    },

    /// Bit depth other than 16, 24 or 32.
    #[error("unsupported bit depth: {bits} (expected 16, 24 or 32)")]
    UnsupportedBitDepth {
        /// The requested bit depth.
        bits: u16,
    },

    /// Channel count of zero.
    #[error("invalid channel count: {channels}")]
    InvalidChannelCount {
        /// The requested channel count.
        channels: u16,
    },

    /// Interleaved sample count is not a whole number of frames.
    #[error("{samples} samples do not divide into frames of {channels} channels")]
    MisalignedFrames {
        /// Number of samples supplied.
        samples: usize,
        /// Channel count of the format.
        channels: u16,
    },

    /// Byte rate or data chunk exceeds the 32-bit RIFF size fields.
    #[error("{what} of {bytes} bytes exceeds the RIFF 32-bit limit")]
    TooLarge {
        /// Which header field overflowed.
        what: &'static str,
        /// The value that did not fit.
        bytes: u64,
    },

    /// I/O error from the destination writer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BackendError for EncodingError {
    fn code(&self) -> &'static str {
        match self {
            EncodingError::InvalidSampleRate { .. } => "WAV_001",
            EncodingError::UnsupportedBitDepth { .. } => "WAV_002",
            EncodingError::InvalidChannelCount { .. } => "WAV_003",
            EncodingError::MisalignedFrames { .. } => "WAV_004",
            EncodingError::TooLarge { .. } => "WAV_005",
            EncodingError::Io(_) => "WAV_006",
        }
    }

    fn category(&self) -> &'static str {
        "wav"
    }
}

/// A buffer that is not a readable PCM WAV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
    /// What was wrong.
    pub message: String,
    /// Byte offset of the problem, if known.
    pub offset: Option<usize>,
}

impl FormatError {
    /// Creates a format error without an offset.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            offset: None,
        }
    }

    /// Creates a format error at a byte offset.
    pub fn at_offset(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset: Some(offset),
        }
    }
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "invalid WAV at byte {}: {}", offset, self.message),
            None => write!(f, "invalid WAV: {}", self.message),
        }
    }
}

impl std::error::Error for FormatError {}

impl BackendError for FormatError {
    fn code(&self) -> &'static str {
        "WAV_100"
    }

    fn category(&self) -> &'static str {
        "wav"
    }
}
