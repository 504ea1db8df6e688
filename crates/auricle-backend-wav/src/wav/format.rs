//! WAV file format parameters.

use serde::{Deserialize, Serialize};

use crate::error::{EncodingError, EncodingResult};

/// Signed integer PCM sample width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BitDepth {
    /// 16-bit signed samples.
    #[default]
    Pcm16,
    /// 24-bit signed samples, packed in three bytes.
    Pcm24,
    /// 32-bit signed samples.
    Pcm32,
}

impl BitDepth {
    /// Parses a bit count.
    pub fn from_bits(bits: u16) -> EncodingResult<Self> {
        match bits {
            16 => Ok(BitDepth::Pcm16),
            24 => Ok(BitDepth::Pcm24),
            32 => Ok(BitDepth::Pcm32),
            _ => Err(EncodingError::UnsupportedBitDepth { bits }),
        }
    }

    /// Bits per sample.
    pub fn bits(&self) -> u16 {
        match self {
            BitDepth::Pcm16 => 16,
            BitDepth::Pcm24 => 24,
            BitDepth::Pcm32 => 32,
        }
    }

    /// Bytes per sample (per channel).
    pub fn bytes(&self) -> u16 {
        self.bits() / 8
    }

    /// Largest positive sample value, `2^(N-1) - 1`.
    pub fn max_positive(&self) -> i32 {
        ((1i64 << (self.bits() - 1)) - 1) as i32
    }

    /// Most negative sample value, `-2^(N-1)`.
    pub fn min_negative(&self) -> i32 {
        (-(1i64 << (self.bits() - 1))) as i32
    }
}

impl std::fmt::Display for BitDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// How normalized floats map onto the signed integer range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Quantization {
    /// Negative values scale by `2^(N-1)`, positive by `2^(N-1) - 1`,
    /// truncated toward zero. `-1.0` reaches the most negative code.
    #[default]
    FullScale,
    /// `round(s * (2^(N-1) - 1))`. `-1.0` maps to `-(2^(N-1) - 1)`.
    Symmetric,
}

impl Quantization {
    /// Returns the name used in configuration files and CLI flags.
    pub fn as_str(&self) -> &'static str {
        match self {
            Quantization::FullScale => "full-scale",
            Quantization::Symmetric => "symmetric",
        }
    }

    /// Parses a configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "full-scale" => Some(Quantization::FullScale),
            "symmetric" => Some(Quantization::Symmetric),
            _ => None,
        }
    }
}

impl std::fmt::Display for Quantization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// WAV file format parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    /// Number of interleaved channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Sample width.
    pub bit_depth: BitDepth,
}

impl WavFormat {
    /// Creates and validates a format.
    pub fn new(channels: u16, sample_rate: u32, bit_depth: BitDepth) -> EncodingResult<Self> {
        let format = Self {
            channels,
            sample_rate,
            bit_depth,
        };
        format.validate()?;
        Ok(format)
    }

    /// Creates a 16-bit mono format.
    pub fn mono(sample_rate: u32) -> Self {
        Self {
            channels: 1,
            sample_rate,
            bit_depth: BitDepth::Pcm16,
        }
    }

    /// Creates a 16-bit stereo format.
    pub fn stereo(sample_rate: u32) -> Self {
        Self {
            channels: 2,
            sample_rate,
            bit_depth: BitDepth::Pcm16,
        }
    }

    /// Checks that every header field is representable.
    pub fn validate(&self) -> EncodingResult<()> {
        if self.sample_rate == 0 {
            return Err(EncodingError::InvalidSampleRate {
                rate: self.sample_rate,
            });
        }
        if self.channels == 0 {
            return Err(EncodingError::InvalidChannelCount {
                channels: self.channels,
            });
        }

        let block_align = self.channels as u64 * self.bytes_per_sample() as u64;
        if block_align > u16::MAX as u64 {
            return Err(EncodingError::TooLarge {
                what: "block align",
                bytes: block_align,
            });
        }

        let byte_rate = self.sample_rate as u64 * block_align;
        if byte_rate > u32::MAX as u64 {
            return Err(EncodingError::TooLarge {
                what: "byte rate",
                bytes: byte_rate,
            });
        }

        Ok(())
    }

    /// Bits per sample as written to the header.
    pub fn bits_per_sample(&self) -> u16 {
        self.bit_depth.bits()
    }

    /// Calculates bytes per sample (per channel).
    pub fn bytes_per_sample(&self) -> u16 {
        self.bit_depth.bytes()
    }

    /// Calculates block align (bytes per sample frame).
    pub fn block_align(&self) -> u16 {
        self.channels.saturating_mul(self.bytes_per_sample())
    }

    /// Calculates byte rate (bytes per second).
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate.saturating_mul(self.block_align() as u32)
    }
}
