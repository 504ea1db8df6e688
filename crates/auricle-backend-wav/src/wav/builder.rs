//! WAV file writer builder pattern.

use crate::error::{EncodingError, EncodingResult};

use super::format::{BitDepth, Quantization, WavFormat};
use super::writer::{samples_to_pcm, write_wav_to_vec};

/// WAV file writer builder.
#[derive(Debug, Clone, Copy)]
pub struct WavWriter {
    format: WavFormat,
    quantization: Quantization,
}

impl WavWriter {
    /// Creates a new 16-bit mono writer with full-scale quantization.
    pub fn mono(sample_rate: u32) -> Self {
        Self {
            format: WavFormat::mono(sample_rate),
            quantization: Quantization::default(),
        }
    }

    /// Sets the number of interleaved channels.
    pub fn with_channels(mut self, channels: u16) -> Self {
        self.format.channels = channels;
        self
    }

    /// Sets the sample width.
    pub fn with_bit_depth(mut self, bit_depth: BitDepth) -> Self {
        self.format.bit_depth = bit_depth;
        self
    }

    /// Sets the float-to-integer mapping.
    pub fn with_quantization(mut self, quantization: Quantization) -> Self {
        self.quantization = quantization;
        self
    }

    /// Returns the configured format.
    pub fn format(&self) -> &WavFormat {
        &self.format
    }

    /// Returns the configured quantization.
    pub fn quantization(&self) -> Quantization {
        self.quantization
    }

    /// Converts samples to PCM after checking the format and frame alignment.
    fn pcm(&self, samples: &[f64]) -> EncodingResult<Vec<u8>> {
        self.format.validate()?;
        if samples.len() % self.format.channels as usize != 0 {
            return Err(EncodingError::MisalignedFrames {
                samples: samples.len(),
                channels: self.format.channels,
            });
        }
        Ok(samples_to_pcm(
            samples,
            self.format.bit_depth,
            self.quantization,
        ))
    }

    /// Writes interleaved samples to a byte vector.
    pub fn write(&self, samples: &[f64]) -> EncodingResult<Vec<u8>> {
        let pcm = self.pcm(samples)?;
        write_wav_to_vec(&self.format, &pcm)
    }

    /// Returns the BLAKE3 hash of the PCM data (not the full WAV file).
    ///
    /// # Arguments
    /// * `samples` - Interleaved audio samples
    pub fn pcm_hash(&self, samples: &[f64]) -> EncodingResult<String> {
        let pcm = self.pcm(samples)?;
        Ok(blake3::hash(&pcm).to_hex().to_string())
    }
}
