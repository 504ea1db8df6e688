//! WAV file generation result type.

use crate::error::EncodingResult;

use super::builder::WavWriter;
use super::format::WavFormat;
use super::reader::compute_pcm_hash;

/// Result of WAV file generation.
#[derive(Debug, Clone)]
pub struct WavResult {
    /// Complete WAV file bytes.
    pub wav_data: Vec<u8>,
    /// BLAKE3 hash of PCM data only.
    pub pcm_hash: String,
    /// Format written to the header.
    pub format: WavFormat,
    /// Number of sample frames.
    pub num_frames: usize,
}

impl WavResult {
    /// Encodes interleaved samples with the given writer.
    pub fn from_samples(writer: &WavWriter, samples: &[f64]) -> EncodingResult<Self> {
        let wav_data = writer.write(samples)?;
        let pcm_hash = compute_pcm_hash(&wav_data).unwrap_or_default();
        let format = *writer.format();

        Ok(Self {
            num_frames: samples.len() / format.channels as usize,
            wav_data,
            pcm_hash,
            format,
        })
    }

    /// Returns the duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.num_frames as f64 / self.format.sample_rate as f64
    }

    /// Returns the total file size in bytes.
    pub fn len(&self) -> usize {
        self.wav_data.len()
    }

    /// Returns true if the file carries no samples.
    pub fn is_empty(&self) -> bool {
        self.num_frames == 0
    }
}
