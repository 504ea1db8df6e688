//! Entry points for encoding impulse responses.

use auricle_spec::HrirData;
use tracing::debug;

use crate::error::EncodingResult;
use crate::wav::{BitDepth, Quantization, WavResult, WavWriter};

/// Encoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Sample width.
    pub bit_depth: BitDepth,
    /// Number of interleaved channels.
    pub channels: u16,
    /// Float-to-integer mapping.
    pub quantization: Quantization,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            bit_depth: BitDepth::Pcm16,
            channels: 1,
            quantization: Quantization::FullScale,
        }
    }
}

impl EncodeOptions {
    fn writer(&self, sample_rate: u32) -> WavWriter {
        WavWriter::mono(sample_rate)
            .with_channels(self.channels)
            .with_bit_depth(self.bit_depth)
            .with_quantization(self.quantization)
    }
}

/// Encodes interleaved samples into a WAV file.
///
/// Out-of-range samples are clamped and non-finite samples are written as
/// silence. Errors are reserved for formats the container cannot hold.
///
/// # Example
/// ```
/// use auricle_backend_wav::{encode_samples, EncodeOptions};
///
/// let result = encode_samples(&[0.0, 0.5, -0.5, 1.0, -1.0], 44100, &EncodeOptions::default())
///     .unwrap();
/// assert_eq!(result.wav_data.len(), 44 + 10);
/// assert_eq!(result.num_frames, 5);
/// ```
pub fn encode_samples(
    samples: &[f64],
    sample_rate: u32,
    options: &EncodeOptions,
) -> EncodingResult<WavResult> {
    debug!(
        samples = samples.len(),
        sample_rate,
        channels = options.channels,
        bit_depth = options.bit_depth.bits(),
        quantization = %options.quantization,
        "encoding PCM"
    );
    WavResult::from_samples(&options.writer(sample_rate), samples)
}

/// Encodes a validated impulse response.
///
/// With more than one channel, every sample is written to each channel of
/// its frame.
pub fn encode_hrir(data: &HrirData, options: &EncodeOptions) -> EncodingResult<WavResult> {
    if options.channels <= 1 {
        return encode_samples(&data.impulse_response, data.sample_rate, options);
    }

    let channels = options.channels as usize;
    let interleaved: Vec<f64> = data
        .impulse_response
        .iter()
        .flat_map(|&sample| std::iter::repeat(sample).take(channels))
        .collect();
    encode_samples(&interleaved, data.sample_rate, options)
}
