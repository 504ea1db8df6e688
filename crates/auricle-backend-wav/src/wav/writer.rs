//! Core WAV writing and PCM conversion functions.

use std::io::Write;

use super::format::{BitDepth, Quantization, WavFormat};
use crate::error::{EncodingError, EncodingResult};

/// Size of the canonical RIFF + fmt + data headers.
pub const HEADER_SIZE: usize = 44;

/// RIFF size field covers everything after the first 8 bytes.
const RIFF_OVERHEAD: u64 = (HEADER_SIZE - 8) as u64;

/// Writes a complete WAV file to a writer.
///
/// # Arguments
/// * `writer` - Output writer
/// * `format` - WAV format parameters
/// * `pcm_data` - Raw little-endian PCM samples as bytes
///
/// # Returns
/// `Ok(())`, or an error if the format is invalid, the data does not fit the
/// 32-bit size fields, or the writer fails.
pub fn write_wav<W: Write>(
    writer: &mut W,
    format: &WavFormat,
    pcm_data: &[u8],
) -> EncodingResult<()> {
    format.validate()?;

    let data_size = pcm_data.len() as u64;
    if data_size + RIFF_OVERHEAD > u32::MAX as u64 {
        return Err(EncodingError::TooLarge {
            what: "data chunk",
            bytes: data_size,
        });
    }
    let data_size = data_size as u32;
    let riff_size = data_size + RIFF_OVERHEAD as u32;

    // RIFF header
    writer.write_all(b"RIFF")?;
    writer.write_all(&riff_size.to_le_bytes())?;
    writer.write_all(b"WAVE")?;

    // fmt chunk
    writer.write_all(b"fmt ")?;
    writer.write_all(&16u32.to_le_bytes())?; // Chunk size (16 for PCM)
    writer.write_all(&1u16.to_le_bytes())?; // Audio format (1 = PCM)
    writer.write_all(&format.channels.to_le_bytes())?;
    writer.write_all(&format.sample_rate.to_le_bytes())?;
    writer.write_all(&format.byte_rate().to_le_bytes())?;
    writer.write_all(&format.block_align().to_le_bytes())?;
    writer.write_all(&format.bits_per_sample().to_le_bytes())?;

    // data chunk
    writer.write_all(b"data")?;
    writer.write_all(&data_size.to_le_bytes())?;
    writer.write_all(pcm_data)?;

    Ok(())
}

/// Writes a WAV file to a byte vector.
///
/// # Arguments
/// * `format` - WAV format parameters
/// * `pcm_data` - Raw PCM samples as bytes
///
/// # Returns
/// Complete WAV file as bytes
pub fn write_wav_to_vec(format: &WavFormat, pcm_data: &[u8]) -> EncodingResult<Vec<u8>> {
    let mut buffer = Vec::with_capacity(HEADER_SIZE + pcm_data.len());
    write_wav(&mut buffer, format, pcm_data)?;
    Ok(buffer)
}

/// Replaces non-finite samples with silence and clamps the rest to [-1, 1].
pub fn clamp_sample(sample: f64) -> f64 {
    if sample.is_finite() {
        sample.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Converts one normalized sample to a signed integer code.
///
/// # Arguments
/// * `sample` - Normalized sample; clamped, and zeroed if not finite
/// * `bit_depth` - Target sample width
/// * `quantization` - Mapping onto the integer range
///
/// # Example
/// ```
/// use auricle_backend_wav::wav::{quantize_sample, BitDepth, Quantization};
///
/// assert_eq!(quantize_sample(1.0, BitDepth::Pcm16, Quantization::FullScale), 32767);
/// assert_eq!(quantize_sample(-1.0, BitDepth::Pcm16, Quantization::FullScale), -32768);
/// assert_eq!(quantize_sample(f64::NAN, BitDepth::Pcm16, Quantization::FullScale), 0);
/// ```
pub fn quantize_sample(sample: f64, bit_depth: BitDepth, quantization: Quantization) -> i32 {
    let clamped = clamp_sample(sample);
    let max_positive = bit_depth.max_positive() as f64;

    match quantization {
        Quantization::FullScale => {
            let scale = if clamped < 0.0 {
                -(bit_depth.min_negative() as f64)
            } else {
                max_positive
            };
            (clamped * scale).trunc() as i32
        }
        Quantization::Symmetric => (clamped * max_positive).round() as i32,
    }
}

/// Converts normalized f64 samples to little-endian PCM bytes.
///
/// # Arguments
/// * `samples` - Audio samples (interleaved if multi-channel)
/// * `bit_depth` - Target sample width
/// * `quantization` - Mapping onto the integer range
///
/// # Returns
/// PCM data, `samples.len() * bit_depth.bytes()` bytes long
pub fn samples_to_pcm(samples: &[f64], bit_depth: BitDepth, quantization: Quantization) -> Vec<u8> {
    let mut pcm = Vec::with_capacity(samples.len() * bit_depth.bytes() as usize);

    for &sample in samples {
        let code = quantize_sample(sample, bit_depth, quantization);
        match bit_depth {
            BitDepth::Pcm16 => pcm.extend_from_slice(&(code as i16).to_le_bytes()),
            BitDepth::Pcm24 => pcm.extend_from_slice(&code.to_le_bytes()[..3]),
            BitDepth::Pcm32 => pcm.extend_from_slice(&code.to_le_bytes()),
        }
    }

    pcm
}

/// Converts f64 samples to 16-bit full-scale PCM bytes.
pub fn samples_to_pcm16(samples: &[f64]) -> Vec<u8> {
    samples_to_pcm(samples, BitDepth::Pcm16, Quantization::FullScale)
}
