//! WAV header parsing, PCM extraction and hashing.

use serde::Serialize;

use crate::error::FormatError;

/// Information extracted from a WAV file header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WavInfo {
    /// Audio format code (1 = PCM).
    pub audio_format: u16,
    /// Number of channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Byte rate declared in the header.
    pub byte_rate: u32,
    /// Block alignment declared in the header.
    pub block_align: u16,
    /// Bits per sample.
    pub bits_per_sample: u16,
    /// Size of the data chunk in bytes.
    pub data_size: u32,
    /// Number of sample frames (samples per channel).
    pub num_frames: usize,
}

impl WavInfo {
    /// Returns the duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.num_frames as f64 / self.sample_rate as f64
    }
}

/// Location of the fmt and data chunks inside a buffer.
struct Chunks<'a> {
    fmt: &'a [u8],
    data: &'a [u8],
}

fn read_u16(data: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([data[at], data[at + 1]])
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

/// Walks the RIFF chunk list and returns the fmt and data payloads.
fn find_chunks(wav_data: &[u8]) -> Result<Chunks<'_>, FormatError> {
    if wav_data.len() < 12 {
        return Err(FormatError::new(format!(
            "file too short: {} bytes",
            wav_data.len()
        )));
    }
    if &wav_data[0..4] != b"RIFF" {
        return Err(FormatError::at_offset("expected 'RIFF' identifier", 0));
    }
    if &wav_data[8..12] != b"WAVE" {
        return Err(FormatError::at_offset("expected 'WAVE' format", 8));
    }

    let mut fmt: Option<&[u8]> = None;
    let mut pos = 12;
    while pos + 8 <= wav_data.len() {
        let chunk_id = &wav_data[pos..pos + 4];
        let chunk_size = read_u32(wav_data, pos + 4) as usize;
        let body_start = pos + 8;
        let body_end = body_start.saturating_add(chunk_size);

        if chunk_id == b"fmt " {
            if chunk_size < 16 || body_end > wav_data.len() {
                return Err(FormatError::at_offset("truncated fmt chunk", pos));
            }
            fmt = Some(&wav_data[body_start..body_end]);
        } else if chunk_id == b"data" {
            let Some(fmt) = fmt else {
                return Err(FormatError::at_offset(
                    "data chunk found before fmt chunk",
                    pos,
                ));
            };
            if body_end > wav_data.len() {
                return Err(FormatError::at_offset("truncated data chunk", pos));
            }
            return Ok(Chunks {
                fmt,
                data: &wav_data[body_start..body_end],
            });
        }

        // Chunks are word-aligned
        pos = body_end.saturating_add(chunk_size % 2);
    }

    match fmt {
        Some(_) => Err(FormatError::new("missing data chunk")),
        None => Err(FormatError::new("missing fmt chunk")),
    }
}

/// Parses the header of a WAV buffer.
///
/// # Arguments
/// * `wav_data` - Complete WAV file bytes
///
/// # Returns
/// Header fields and frame count, or a [`FormatError`] describing the first
/// structural problem.
pub fn read_wav_info(wav_data: &[u8]) -> Result<WavInfo, FormatError> {
    let chunks = find_chunks(wav_data)?;
    let fmt = chunks.fmt;

    let block_align = read_u16(fmt, 12);
    let num_frames = if block_align > 0 {
        chunks.data.len() / block_align as usize
    } else {
        0
    };

    Ok(WavInfo {
        audio_format: read_u16(fmt, 0),
        channels: read_u16(fmt, 2),
        sample_rate: read_u32(fmt, 4),
        byte_rate: read_u32(fmt, 8),
        block_align,
        bits_per_sample: read_u16(fmt, 14),
        data_size: chunks.data.len() as u32,
        num_frames,
    })
}

/// Extracts PCM data from a WAV file buffer.
///
/// Used for comparing WAV files by their audio content only.
///
/// # Returns
/// PCM data if found, or None if the format is invalid
pub fn extract_pcm_data(wav_data: &[u8]) -> Option<&[u8]> {
    find_chunks(wav_data).ok().map(|chunks| chunks.data)
}

/// Computes the BLAKE3 hash of a WAV file's PCM data.
///
/// # Returns
/// Hex hash of the data chunk, or None if the format is invalid
pub fn compute_pcm_hash(wav_data: &[u8]) -> Option<String> {
    extract_pcm_data(wav_data).map(|pcm| blake3::hash(pcm).to_hex().to_string())
}

/// Decodes the integer samples of a PCM WAV buffer (interleaved).
///
/// Supports 16, 24 and 32-bit signed PCM.
pub fn decode_samples(wav_data: &[u8]) -> Result<Vec<i32>, FormatError> {
    let info = read_wav_info(wav_data)?;
    if info.audio_format != 1 {
        return Err(FormatError::new(format!(
            "audio format {} is not PCM",
            info.audio_format
        )));
    }

    let pcm = extract_pcm_data(wav_data).unwrap_or_default();
    let samples = match info.bits_per_sample {
        16 => pcm
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]) as i32)
            .collect(),
        24 => pcm
            .chunks_exact(3)
            // Place the 3 bytes high, then shift back down to sign-extend
            .map(|b| i32::from_le_bytes([0, b[0], b[1], b[2]]) >> 8)
            .collect(),
        32 => pcm
            .chunks_exact(4)
            .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect(),
        other => {
            return Err(FormatError::new(format!(
                "unsupported bits per sample: {}",
                other
            )))
        }
    };

    Ok(samples)
}
