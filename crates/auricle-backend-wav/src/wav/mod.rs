//! Deterministic WAV file writer and reader.
//!
//! Output is a canonical 44-byte RIFF header followed by little-endian
//! signed PCM. There are no timestamps or optional chunks, so identical
//! input always produces identical bytes.

mod builder;
mod format;
mod reader;
mod result;
mod writer;


pub use builder::WavWriter;
pub use format::{BitDepth, Quantization, WavFormat};
pub use reader::{compute_pcm_hash, decode_samples, extract_pcm_data, read_wav_info, WavInfo};
pub use result::WavResult;
pub use writer::{
    clamp_sample, quantize_sample, samples_to_pcm, samples_to_pcm16, write_wav, write_wav_to_vec,
    HEADER_SIZE,
};
