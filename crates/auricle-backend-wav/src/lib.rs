//! Auricle WAV Backend
//!
//! Deterministic encoding of head-related impulse responses into
//! uncompressed PCM WAV files, plus a small reader used to inspect them.
//!
//! # Determinism
//!
//! Output depends only on the samples and the encoder options. The header is
//! the canonical 44-byte RIFF layout with no optional chunks, so repeated
//! runs produce byte-identical files. The BLAKE3 hash of the data chunk
//! identifies the audio content independently of the header.
//!
//! # Example
//!
//! ```
//! use auricle_backend_wav::{encode_hrir, EncodeOptions};
//! use auricle_spec::HrirData;
//!
//! let json = r#"{"measurements": [], "impulseResponse": [0.0, 1.0], "sampleRate": 44100}"#;
//! let validated = HrirData::from_json(json).unwrap();
//! let result = encode_hrir(&validated.data, &EncodeOptions::default()).unwrap();
//! assert_eq!(&result.wav_data[0..4], b"RIFF");
//! ```
//!
//! # Crate Structure
//!
//! - [`encode_samples()`] / [`encode_hrir()`] - Main entry points
//! - [`wav`] - WAV writer, reader and format types
//! - [`error`] - Encoding and format errors

pub mod encode;
pub mod error;
pub mod wav;

pub use encode::{encode_hrir, encode_samples, EncodeOptions};
pub use error::{EncodingError, EncodingResult, FormatError};
pub use wav::{BitDepth, Quantization, WavFormat, WavInfo, WavResult, WavWriter};
