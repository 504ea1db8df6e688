//! Auricle HRIR Payload Library
//!
//! This crate defines the data contract for head-related impulse responses
//! produced by an external ear-analysis model, and validates untrusted
//! payloads against it.
//!
//! # Overview
//!
//! The analysis model returns JSON shaped like:
//!
//! - **measurements**: free-form biometric observations for display
//! - **impulseResponse**: time-domain samples, nominally in [-1, 1]
//! - **sampleRate**: positive integer, usually 44100 or 48000
//! - **channel**: `left`, `right` or `mono` (defaults to `right`)
//!
//! # Example
//!
//! ```
//! use auricle_spec::validation::validate_payload;
//! use auricle_spec::naming::suggested_wav_name;
//! use auricle_spec::Channel;
//!
//! let payload = serde_json::json!({
//!     "measurements": [
//!         {"feature": "Helix", "value": "Large", "impact": "Lowers the pinna notch"}
//!     ],
//!     "impulseResponse": [0.0, 0.9, -0.3, 0.05],
//!     "sampleRate": 44100
//! });
//!
//! let validated = validate_payload(&payload).unwrap();
//! assert_eq!(validated.data.channel, Channel::Right);
//!
//! let name = suggested_wav_name(validated.data.channel, 1_700_000_000_000);
//! assert_eq!(name, "custom_hrir_right_1700000000000.wav");
//! ```
//!
//! # Modules
//!
//! - [`error`]: Error and warning types for validation
//! - [`hrir`]: Payload types
//! - [`naming`]: Suggested download file names
//! - [`summary`]: Display data derived from an impulse response
//! - [`validation`]: Payload validation

pub mod error;
pub mod hrir;
pub mod naming;
pub mod summary;
pub mod validation;

// Re-export commonly used types at the crate root
pub use error::{
    BackendError, ErrorCode, SchemaError, SpecError, ValidationError, ValidationWarning,
    WarningCode,
};
pub use hrir::{Channel, HrirData, HrirMeasurement, COMMON_SAMPLE_RATES, EXPECTED_IR_LENGTH};
pub use naming::{suggested_file_name, suggested_wav_name};
pub use summary::{chart_points, ChartPoint, ImpulseSummary};
pub use validation::{validate_payload, ValidatedPayload, ValidationResult};
