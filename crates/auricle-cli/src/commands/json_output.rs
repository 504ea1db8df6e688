//! JSON output types for machine-readable CLI output.
//!
//! These types back the `--json` flag on every command. Field names are
//! snake_case and error codes are stable.

use auricle_backend_wav::{WavInfo, WavResult};
use auricle_spec::{
    BackendError, HrirData, HrirMeasurement, ImpulseSummary, ValidationError, ValidationWarning,
};
use serde::{Deserialize, Serialize};

/// Error codes for CLI operations.
///
/// Format: CLI_XXX for CLI-level errors; validation and backend errors pass
/// their own codes through.
pub mod error_codes {
    /// File could not be read
    pub const FILE_READ: &str = "CLI_001";
    /// JSON parse error
    pub const JSON_PARSE: &str = "CLI_002";
    /// Invalid configuration or flag value
    pub const INVALID_CONFIG: &str = "CLI_003";
    /// Output file could not be written
    pub const FILE_WRITE: &str = "CLI_004";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g., "CLI_001", "S002", "WAV_001")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// JSON path to the problematic field (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Source file path (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl JsonError {
    /// Creates a new error with code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            path: None,
            file: None,
        }
    }

    /// Sets the JSON path for this error.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the file path for this error.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Wraps any backend error, keeping its stable code.
    pub fn from_backend(error: &dyn BackendError) -> Self {
        Self::new(error.code(), error.message())
    }
}

/// A structured warning in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonWarning {
    /// Stable warning code (e.g., "W001")
    pub code: String,
    /// Human-readable warning message
    pub message: String,
    /// JSON path to the field the warning refers to (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Converts a validation error to its JSON form.
pub fn validation_error_to_json(error: &ValidationError) -> JsonError {
    JsonError {
        code: error.code.code().to_string(),
        message: error.message.clone(),
        path: error.path.clone(),
        file: None,
    }
}

/// Converts a validation warning to its JSON form.
pub fn validation_warning_to_json(warning: &ValidationWarning) -> JsonWarning {
    JsonWarning {
        code: warning.code.code().to_string(),
        message: warning.message.clone(),
        path: warning.path.clone(),
    }
}

/// Converts validation warnings to their JSON form.
pub fn warnings_to_json(warnings: &[ValidationWarning]) -> Vec<JsonWarning> {
    warnings.iter().map(validation_warning_to_json).collect()
}

/// Description of a validated payload.
#[derive(Debug, Clone, Serialize)]
pub struct PayloadInfo {
    /// Ear the response belongs to
    pub channel: String,
    /// BLAKE3 hash of the normalized payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    /// Biometric observations, in order
    pub measurements: Vec<HrirMeasurement>,
    /// Impulse response statistics
    pub summary: ImpulseSummary,
}

impl PayloadInfo {
    pub fn from_data(data: &HrirData) -> Self {
        Self {
            channel: data.channel.as_str().to_string(),
            content_hash: data.content_hash().ok(),
            measurements: data.measurements.clone(),
            summary: ImpulseSummary::from_data(data),
        }
    }
}

/// Description of a written WAV file.
#[derive(Debug, Clone, Serialize)]
pub struct WavOutputInfo {
    /// Path the file was written to
    pub path: String,
    /// BLAKE3 hash of the PCM data chunk
    pub pcm_hash: String,
    /// Total file size in bytes
    pub bytes: usize,
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    /// "full-scale" or "symmetric"
    pub quantization: String,
    pub num_frames: usize,
}

impl WavOutputInfo {
    pub fn new(path: impl Into<String>, wav: &WavResult, quantization: &str) -> Self {
        Self {
            path: path.into(),
            pcm_hash: wav.pcm_hash.clone(),
            bytes: wav.wav_data.len(),
            channels: wav.format.channels,
            sample_rate: wav.format.sample_rate,
            bits_per_sample: wav.format.bits_per_sample(),
            quantization: quantization.to_string(),
            num_frames: wav.num_frames,
        }
    }
}

/// JSON output for the `validate` command.
#[derive(Debug, Clone, Serialize)]
pub struct ValidateOutput {
    /// Whether the payload is valid
    pub success: bool,
    pub errors: Vec<JsonError>,
    pub warnings: Vec<JsonWarning>,
    /// Payload description (on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<PayloadInfo>,
}

/// JSON output for the `encode` and `analyze` commands.
#[derive(Debug, Clone, Serialize)]
pub struct EncodeOutput {
    /// Whether a file was written
    pub success: bool,
    pub errors: Vec<JsonError>,
    pub warnings: Vec<JsonWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<PayloadInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<WavOutputInfo>,
}

/// JSON output for the `inspect` command.
#[derive(Debug, Clone, Serialize)]
pub struct InspectOutput {
    pub success: bool,
    pub errors: Vec<JsonError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<WavInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pcm_hash: Option<String>,
}

/// Failure output shared by every command.
#[derive(Debug, Clone, Serialize)]
pub struct FailureOutput {
    pub success: bool,
    pub errors: Vec<JsonError>,
    pub warnings: Vec<JsonWarning>,
}

impl FailureOutput {
    pub fn new(errors: Vec<JsonError>, warnings: Vec<JsonWarning>) -> Self {
        Self {
            success: false,
            errors,
            warnings,
        }
    }
}

/// Prints a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}
