//! Error types for payload validation and processing.

use thiserror::Error;

/// Error codes for payload validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// S001: Payload is not a JSON object
    NotAnObject,
    /// S002: Required field is missing
    MissingField,
    /// S003: Field has the wrong JSON type
    WrongType,
    /// S004: Impulse response entry is not a finite number
    NonFiniteSample,
    /// S005: Sample rate is not a positive integer
    InvalidSampleRate,
    /// S006: Channel tag is not one of left, right, mono
    UnknownChannel,
    /// S007: Measurement entry is malformed
    InvalidMeasurement,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "S001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::NotAnObject => "S001",
            ErrorCode::MissingField => "S002",
            ErrorCode::WrongType => "S003",
            ErrorCode::NonFiniteSample => "S004",
            ErrorCode::InvalidSampleRate => "S005",
            ErrorCode::UnknownChannel => "S006",
            ErrorCode::InvalidMeasurement => "S007",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Warning codes for payload validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningCode {
    /// W001: Impulse response length differs from the expected length
    UnexpectedLength,
    /// W002: Samples outside [-1, 1] will be clamped
    SamplesOutOfRange,
    /// W003: Sample rate is not a commonly used rate
    UncommonSampleRate,
    /// W004: Channel omitted and defaulted
    ChannelDefaulted,
    /// W005: Impulse response has no samples
    EmptyImpulseResponse,
}

impl WarningCode {
    /// Returns the warning code string (e.g., "W001").
    pub fn code(&self) -> &'static str {
        match self {
            WarningCode::UnexpectedLength => "W001",
            WarningCode::SamplesOutOfRange => "W002",
            WarningCode::UncommonSampleRate => "W003",
            WarningCode::ChannelDefaulted => "W004",
            WarningCode::EmptyImpulseResponse => "W005",
        }
    }
}

impl std::fmt::Display for WarningCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A validation error with code, message, and optional JSON path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// JSON path to the problematic field (e.g., "impulseResponse\[3\]").
    pub path: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    /// Creates a new validation error with a JSON path.
    pub fn with_path(code: ErrorCode, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref path) = self.path {
            write!(f, "{}: {} (at {})", self.code, self.message, path)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

/// A validation warning with code, message, and optional JSON path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The warning code.
    pub code: WarningCode,
    /// Human-readable warning message.
    pub message: String,
    /// JSON path to the field the warning refers to.
    pub path: Option<String>,
}

impl ValidationWarning {
    /// Creates a new validation warning.
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    /// Creates a new validation warning with a JSON path.
    pub fn with_path(
        code: WarningCode,
        message: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref path) = self.path {
            write!(f, "{}: {} (at {})", self.code, self.message, path)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

/// A payload that failed the HRIR data contract.
///
/// Carries every violation found, not just the first one, so a caller can
/// render a complete message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    /// All validation errors, in discovery order. Never empty.
    pub errors: Vec<ValidationError>,
}

impl SchemaError {
    /// Creates a schema error from a list of validation errors.
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    /// Returns true if any error carries the given code.
    pub fn has_code(&self, code: ErrorCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.errors.as_slice() {
            [] => write!(f, "payload failed schema validation"),
            [only] => write!(f, "payload failed schema validation: {}", only),
            [first, rest @ ..] => write!(
                f,
                "payload failed schema validation: {} (and {} more)",
                first,
                rest.len()
            ),
        }
    }
}

impl std::error::Error for SchemaError {}

impl BackendError for SchemaError {
    fn code(&self) -> &'static str {
        self.errors
            .first()
            .map(|e| e.code.code())
            .unwrap_or("S000")
    }

    fn category(&self) -> &'static str {
        "schema"
    }
}

/// Top-level error type for payload operations.
#[derive(Debug, Error)]
pub enum SpecError {
    /// Payload violated the HRIR data contract.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Common trait for backend errors.
///
/// Gives every crate's error type a stable code and category so the CLI can
/// report failures uniformly.
pub trait BackendError: std::error::Error {
    /// Get the error code for reporting, e.g. "WAV_001".
    fn code(&self) -> &'static str;

    /// Get a human-readable message describing the error.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Get the error category, e.g. "wav" or "schema".
    fn category(&self) -> &'static str;
}
