//! Payload validation logic.
//!
//! The analysis model returns arbitrary JSON. Everything in this module
//! treats that JSON as untrusted and either produces an [`HrirData`] or a
//! [`SchemaError`] listing every violation.

#[cfg(test)]
mod tests;

use serde_json::{Map, Value};

use crate::error::{
    ErrorCode, SchemaError, ValidationError, ValidationWarning, WarningCode,
};
use crate::hrir::{Channel, HrirData, HrirMeasurement, COMMON_SAMPLE_RATES, EXPECTED_IR_LENGTH};

/// Wire name of the measurements field.
pub const FIELD_MEASUREMENTS: &str = "measurements";
/// Wire name of the impulse response field.
pub const FIELD_IMPULSE_RESPONSE: &str = "impulseResponse";
/// Wire name of the sample rate field.
pub const FIELD_SAMPLE_RATE: &str = "sampleRate";
/// Wire name of the channel field.
pub const FIELD_CHANNEL: &str = "channel";

/// Accumulated errors and warnings for one payload.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether validation passed (no errors).
    pub ok: bool,
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of validation warnings.
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// Creates a successful validation result.
    pub fn success() -> Self {
        Self {
            ok: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Adds an error to the result.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
        self.ok = false;
    }

    /// Adds a warning to the result.
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.ok
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::success()
    }
}

/// A payload that satisfied the data contract.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPayload {
    /// The normalized HRIR result.
    pub data: HrirData,
    /// Non-fatal observations about the payload.
    pub warnings: Vec<ValidationWarning>,
}

/// Validates an untrusted JSON payload against the HRIR data contract.
///
/// # Arguments
/// * `value` - Raw JSON returned by the analysis model
///
/// # Returns
/// * `Ok(ValidatedPayload)` with the normalized data and any warnings.
/// * `Err(SchemaError)` listing every violation found.
///
/// # Example
/// ```
/// use auricle_spec::validation::validate_payload;
/// use auricle_spec::Channel;
///
/// let payload = serde_json::json!({
///     "measurements": [],
///     "impulseResponse": [0.0, 0.5, -0.25],
///     "sampleRate": 48000
/// });
///
/// let validated = validate_payload(&payload).unwrap();
/// assert_eq!(validated.data.channel, Channel::Right);
/// assert_eq!(validated.data.sample_count(), 3);
/// ```
pub fn validate_payload(value: &Value) -> Result<ValidatedPayload, SchemaError> {
    let Some(obj) = value.as_object() else {
        return Err(SchemaError::new(vec![ValidationError::new(
            ErrorCode::NotAnObject,
            format!("payload must be a JSON object, got {}", json_type_name(value)),
        )]));
    };

    let mut result = ValidationResult::default();

    let measurements = validate_measurements(obj, &mut result);
    let impulse_response = validate_impulse_response(obj, &mut result);
    let sample_rate = validate_sample_rate(obj, &mut result);
    let channel = validate_channel(obj, &mut result);

    let (Some(measurements), Some(impulse_response), Some(sample_rate), Some(channel), true) = (
        measurements,
        impulse_response,
        sample_rate,
        channel,
        result.is_ok(),
    ) else {
        tracing::debug!(errors = result.errors.len(), "payload rejected");
        return Err(SchemaError::new(result.errors));
    };

    check_warnings(&impulse_response, sample_rate, &mut result);

    tracing::debug!(
        samples = impulse_response.len(),
        sample_rate,
        channel = channel.as_str(),
        warnings = result.warnings.len(),
        "payload accepted"
    );

    Ok(ValidatedPayload {
        data: HrirData::new(measurements, impulse_response, sample_rate, channel),
        warnings: result.warnings,
    })
}

/// Returns the field if it is present and not `null`.
fn required<'a>(
    obj: &'a Map<String, Value>,
    field: &str,
    result: &mut ValidationResult,
) -> Option<&'a Value> {
    match obj.get(field) {
        None | Some(Value::Null) => {
            result.add_error(ValidationError::with_path(
                ErrorCode::MissingField,
                format!("required field '{}' is missing", field),
                field,
            ));
            None
        }
        Some(value) => Some(value),
    }
}

/// Validates the measurements array. Text is passed through verbatim.
fn validate_measurements(
    obj: &Map<String, Value>,
    result: &mut ValidationResult,
) -> Option<Vec<HrirMeasurement>> {
    let value = required(obj, FIELD_MEASUREMENTS, result)?;
    let Some(items) = value.as_array() else {
        result.add_error(ValidationError::with_path(
            ErrorCode::WrongType,
            format!("expected an array, got {}", json_type_name(value)),
            FIELD_MEASUREMENTS,
        ));
        return None;
    };

    let mut measurements = Vec::with_capacity(items.len());
    let mut valid = true;
    for (i, item) in items.iter().enumerate() {
        match parse_measurement(item, i, result) {
            Some(m) => measurements.push(m),
            None => valid = false,
        }
    }

    valid.then_some(measurements)
}

fn parse_measurement(
    item: &Value,
    index: usize,
    result: &mut ValidationResult,
) -> Option<HrirMeasurement> {
    let path = format!("{}[{}]", FIELD_MEASUREMENTS, index);
    let Some(entry) = item.as_object() else {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidMeasurement,
            format!("expected an object, got {}", json_type_name(item)),
            path,
        ));
        return None;
    };

    let mut text_field = |name: &str| -> Option<String> {
        match entry.get(name) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                result.add_error(ValidationError::with_path(
                    ErrorCode::InvalidMeasurement,
                    format!("'{}' must be a string, got {}", name, json_type_name(other)),
                    format!("{}.{}", path, name),
                ));
                None
            }
            None => {
                result.add_error(ValidationError::with_path(
                    ErrorCode::InvalidMeasurement,
                    format!("'{}' is missing", name),
                    format!("{}.{}", path, name),
                ));
                None
            }
        }
    };

    let feature = text_field("feature");
    let value = text_field("value");
    let impact = text_field("impact");

    Some(HrirMeasurement {
        feature: feature?,
        value: value?,
        impact: impact?,
    })
}

/// Validates that the impulse response is an array of finite numbers.
fn validate_impulse_response(
    obj: &Map<String, Value>,
    result: &mut ValidationResult,
) -> Option<Vec<f64>> {
    let value = required(obj, FIELD_IMPULSE_RESPONSE, result)?;
    let Some(items) = value.as_array() else {
        result.add_error(ValidationError::with_path(
            ErrorCode::WrongType,
            format!("expected an array of numbers, got {}", json_type_name(value)),
            FIELD_IMPULSE_RESPONSE,
        ));
        return None;
    };

    let mut samples = Vec::with_capacity(items.len());
    let mut valid = true;
    for (i, item) in items.iter().enumerate() {
        match item.as_f64() {
            Some(sample) if sample.is_finite() => samples.push(sample),
            _ => {
                valid = false;
                result.add_error(ValidationError::with_path(
                    ErrorCode::NonFiniteSample,
                    format!("expected a finite number, got {}", json_type_name(item)),
                    format!("{}[{}]", FIELD_IMPULSE_RESPONSE, i),
                ));
            }
        }
    }

    valid.then_some(samples)
}

/// Validates that the sample rate is a positive integer that fits in a u32.
///
/// Integral floats (`44100.0`) are accepted.
fn validate_sample_rate(obj: &Map<String, Value>, result: &mut ValidationResult) -> Option<u32> {
    let value = required(obj, FIELD_SAMPLE_RATE, result)?;
    let Value::Number(n) = value else {
        result.add_error(ValidationError::with_path(
            ErrorCode::WrongType,
            format!("expected a positive integer, got {}", json_type_name(value)),
            FIELD_SAMPLE_RATE,
        ));
        return None;
    };

    let rate = match (n.as_u64(), n.as_f64()) {
        (Some(u), _) => u32::try_from(u).ok().filter(|&r| r > 0),
        (None, Some(f)) if f.fract() == 0.0 && f > 0.0 && f <= u32::MAX as f64 => Some(f as u32),
        _ => None,
    };

    if rate.is_none() {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidSampleRate,
            format!("sampleRate must be a positive integer, got {}", n),
            FIELD_SAMPLE_RATE,
        ));
    }
    rate
}

/// Validates the optional channel tag, defaulting to [`Channel::Right`].
fn validate_channel(obj: &Map<String, Value>, result: &mut ValidationResult) -> Option<Channel> {
    match obj.get(FIELD_CHANNEL) {
        None | Some(Value::Null) => {
            result.add_warning(ValidationWarning::with_path(
                WarningCode::ChannelDefaulted,
                format!("channel not specified, assuming '{}'", Channel::default()),
                FIELD_CHANNEL,
            ));
            Some(Channel::default())
        }
        Some(Value::String(tag)) => {
            let channel = Channel::from_tag(tag);
            if channel.is_none() {
                result.add_error(ValidationError::with_path(
                    ErrorCode::UnknownChannel,
                    format!("channel must be one of left, right, mono, got '{}'", tag),
                    FIELD_CHANNEL,
                ));
            }
            channel
        }
        Some(other) => {
            result.add_error(ValidationError::with_path(
                ErrorCode::WrongType,
                format!("expected a string, got {}", json_type_name(other)),
                FIELD_CHANNEL,
            ));
            None
        }
    }
}

/// Adds warnings for payloads that are valid but unusual.
fn check_warnings(samples: &[f64], sample_rate: u32, result: &mut ValidationResult) {
    if samples.is_empty() {
        result.add_warning(ValidationWarning::with_path(
            WarningCode::EmptyImpulseResponse,
            "impulse response has no samples; the WAV file will be silent",
            FIELD_IMPULSE_RESPONSE,
        ));
    } else if samples.len() != EXPECTED_IR_LENGTH {
        result.add_warning(ValidationWarning::with_path(
            WarningCode::UnexpectedLength,
            format!(
                "impulse response has {} samples, expected {}",
                samples.len(),
                EXPECTED_IR_LENGTH
            ),
            FIELD_IMPULSE_RESPONSE,
        ));
    }

    let out_of_range = samples.iter().filter(|s| s.abs() > 1.0).count();
    if out_of_range > 0 {
        result.add_warning(ValidationWarning::with_path(
            WarningCode::SamplesOutOfRange,
            format!(
                "{} sample(s) outside [-1, 1] will be clamped",
                out_of_range
            ),
            FIELD_IMPULSE_RESPONSE,
        ));
    }

    if !COMMON_SAMPLE_RATES.contains(&sample_rate) {
        result.add_warning(ValidationWarning::with_path(
            WarningCode::UncommonSampleRate,
            format!("sample rate {} Hz is unusual for impulse responses", sample_rate),
            FIELD_SAMPLE_RATE,
        ));
    }
}

/// Returns a short name for a JSON value's type, for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
