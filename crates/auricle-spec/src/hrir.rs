//! HRIR payload types.

use serde::{Deserialize, Serialize};

use crate::error::SpecError;
use crate::validation::{validate_payload, ValidatedPayload};

/// Number of samples the analysis model is asked to produce.
///
/// Payloads of any other length are still accepted.
pub const EXPECTED_IR_LENGTH: usize = 512;

/// Sample rates that binaural tools load without resampling.
pub const COMMON_SAMPLE_RATES: &[u32] = &[22050, 44100, 48000, 88200, 96000];

/// Which ear (or both) an impulse response was generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Left ear.
    Left,
    /// Right ear. Side-profile photos are assumed to show this ear.
    #[default]
    Right,
    /// Single response used for both ears.
    Mono,
}

impl Channel {
    /// Returns the lowercase tag used on the wire and in file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Left => "left",
            Channel::Right => "right",
            Channel::Mono => "mono",
        }
    }

    /// Parses a wire tag. Matching is exact (lowercase).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "left" => Some(Channel::Left),
            "right" => Some(Channel::Right),
            "mono" => Some(Channel::Mono),
            _ => None,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A human-readable biometric observation made by the analysis model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HrirMeasurement {
    /// Anatomical feature, e.g. "Concha depth".
    pub feature: String,
    /// Estimated measurement or classification.
    pub value: String,
    /// How the feature colors incoming sound.
    pub impact: String,
}

impl HrirMeasurement {
    /// Creates a new measurement.
    pub fn new(
        feature: impl Into<String>,
        value: impl Into<String>,
        impact: impl Into<String>,
    ) -> Self {
        Self {
            feature: feature.into(),
            value: value.into(),
            impact: impact.into(),
        }
    }
}

/// A validated impulse-response result.
///
/// Instances built by [`validate_payload`] are guaranteed to have a positive
/// sample rate and only finite samples. Samples may still lie outside
/// [-1, 1]; the encoder clamps them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HrirData {
    /// Biometric observations in presentation order.
    pub measurements: Vec<HrirMeasurement>,
    /// Time-domain samples, nominally normalized to [-1, 1].
    pub impulse_response: Vec<f64>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Ear the response belongs to.
    #[serde(default)]
    pub channel: Channel,
}

impl HrirData {
    /// Creates a new HRIR result.
    pub fn new(
        measurements: Vec<HrirMeasurement>,
        impulse_response: Vec<f64>,
        sample_rate: u32,
        channel: Channel,
    ) -> Self {
        Self {
            measurements,
            impulse_response,
            sample_rate,
            channel,
        }
    }

    /// Parses and validates an untrusted JSON payload.
    pub fn from_json(json: &str) -> Result<ValidatedPayload, SpecError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Ok(validate_payload(&value)?)
    }

    /// Serializes to pretty-printed JSON using the wire field names.
    pub fn to_json_pretty(&self) -> Result<String, SpecError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of samples in the impulse response.
    pub fn sample_count(&self) -> usize {
        self.impulse_response.len()
    }

    /// Duration of the impulse response in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        self.impulse_response.len() as f64 / self.sample_rate as f64 * 1000.0
    }

    /// BLAKE3 hash of the compact JSON serialization.
    ///
    /// Field order is fixed by the struct definition, so equal values always
    /// hash equally.
    pub fn content_hash(&self) -> Result<String, SpecError> {
        let bytes = serde_json::to_vec(self)?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}
