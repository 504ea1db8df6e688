//! Canned payloads and images.

use serde_json::{json, Value};

/// Smallest byte sequence recognized as a PNG upload.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";

/// The five-sample scenario used throughout the encoder docs.
pub const WORKED_EXAMPLE: [f64; 5] = [0.0, 0.5, -0.5, 1.0, -1.0];

/// Its 16-bit full-scale codes.
pub const WORKED_EXAMPLE_CODES: [i32; 5] = [0, 16383, -16384, 32767, -32768];

/// A decaying, ringing impulse response of `len` samples.
///
/// Peaks near sample 8 and stays inside [-1, 1].
pub fn synthetic_ir(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64;
            let onset = if i < 8 { t / 8.0 } else { 1.0 };
            onset * (-t / 60.0).exp() * (t * 0.7).cos() * 0.9
        })
        .collect()
}

/// Typical ear-analysis measurements.
pub fn measurements() -> Value {
    json!([
        {"feature": "Pinna height", "value": "Large (~68mm)", "impact": "Lowers the first notch toward 6 kHz"},
        {"feature": "Concha depth", "value": "Deep", "impact": "Strong resonance near 4.5 kHz"},
        {"feature": "Helix", "value": "Folded", "impact": "Minor high-frequency shadowing"}
    ])
}

/// A complete payload with a 512-sample response.
pub fn valid_payload() -> Value {
    payload_with(synthetic_ir(512), 44100, Some("right"))
}

/// A payload with the given samples, rate and optional channel tag.
pub fn payload_with(samples: Vec<f64>, sample_rate: u32, channel: Option<&str>) -> Value {
    let mut payload = json!({
        "measurements": measurements(),
        "impulseResponse": samples,
        "sampleRate": sample_rate,
    });
    if let (Some(channel), Some(obj)) = (channel, payload.as_object_mut()) {
        obj.insert("channel".to_string(), json!(channel));
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use auricle_spec::validate_payload;

    #[test]
    fn test_synthetic_ir_in_range() {
        let ir = synthetic_ir(512);
        assert_eq!(ir.len(), 512);
        assert!(ir.iter().all(|s| (-1.0..=1.0).contains(s)));
        assert_eq!(ir[0], 0.0);
    }

    #[test]
    fn test_valid_payload_has_no_warnings() {
        let validated = validate_payload(&valid_payload()).unwrap();
        assert!(validated.warnings.is_empty(), "{:?}", validated.warnings);
        assert_eq!(validated.data.measurements.len(), 3);
    }
}
