//! Tests for payload validation.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use super::*;

fn full_payload() -> Value {
    json!({
        "measurements": [
            {
                "feature": "Helix",
                "value": "Prominent fold",
                "impact": "Adds a reflection around 0.2 ms"
            },
            {
                "feature": "Concha depth",
                "value": "~15 mm",
                "impact": "Resonance near 5 kHz"
            }
        ],
        "impulseResponse": vec![0.0; EXPECTED_IR_LENGTH],
        "sampleRate": 44100,
        "channel": "left"
    })
}

fn codes(err: &SchemaError) -> Vec<ErrorCode> {
    err.errors.iter().map(|e| e.code).collect()
}

fn warning_codes(payload: &ValidatedPayload) -> Vec<WarningCode> {
    payload.warnings.iter().map(|w| w.code).collect()
}

// =========================================================================
// Accepted payloads
// =========================================================================

#[test]
fn test_full_payload_is_accepted_without_warnings() {
    let validated = validate_payload(&full_payload()).expect("should validate");

    assert_eq!(validated.data.channel, Channel::Left);
    assert_eq!(validated.data.sample_rate, 44100);
    assert_eq!(validated.data.sample_count(), EXPECTED_IR_LENGTH);
    assert_eq!(validated.data.measurements.len(), 2);
    assert!(validated.warnings.is_empty(), "{:?}", validated.warnings);
}

#[test]
fn test_measurements_pass_through_verbatim() {
    let mut payload = full_payload();
    payload["measurements"] = json!([{
        "feature": "  Tragus ",
        "value": "≈ 8mm (??)",
        "impact": "",
        "confidence": 0.4
    }]);

    let validated = validate_payload(&payload).unwrap();
    assert_eq!(
        validated.data.measurements,
        vec![HrirMeasurement::new("  Tragus ", "≈ 8mm (??)", "")]
    );
}

#[test]
fn test_missing_channel_defaults_to_right() {
    let mut payload = full_payload();
    payload.as_object_mut().unwrap().remove("channel");

    let validated = validate_payload(&payload).unwrap();
    assert_eq!(validated.data.channel, Channel::Right);
    assert_eq!(warning_codes(&validated), vec![WarningCode::ChannelDefaulted]);
}

#[test]
fn test_null_channel_defaults_to_right() {
    let mut payload = full_payload();
    payload["channel"] = Value::Null;

    let validated = validate_payload(&payload).unwrap();
    assert_eq!(validated.data.channel, Channel::Right);
}

#[test]
fn test_any_length_is_accepted() {
    for len in [0usize, 1, 256, 513, 2048] {
        let mut payload = full_payload();
        payload["impulseResponse"] = json!(vec![0.25; len]);

        let validated = validate_payload(&payload).unwrap();
        assert_eq!(validated.data.sample_count(), len);
    }
}

#[test]
fn test_integral_float_sample_rate_is_accepted() {
    let mut payload = full_payload();
    payload["sampleRate"] = json!(48000.0);

    let validated = validate_payload(&payload).unwrap();
    assert_eq!(validated.data.sample_rate, 48000);
}

#[test]
fn test_integer_samples_are_accepted() {
    let mut payload = full_payload();
    payload["impulseResponse"] = json!([0, 1, -1]);

    let validated = validate_payload(&payload).unwrap();
    assert_eq!(validated.data.impulse_response, vec![0.0, 1.0, -1.0]);
}

// =========================================================================
// Warnings
// =========================================================================

#[test]
fn test_unexpected_length_warns() {
    let mut payload = full_payload();
    payload["impulseResponse"] = json!([0.1, 0.2]);

    let validated = validate_payload(&payload).unwrap();
    assert_eq!(warning_codes(&validated), vec![WarningCode::UnexpectedLength]);
}

#[test]
fn test_empty_response_warns_once() {
    let mut payload = full_payload();
    payload["impulseResponse"] = json!([]);

    let validated = validate_payload(&payload).unwrap();
    assert_eq!(
        warning_codes(&validated),
        vec![WarningCode::EmptyImpulseResponse]
    );
}

#[test]
fn test_out_of_range_samples_warn_but_are_kept() {
    let mut samples = vec![0.0; EXPECTED_IR_LENGTH];
    samples[0] = 1.5;
    samples[1] = -3.0;
    let mut payload = full_payload();
    payload["impulseResponse"] = json!(samples);

    let validated = validate_payload(&payload).unwrap();
    assert_eq!(validated.data.impulse_response[0], 1.5);
    assert_eq!(warning_codes(&validated), vec![WarningCode::SamplesOutOfRange]);
    assert!(validated.warnings[0].message.starts_with("2 sample(s)"));
}

#[test]
fn test_uncommon_sample_rate_warns() {
    let mut payload = full_payload();
    payload["sampleRate"] = json!(12345);

    let validated = validate_payload(&payload).unwrap();
    assert_eq!(
        warning_codes(&validated),
        vec![WarningCode::UncommonSampleRate]
    );
}

// =========================================================================
// Rejected payloads
// =========================================================================

#[test]
fn test_non_object_payload_is_rejected() {
    for value in [json!(null), json!([1, 2]), json!("text"), json!(42)] {
        let err = validate_payload(&value).unwrap_err();
        assert_eq!(codes(&err), vec![ErrorCode::NotAnObject]);
    }
}

#[test]
fn test_missing_sample_rate_is_rejected() {
    let mut payload = full_payload();
    payload.as_object_mut().unwrap().remove("sampleRate");

    let err = validate_payload(&payload).unwrap_err();
    assert_eq!(codes(&err), vec![ErrorCode::MissingField]);
    assert_eq!(err.errors[0].path.as_deref(), Some("sampleRate"));
}

#[test]
fn test_every_missing_required_field_is_reported() {
    let err = validate_payload(&json!({})).unwrap_err();
    let paths: Vec<_> = err
        .errors
        .iter()
        .map(|e| e.path.clone().unwrap_or_default())
        .collect();
    assert_eq!(paths, vec!["measurements", "impulseResponse", "sampleRate"]);
    assert!(err.errors.iter().all(|e| e.code == ErrorCode::MissingField));
}

#[test]
fn test_non_numeric_sample_is_rejected_with_index() {
    let mut payload = full_payload();
    payload["impulseResponse"] = json!([0.0, "0.5", null, 0.25]);

    let err = validate_payload(&payload).unwrap_err();
    assert_eq!(
        codes(&err),
        vec![ErrorCode::NonFiniteSample, ErrorCode::NonFiniteSample]
    );
    assert_eq!(err.errors[0].path.as_deref(), Some("impulseResponse[1]"));
    assert_eq!(err.errors[1].path.as_deref(), Some("impulseResponse[2]"));
}

#[test]
fn test_nan_injected_in_process_is_rejected() {
    // serde_json stores non-finite floats as null
    let mut payload = full_payload();
    payload["impulseResponse"] = json!([0.0, f64::NAN]);

    let err = validate_payload(&payload).unwrap_err();
    assert!(err.has_code(ErrorCode::NonFiniteSample));
}

#[test]
fn test_impulse_response_wrong_type_is_rejected() {
    let mut payload = full_payload();
    payload["impulseResponse"] = json!({"0": 0.1});

    let err = validate_payload(&payload).unwrap_err();
    assert_eq!(codes(&err), vec![ErrorCode::WrongType]);
}

#[test]
fn test_invalid_sample_rates_are_rejected() {
    for rate in [json!(0), json!(-44100), json!(44100.5), json!(5_000_000_000u64)] {
        let mut payload = full_payload();
        payload["sampleRate"] = rate.clone();

        let err = validate_payload(&payload).unwrap_err();
        assert_eq!(
            codes(&err),
            vec![ErrorCode::InvalidSampleRate],
            "rate {} should be rejected",
            rate
        );
    }
}

#[test]
fn test_string_sample_rate_is_wrong_type() {
    let mut payload = full_payload();
    payload["sampleRate"] = json!("44100");

    let err = validate_payload(&payload).unwrap_err();
    assert_eq!(codes(&err), vec![ErrorCode::WrongType]);
}

#[test]
fn test_unknown_channel_is_rejected() {
    let mut payload = full_payload();
    payload["channel"] = json!("both");

    let err = validate_payload(&payload).unwrap_err();
    assert_eq!(codes(&err), vec![ErrorCode::UnknownChannel]);
}

#[test]
fn test_malformed_measurement_is_rejected() {
    let mut payload = full_payload();
    payload["measurements"] = json!([
        {"feature": "Helix", "value": 12, "impact": "none"},
        "just text"
    ]);

    let err = validate_payload(&payload).unwrap_err();
    assert_eq!(
        codes(&err),
        vec![ErrorCode::InvalidMeasurement, ErrorCode::InvalidMeasurement]
    );
    assert_eq!(err.errors[0].path.as_deref(), Some("measurements[0].value"));
    assert_eq!(err.errors[1].path.as_deref(), Some("measurements[1]"));
}

#[test]
fn test_measurement_missing_impact_is_rejected() {
    let mut payload = full_payload();
    payload["measurements"] = json!([{"feature": "Helix", "value": "Large"}]);

    let err = validate_payload(&payload).unwrap_err();
    assert_eq!(err.errors[0].path.as_deref(), Some("measurements[0].impact"));
}

#[test]
fn test_errors_from_several_fields_are_collected() {
    let payload = json!({
        "measurements": "none",
        "impulseResponse": [true],
        "sampleRate": 0,
        "channel": 3
    });

    let err = validate_payload(&payload).unwrap_err();
    assert_eq!(
        codes(&err),
        vec![
            ErrorCode::WrongType,
            ErrorCode::NonFiniteSample,
            ErrorCode::InvalidSampleRate,
            ErrorCode::WrongType,
        ]
    );
}
