//! Session lifecycle tests.
//!
//! Drives the upload → analyze → download state machine with canned
//! analyzers, including late results from abandoned analyses.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p auricle-tests --test session_flow
//! ```

use std::cell::Cell;

use auricle_backend_wav::wav::read_wav_info;
use auricle_backend_wav::EncodeOptions;
use auricle_cli::analyzer::{Analyzer, AnalyzerError, FixtureAnalyzer};
use auricle_cli::session::{Completion, Session, SessionError, SessionState};
use auricle_cli::upload::UploadedImage;
use auricle_spec::{BackendError, Channel};
use auricle_tests::fixtures::{payload_with, valid_payload, PNG_BYTES};
use auricle_tests::harness::{validate_wav_file, TestHarness};
use serde_json::{json, Value};

/// Returns a fixed payload and counts invocations.
struct Canned {
    payload: Value,
    calls: Cell<usize>,
}

impl Canned {
    fn new(payload: Value) -> Self {
        Self {
            payload,
            calls: Cell::new(0),
        }
    }
}

impl Analyzer for Canned {
    fn analyze(&self, _image: &UploadedImage) -> Result<Value, AnalyzerError> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.payload.clone())
    }
}

fn ear_photo() -> UploadedImage {
    UploadedImage::from_bytes("ear.png", PNG_BYTES.to_vec()).unwrap()
}

#[test]
fn test_full_session_produces_download() {
    let analyzer = Canned::new(payload_with(vec![0.0, 0.5, -0.5], 48000, Some("left")));
    let mut session = Session::new();

    session.analyze_with(ear_photo(), &analyzer).unwrap();
    assert_eq!(analyzer.calls.get(), 1);
    assert_eq!(session.state().name(), "complete");
    assert_eq!(session.data().unwrap().channel, Channel::Left);

    let download = session.download(1_700_000_000_000, &EncodeOptions::default()).unwrap();
    assert_eq!(download.file_name, "custom_hrir_left_1700000000000.wav");

    let info = read_wav_info(&download.wav.wav_data).unwrap();
    assert_eq!(info.sample_rate, 48000);
    assert_eq!(info.num_frames, 3);

    // Downloading again is allowed and identical
    let again = session.download(1_700_000_000_000, &EncodeOptions::default()).unwrap();
    assert_eq!(again.wav.wav_data, download.wav.wav_data);
}

#[test]
fn test_late_result_after_reset_is_ignored() {
    let mut session = Session::new();
    let abandoned = session.begin(ear_photo()).unwrap();
    let preview = session.preview_path().unwrap().to_path_buf();
    assert!(preview.exists());

    session.reset();
    assert!(!preview.exists());

    let current = session.begin(ear_photo()).unwrap();
    assert!(current > abandoned);

    let late = session.complete(abandoned, Ok(valid_payload())).unwrap();
    assert_eq!(late, Completion::Stale);
    assert_eq!(session.current_ticket(), Some(current));

    let applied = session
        .complete(current, Ok(payload_with(vec![0.1], 44100, Some("mono"))))
        .unwrap();
    assert_eq!(applied, Completion::Applied);
    assert_eq!(session.data().unwrap().channel, Channel::Mono);
}

#[test]
fn test_preview_released_when_analysis_fails() {
    let mut session = Session::new();
    let ticket = session.begin(ear_photo()).unwrap();
    let preview = session.preview_path().unwrap().to_path_buf();

    let err = session
        .complete(ticket, Err(AnalyzerError::InvalidOutput("not json".into())))
        .unwrap_err();
    assert_eq!(err.code(), "ANALYZER_004");
    assert!(!preview.exists());
    assert!(session.failure_message().unwrap().contains("not json"));
}

#[test]
fn test_invalid_payload_fails_session() {
    let analyzer = Canned::new(json!({"measurements": [], "impulseResponse": [0.1]}));
    let mut session = Session::new();

    let err = session.analyze_with(ear_photo(), &analyzer).unwrap_err();
    assert!(matches!(err, SessionError::Schema(_)));
    assert!(matches!(session.state(), SessionState::Failed { .. }));

    // A failed session must be reset before the next upload
    assert!(session.begin(ear_photo()).is_err());
    session.reset();
    assert!(session.begin(ear_photo()).is_ok());
}

#[test]
fn test_download_requires_completed_analysis() {
    let mut session = Session::new();
    let err = session.download(0, &EncodeOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        SessionError::InvalidTransition {
            state: "idle",
            ..
        }
    ));
    assert_eq!(session.state().name(), "idle");
}

#[test]
fn test_fixture_analyzer_reads_payload_file() {
    let harness = TestHarness::new();
    let fixture = harness.write_payload("payload.json", &valid_payload());
    let analyzer = FixtureAnalyzer::new(&fixture);

    let mut session = Session::new();
    session.analyze_with(ear_photo(), &analyzer).unwrap();
    assert_eq!(session.data().unwrap().sample_count(), 512);

    let missing = FixtureAnalyzer::new(harness.path().join("missing.json"));
    let mut session = Session::new();
    let err = session.analyze_with(ear_photo(), &missing).unwrap_err();
    assert_eq!(err.code(), "ANALYZER_006");
}

#[test]
fn test_cli_analyze_with_fixture() {
    let harness = TestHarness::new();
    let image = harness.write_image("ear.png");
    let fixture = harness.write_payload("payload.json", &valid_payload());
    let out_dir = harness.path().join("out");

    let result = harness.run_cli(&[
        "analyze",
        "--image",
        image.to_str().unwrap(),
        "--fixture",
        fixture.to_str().unwrap(),
        "--out-dir",
        out_dir.to_str().unwrap(),
        "--json",
    ]);
    result.assert_success();
    assert_eq!(result.json()["success"], true);

    let files = harness.wav_files(&out_dir);
    assert_eq!(files.len(), 1);
    assert_eq!(validate_wav_file(&files[0]).unwrap().num_frames, 512);
}

#[test]
fn test_cli_analyze_rejects_non_image() {
    let harness = TestHarness::new();
    let not_image = harness.write_payload("notes.png", &json!({"hello": "world"}));
    let fixture = harness.write_payload("payload.json", &valid_payload());

    let result = harness.run_cli(&[
        "analyze",
        "--image",
        not_image.to_str().unwrap(),
        "--fixture",
        fixture.to_str().unwrap(),
        "--json",
    ]);
    result.assert_failure();

    let report = result.json();
    assert_eq!(report["errors"][0]["code"], "UPLOAD_003");
    assert!(harness.wav_files(harness.path()).is_empty());
}
