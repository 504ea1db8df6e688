//! One upload-analyze-download cycle.
//!
//! ```text
//! Idle --begin--> Analyzing --complete(ok)--> Complete --reset--> Idle
//!                     |                                    ^
//!                     +--complete(err)--> Failed --reset---+
//! ```
//!
//! Each analysis gets a [`Ticket`]. A completion whose ticket is not the
//! current analysis is dropped, so a reset while the analyzer is busy makes
//! its eventual result harmless. The image preview lives exactly as long as
//! the `Analyzing` state.

use std::fmt;

use auricle_backend_wav::{encode_hrir, EncodeOptions, EncodingError, WavResult};
use auricle_spec::{
    suggested_wav_name, validate_payload, BackendError, HrirData, SchemaError, ValidationWarning,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analyzer::{Analyzer, AnalyzerError};
use crate::upload::{PreviewHandle, UploadError, UploadedImage};

/// Identifies one analysis within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors from session operations.
///
/// Everything except `InvalidTransition` also moves the session to `Failed`.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot {action} while session is {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

impl BackendError for SessionError {
    fn code(&self) -> &'static str {
        match self {
            SessionError::InvalidTransition { .. } => "SESSION_001",
            SessionError::Upload(e) => e.code(),
            SessionError::Analyzer(e) => e.code(),
            SessionError::Schema(e) => e.code(),
            SessionError::Encoding(e) => e.code(),
        }
    }

    fn category(&self) -> &'static str {
        match self {
            SessionError::InvalidTransition { .. } => "session",
            SessionError::Upload(e) => e.category(),
            SessionError::Analyzer(e) => e.category(),
            SessionError::Schema(e) => e.category(),
            SessionError::Encoding(e) => e.category(),
        }
    }
}

#[derive(Debug)]
pub enum SessionState {
    Idle,
    Analyzing {
        ticket: Ticket,
        image: UploadedImage,
        preview: PreviewHandle,
    },
    Complete {
        data: HrirData,
        warnings: Vec<ValidationWarning>,
    },
    Failed {
        message: String,
    },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Analyzing { .. } => "analyzing",
            SessionState::Complete { .. } => "complete",
            SessionState::Failed { .. } => "failed",
        }
    }
}

/// What happened to a delivered analysis result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The result belonged to the current analysis and was validated.
    Applied,
    /// The result belonged to an abandoned analysis and was discarded.
    Stale,
}

/// A rendered WAV file ready to be saved.
#[derive(Debug, Clone)]
pub struct Download {
    pub file_name: String,
    pub wav: WavResult,
}

#[derive(Debug)]
pub struct Session {
    state: SessionState,
    last_ticket: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            last_ticket: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Ticket of the analysis in flight, if any.
    pub fn current_ticket(&self) -> Option<Ticket> {
        match &self.state {
            SessionState::Analyzing { ticket, .. } => Some(*ticket),
            _ => None,
        }
    }

    /// Path of the preview file while analyzing.
    pub fn preview_path(&self) -> Option<&std::path::Path> {
        match &self.state {
            SessionState::Analyzing { preview, .. } => Some(preview.path()),
            _ => None,
        }
    }

    pub fn image(&self) -> Option<&UploadedImage> {
        match &self.state {
            SessionState::Analyzing { image, .. } => Some(image),
            _ => None,
        }
    }

    pub fn data(&self) -> Option<&HrirData> {
        match &self.state {
            SessionState::Complete { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn warnings(&self) -> &[ValidationWarning] {
        match &self.state {
            SessionState::Complete { warnings, .. } => warnings,
            _ => &[],
        }
    }

    pub fn failure_message(&self) -> Option<&str> {
        match &self.state {
            SessionState::Failed { message } => Some(message),
            _ => None,
        }
    }

    /// Starts an analysis of `image`. Only legal from `Idle`.
    pub fn begin(&mut self, image: UploadedImage) -> Result<Ticket, SessionError> {
        if !matches!(self.state, SessionState::Idle) {
            return Err(self.invalid("begin analysis"));
        }

        let preview = match PreviewHandle::open(&image) {
            Ok(preview) => preview,
            Err(e) => return Err(self.fail(e.into())),
        };

        self.last_ticket += 1;
        let ticket = Ticket(self.last_ticket);
        info!(%ticket, image = %image.file_name, "analysis started");
        self.state = SessionState::Analyzing {
            ticket,
            image,
            preview,
        };
        Ok(ticket)
    }

    /// Delivers an analyzer result.
    ///
    /// Stale tickets are ignored. Otherwise the preview is released and the
    /// payload validated: success moves to `Complete`, any error to `Failed`
    /// and is returned.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: Result<serde_json::Value, AnalyzerError>,
    ) -> Result<Completion, SessionError> {
        if self.current_ticket() != Some(ticket) {
            debug!(%ticket, state = self.state.name(), "discarding stale analysis result");
            return Ok(Completion::Stale);
        }
        self.leave_analyzing();

        let validated = result
            .map_err(SessionError::from)
            .and_then(|value| validate_payload(&value).map_err(SessionError::from));

        match validated {
            Ok(payload) => {
                info!(
                    %ticket,
                    samples = payload.data.sample_count(),
                    sample_rate = payload.data.sample_rate,
                    channel = %payload.data.channel,
                    warnings = payload.warnings.len(),
                    "analysis complete"
                );
                self.state = SessionState::Complete {
                    data: payload.data,
                    warnings: payload.warnings,
                };
                Ok(Completion::Applied)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Runs `analyzer` synchronously for `image`.
    pub fn analyze_with(
        &mut self,
        image: UploadedImage,
        analyzer: &dyn Analyzer,
    ) -> Result<Ticket, SessionError> {
        let ticket = self.begin(image)?;
        let result = match self.image() {
            Some(image) => analyzer.analyze(image),
            None => return Err(self.invalid("analyze")),
        };
        self.complete(ticket, result)?;
        Ok(ticket)
    }

    /// Encodes the completed result and names the file after its channel
    /// and `timestamp_ms`.
    pub fn download(
        &mut self,
        timestamp_ms: i64,
        options: &EncodeOptions,
    ) -> Result<Download, SessionError> {
        let data = match &self.state {
            SessionState::Complete { data, .. } => data,
            _ => return Err(self.invalid("download")),
        };

        match encode_hrir(data, options) {
            Ok(wav) => {
                let file_name = suggested_wav_name(data.channel, timestamp_ms);
                debug!(file = %file_name, bytes = wav.wav_data.len(), "rendered download");
                Ok(Download { file_name, wav })
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// Discards all state and releases held resources. Legal from any state.
    pub fn reset(&mut self) {
        debug!(state = self.state.name(), "session reset");
        self.leave_analyzing();
        self.state = SessionState::Idle;
    }

    fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }

    /// Records a failure and hands the error back to the caller.
    fn fail(&mut self, error: SessionError) -> SessionError {
        self.leave_analyzing();
        warn!(code = error.code(), "session failed: {}", error);
        self.state = SessionState::Failed {
            message: error.to_string(),
        };
        error
    }

    /// Releases the preview if analyzing, leaving the session `Idle`.
    fn leave_analyzing(&mut self) {
        if !matches!(self.state, SessionState::Analyzing { .. }) {
            return;
        }
        if let SessionState::Analyzing { preview, .. } =
            std::mem::replace(&mut self.state, SessionState::Idle)
        {
            if let Err(e) = preview.release() {
                warn!("failed to remove preview file: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auricle_backend_wav::wav::decode_samples;
    use auricle_spec::{Channel, ErrorCode, WarningCode};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::cell::Cell;

    const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn image() -> UploadedImage {
        UploadedImage::from_bytes("ear.png", PNG_BYTES.to_vec()).unwrap()
    }

    fn payload() -> Value {
        json!({
            "measurements": [
                {"feature": "Concha", "value": "Deep", "impact": "Boosts 4 kHz"}
            ],
            "impulseResponse": [0.0, 0.5, -0.5, 1.0, -1.0],
            "sampleRate": 44100,
            "channel": "left"
        })
    }

    struct StubAnalyzer {
        result: fn() -> Result<Value, AnalyzerError>,
        calls: Cell<usize>,
    }

    impl StubAnalyzer {
        fn new(result: fn() -> Result<Value, AnalyzerError>) -> Self {
            Self {
                result,
                calls: Cell::new(0),
            }
        }
    }

    impl Analyzer for StubAnalyzer {
        fn analyze(&self, _image: &UploadedImage) -> Result<Value, AnalyzerError> {
            self.calls.set(self.calls.get() + 1);
            (self.result)()
        }
    }

    #[test]
    fn test_happy_path() {
        let mut session = Session::new();
        let analyzer = StubAnalyzer::new(|| Ok(payload()));

        let ticket = session.analyze_with(image(), &analyzer).unwrap();
        assert_eq!(ticket.value(), 1);
        assert_eq!(analyzer.calls.get(), 1);
        assert_eq!(session.state().name(), "complete");

        let data = session.data().unwrap();
        assert_eq!(data.channel, Channel::Left);
        assert_eq!(data.sample_count(), 5);
        assert!(session
            .warnings()
            .iter()
            .any(|w| w.code == WarningCode::UnexpectedLength));

        let download = session
            .download(1_700_000_000_000, &EncodeOptions::default())
            .unwrap();
        assert_eq!(download.file_name, "custom_hrir_left_1700000000000.wav");
        assert_eq!(
            decode_samples(&download.wav.wav_data).unwrap(),
            vec![0, 16383, -16384, 32767, -32768]
        );

        session.reset();
        assert_eq!(session.state().name(), "idle");
        assert!(session.data().is_none());
    }

    #[test]
    fn test_preview_lives_while_analyzing() {
        let mut session = Session::new();
        let ticket = session.begin(image()).unwrap();

        let preview = session.preview_path().unwrap().to_path_buf();
        assert_eq!(std::fs::read(&preview).unwrap(), PNG_BYTES);

        session.complete(ticket, Ok(payload())).unwrap();
        assert!(!preview.exists());
        assert!(session.preview_path().is_none());
    }

    #[test]
    fn test_schema_failure_moves_to_failed() {
        let mut session = Session::new();
        let ticket = session.begin(image()).unwrap();
        let preview = session.preview_path().unwrap().to_path_buf();

        let err = session
            .complete(ticket, Ok(json!({"measurements": [], "impulseResponse": []})))
            .unwrap_err();
        match &err {
            SessionError::Schema(schema) => assert!(schema.has_code(ErrorCode::MissingField)),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(session.state().name(), "failed");
        assert!(session.failure_message().unwrap().contains("sampleRate"));
        assert!(!preview.exists());

        session.reset();
        assert!(session.begin(image()).is_ok());
    }

    #[test]
    fn test_analyzer_failure_moves_to_failed() {
        let mut session = Session::new();
        let analyzer = StubAnalyzer::new(|| {
            Err(AnalyzerError::NonZeroExit {
                code: 2,
                stderr: "model overloaded".to_string(),
            })
        });

        let err = session.analyze_with(image(), &analyzer).unwrap_err();
        assert_eq!(err.code(), "ANALYZER_002");
        assert!(session.failure_message().unwrap().contains("model overloaded"));
    }

    #[test]
    fn test_stale_result_is_ignored() {
        let mut session = Session::new();
        let first = session.begin(image()).unwrap();
        session.reset();
        let second = session.begin(image()).unwrap();
        assert!(second > first);

        let outcome = session.complete(first, Ok(payload())).unwrap();
        assert_eq!(outcome, Completion::Stale);
        assert_eq!(session.current_ticket(), Some(second));

        assert_eq!(
            session.complete(second, Ok(payload())).unwrap(),
            Completion::Applied
        );
        // A duplicate delivery after completion is also stale
        assert_eq!(
            session.complete(second, Ok(payload())).unwrap(),
            Completion::Stale
        );
        assert_eq!(session.state().name(), "complete");
    }

    #[test]
    fn test_reset_releases_preview() {
        let mut session = Session::new();
        session.begin(image()).unwrap();
        let preview = session.preview_path().unwrap().to_path_buf();

        session.reset();
        assert!(!preview.exists());
    }

    #[test]
    fn test_drop_releases_preview() {
        let mut session = Session::new();
        session.begin(image()).unwrap();
        let preview = session.preview_path().unwrap().to_path_buf();

        drop(session);
        assert!(!preview.exists());
    }

    #[test]
    fn test_illegal_transitions() {
        let mut session = Session::new();
        let err = session
            .download(0, &EncodeOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidTransition {
                action: "download",
                state: "idle"
            }
        ));

        session.begin(image()).unwrap();
        let err = session.begin(image()).unwrap_err();
        assert_eq!(err.code(), "SESSION_001");
        assert_eq!(err.to_string(), "cannot begin analysis while session is analyzing");
        // Rejected transitions leave the state alone
        assert_eq!(session.state().name(), "analyzing");
    }

    #[test]
    fn test_encoding_failure_moves_to_failed() {
        let mut session = Session::new();
        let ticket = session.begin(image()).unwrap();
        session.complete(ticket, Ok(payload())).unwrap();

        let options = EncodeOptions {
            channels: 0,
            ..Default::default()
        };
        let err = session.download(0, &options).unwrap_err();
        assert!(matches!(err, SessionError::Encoding(_)));
        assert_eq!(session.state().name(), "failed");
    }

    #[test]
    fn test_tickets_keep_increasing_across_resets() {
        let mut session = Session::new();
        let mut last = None;
        for _ in 0..3 {
            let ticket = session.begin(image()).unwrap();
            assert!(last.map_or(true, |prev| ticket > prev));
            last = Some(ticket);
            session.reset();
        }
        assert_eq!(last.map(|t| t.value()), Some(3));
    }
}
