//! The boundary to the ear-analysis model.
//!
//! The model itself lives outside this crate. An [`Analyzer`] turns an
//! uploaded image into an unvalidated JSON payload; the session validates it.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use auricle_spec::BackendError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::upload::UploadedImage;

/// Errors from an analysis call.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("failed to spawn analyzer '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("analyzer exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("analyzer timed out after {timeout_seconds}s")]
    Timeout { timeout_seconds: u64 },

    #[error("analyzer output is not valid JSON: {0}")]
    InvalidOutput(String),

    #[error("analyzer I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read fixture {path}: {source}")]
    Fixture {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BackendError for AnalyzerError {
    fn code(&self) -> &'static str {
        match self {
            AnalyzerError::Spawn { .. } => "ANALYZER_001",
            AnalyzerError::NonZeroExit { .. } => "ANALYZER_002",
            AnalyzerError::Timeout { .. } => "ANALYZER_003",
            AnalyzerError::InvalidOutput(_) => "ANALYZER_004",
            AnalyzerError::Io(_) => "ANALYZER_005",
            AnalyzerError::Fixture { .. } => "ANALYZER_006",
        }
    }

    fn category(&self) -> &'static str {
        "analyzer"
    }
}

/// Produces an HRIR payload from an ear photo.
pub trait Analyzer {
    /// Returns the raw payload. Validation happens in the caller.
    fn analyze(&self, image: &UploadedImage) -> Result<serde_json::Value, AnalyzerError>;
}

/// Returns the content of a payload file regardless of the image.
#[derive(Debug, Clone)]
pub struct FixtureAnalyzer {
    path: PathBuf,
}

impl FixtureAnalyzer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Analyzer for FixtureAnalyzer {
    fn analyze(&self, image: &UploadedImage) -> Result<serde_json::Value, AnalyzerError> {
        debug!(fixture = %self.path.display(), image = %image.file_name, "reading fixture payload");
        let content = std::fs::read_to_string(&self.path).map_err(|source| {
            AnalyzerError::Fixture {
                path: self.path.clone(),
                source,
            }
        })?;
        serde_json::from_str(&content).map_err(|e| AnalyzerError::InvalidOutput(e.to_string()))
    }
}

/// JSON document written to the analyzer's stdin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub mime_type: String,
    /// Base64 image bytes.
    pub data: String,
    pub file_name: String,
}

impl AnalyzeRequest {
    pub fn from_image(image: &UploadedImage) -> Self {
        Self {
            mime_type: image.mime.as_mime().to_string(),
            data: image.to_base64(),
            file_name: image.file_name.clone(),
        }
    }
}

/// Runs an external program as the analyzer.
///
/// The program receives an [`AnalyzeRequest`] on stdin and must print the
/// payload JSON on stdout and exit with status 0.
#[derive(Debug, Clone)]
pub struct CommandAnalyzer {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandAnalyzer {
    /// Default time limit for one analysis.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

impl Analyzer for CommandAnalyzer {
    fn analyze(&self, image: &UploadedImage) -> Result<serde_json::Value, AnalyzerError> {
        let request = serde_json::to_vec(&AnalyzeRequest::from_image(image))
            .map_err(|e| AnalyzerError::InvalidOutput(e.to_string()))?;

        debug!(program = %self.program, args = ?self.args, "spawning analyzer");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| AnalyzerError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Every pipe is serviced on its own thread; a full buffer blocks the child
        let stdin = child.stdin.take();
        let writer = thread::spawn(move || -> std::io::Result<()> {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&request)?;
            }
            Ok(())
        });
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let start = Instant::now();
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if start.elapsed() > self.timeout {
                let _ = child.kill();
                let _ = child.wait();
                warn!(program = %self.program, "analyzer timed out");
                return Err(AnalyzerError::Timeout {
                    timeout_seconds: self.timeout.as_secs(),
                });
            }
            thread::sleep(Duration::from_millis(10));
        };

        let stdout = stdout.join().unwrap_or_default();
        let stderr = String::from_utf8_lossy(&stderr.join().unwrap_or_default()).into_owned();
        let write_result = writer.join().unwrap_or(Ok(()));

        if !status.success() {
            return Err(AnalyzerError::NonZeroExit {
                code: status.code().unwrap_or(-1),
                stderr: stderr.trim().to_string(),
            });
        }
        // Write errors matter only when stdout is unusable too
        let value = serde_json::from_slice(&stdout);
        match (value, write_result) {
            (Ok(value), _) => Ok(value),
            (Err(_), Err(io)) => Err(AnalyzerError::Io(io)),
            (Err(e), Ok(())) => Err(AnalyzerError::InvalidOutput(e.to_string())),
        }
    }
}
