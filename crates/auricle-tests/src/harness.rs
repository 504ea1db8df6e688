//! Test harness utilities for running CLI commands and validating outputs.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::OnceLock;

use auricle_backend_wav::wav::read_wav_info;
use auricle_backend_wav::{FormatError, WavInfo};
use serde_json::Value;
use tempfile::TempDir;

use crate::fixtures::PNG_BYTES;

/// Result of running the auricle CLI.
#[derive(Debug)]
pub struct CliResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    /// Create a CliResult from a Command Output.
    pub fn from_output(output: Output) -> Self {
        Self {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    /// Assert that the command succeeded.
    pub fn assert_success(&self) {
        assert!(
            self.success,
            "Command failed with exit code {}.\nstdout: {}\nstderr: {}",
            self.exit_code, self.stdout, self.stderr
        );
    }

    /// Assert that the command failed.
    pub fn assert_failure(&self) {
        assert!(
            !self.success,
            "Expected command to fail, but it succeeded.\nstdout: {}",
            self.stdout
        );
    }

    /// Parses stdout as the `--json` report.
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({}):\n{}", e, self.stdout))
    }
}

/// A test harness for running auricle CLI commands in a scratch directory.
pub struct TestHarness {
    /// Working directory for test inputs and outputs.
    pub work_dir: TempDir,
}

impl TestHarness {
    /// Create a new test harness.
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().expect("Failed to create work dir"),
        }
    }

    /// Get the working directory path.
    pub fn path(&self) -> &Path {
        self.work_dir.path()
    }

    /// Run the auricle CLI with the given arguments, from the work directory.
    pub fn run_cli(&self, args: &[&str]) -> CliResult {
        let output = Command::new("cargo")
            .args(["run", "--quiet", "--manifest-path"])
            .arg(workspace_manifest_path())
            .args(["-p", "auricle-cli", "--"])
            .args(args)
            .current_dir(self.path())
            .env_remove("RUST_LOG")
            .output();

        match output {
            Ok(out) => CliResult::from_output(out),
            Err(e) => CliResult {
                success: false,
                exit_code: -1,
                stdout: String::new(),
                stderr: format!("Failed to run CLI: {}", e),
            },
        }
    }

    /// Writes a payload file into the work directory.
    pub fn write_payload(&self, name: &str, payload: &Value) -> PathBuf {
        let path = self.path().join(name);
        let json = serde_json::to_string_pretty(payload).expect("Failed to serialize payload");
        fs::write(&path, json).expect("Failed to write payload");
        path
    }

    /// Writes a minimal PNG upload into the work directory.
    pub fn write_image(&self, name: &str) -> PathBuf {
        let path = self.path().join(name);
        fs::write(&path, PNG_BYTES).expect("Failed to write image");
        path
    }

    /// Lists WAV files written under `dir`.
    pub fn wav_files(&self, dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok().map(|e| e.path()))
                    .filter(|p| p.extension().is_some_and(|ext| ext == "wav"))
                    .collect()
            })
            .unwrap_or_default();
        files.sort();
        files
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

fn workspace_manifest_path() -> PathBuf {
    static PATH: OnceLock<PathBuf> = OnceLock::new();
    PATH.get_or_init(|| {
        let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let manifest_path = manifest_dir.join("..").join("..").join("Cargo.toml");
        manifest_path.canonicalize().unwrap_or(manifest_path)
    })
    .clone()
}

/// Reads a file and checks it is a PCM WAV.
pub fn validate_wav_file(path: &Path) -> Result<WavInfo, FormatError> {
    let data = fs::read(path).map_err(|e| FormatError::new(format!("Failed to read file: {}", e)))?;
    let info = read_wav_info(&data)?;
    if info.audio_format != 1 {
        return Err(FormatError::new(format!(
            "expected PCM format 1, got {}",
            info.audio_format
        )));
    }
    Ok(info)
}
