//! Shared helpers for loading inputs and printing results.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use auricle_spec::{HrirData, ImpulseSummary, SchemaError, ValidationWarning};
use colored::Colorize;
use serde_json::Value;

use super::json_output::{
    error_codes, print_json, validation_error_to_json, warnings_to_json, FailureOutput, JsonError,
    JsonWarning,
};

/// Errors and warnings collected by a command that did not succeed.
#[derive(Debug, Clone, Default)]
pub(crate) struct CommandFailure {
    pub errors: Vec<JsonError>,
    pub warnings: Vec<JsonWarning>,
}

impl CommandFailure {
    pub fn new(error: JsonError) -> Self {
        Self {
            errors: vec![error],
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: &[ValidationWarning]) -> Self {
        self.warnings.extend(warnings_to_json(warnings));
        self
    }

    /// Prints the failure in the selected format.
    pub fn report(self, json_output: bool) -> Result<()> {
        if json_output {
            return print_json(&FailureOutput::new(self.errors, self.warnings));
        }
        print_warning_lines(&self.warnings);
        for error in &self.errors {
            print_error_line(error);
        }
        println!(
            "\n{} {} error(s)",
            "FAILED".red().bold(),
            self.errors.len()
        );
        Ok(())
    }
}

impl From<SchemaError> for CommandFailure {
    fn from(err: SchemaError) -> Self {
        Self {
            errors: err.errors.iter().map(validation_error_to_json).collect(),
            warnings: Vec::new(),
        }
    }
}

fn print_error_line(error: &JsonError) {
    let location = error
        .path
        .as_ref()
        .map(|p| format!(" at {}", p))
        .unwrap_or_default();
    println!(
        "  {} [{}]{}: {}",
        "x".red(),
        error.code,
        location.dimmed(),
        error.message
    );
}

fn print_warning_lines(warnings: &[JsonWarning]) {
    for warning in warnings {
        let location = warning
            .path
            .as_ref()
            .map(|p| format!(" at {}", p))
            .unwrap_or_default();
        println!(
            "  {} [{}]{}: {}",
            "!".yellow(),
            warning.code,
            location.dimmed(),
            warning.message
        );
    }
}

/// Prints validation warnings in human form.
pub(crate) fn print_warnings(warnings: &[ValidationWarning]) {
    print_warning_lines(&warnings_to_json(warnings));
}

/// Reads and parses a JSON payload file.
pub(crate) fn load_payload(path: &Path) -> Result<Value, CommandFailure> {
    let display = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|e| {
        CommandFailure::new(
            JsonError::new(error_codes::FILE_READ, format!("Failed to read payload: {}", e))
                .with_file(&display),
        )
    })?;
    serde_json::from_str(&content).map_err(|e| {
        CommandFailure::new(
            JsonError::new(error_codes::JSON_PARSE, format!("Invalid JSON: {}", e))
                .with_file(&display),
        )
    })
}

/// Prints the measurements table and impulse response statistics.
pub(crate) fn print_payload(data: &HrirData) {
    println!("{} {}", "Channel:".dimmed(), data.channel);

    if data.measurements.is_empty() {
        println!("{}", "No measurements reported".dimmed());
    } else {
        println!("\n{}", "Measurements:".cyan().bold());
        for m in &data.measurements {
            println!("  {} {}", format!("{}:", m.feature).bold(), m.value);
            println!("    {}", m.impact.dimmed());
        }
    }

    let summary = ImpulseSummary::from_data(data);
    println!("\n{}", "Impulse response:".cyan().bold());
    println!(
        "  {} samples @ {} Hz ({:.2} ms)",
        summary.sample_count, summary.sample_rate, summary.duration_ms
    );
    if let (Some(index), Some(time_ms)) = (summary.peak_index, summary.peak_time_ms) {
        println!(
            "  peak {:.4} at sample {} ({:.3} ms)",
            summary.peak_amplitude, index, time_ms
        );
    }
    println!("  rms {:.4}", summary.rms);
    if summary.clipped_samples > 0 {
        println!(
            "  {} {} sample(s) outside [-1, 1] will be clamped",
            "!".yellow(),
            summary.clipped_samples
        );
    }
}

/// Milliseconds since the Unix epoch, used in output file names.
pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Writes a file under `out_dir`, creating the directory if needed.
pub(crate) fn write_output(out_dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;
    let path = out_dir.join(file_name);
    fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use auricle_spec::{ErrorCode, ValidationError};

    #[test]
    fn test_load_payload_errors() {
        let dir = tempfile::tempdir().unwrap();

        let failure = load_payload(&dir.path().join("missing.json")).unwrap_err();
        assert_eq!(failure.errors[0].code, error_codes::FILE_READ);

        let path = dir.path().join("bad.json");
        fs::write(&path, "{").unwrap();
        let failure = load_payload(&path).unwrap_err();
        assert_eq!(failure.errors[0].code, error_codes::JSON_PARSE);
        assert_eq!(failure.errors[0].file.as_deref(), Some(path.display().to_string().as_str()));
    }

    #[test]
    fn test_schema_error_keeps_every_violation() {
        let err = SchemaError::new(vec![
            ValidationError::with_path(ErrorCode::MissingField, "missing", "sampleRate"),
            ValidationError::with_path(ErrorCode::WrongType, "bad", "impulseResponse[0]"),
        ]);
        let failure = CommandFailure::from(err);
        assert_eq!(failure.errors.len(), 2);
        assert_eq!(failure.errors[1].path.as_deref(), Some("impulseResponse[0]"));
    }

    #[test]
    fn test_write_output_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out");
        let path = write_output(&out, "a.wav", b"RIFF").unwrap();
        assert_eq!(fs::read(path).unwrap(), b"RIFF");
    }

    #[test]
    fn test_now_ms_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(now_ms() > 1_577_836_800_000);
    }
}
