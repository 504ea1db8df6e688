//! Validate command implementation
//!
//! Checks a payload file against the HRIR data contract without encoding.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use auricle_spec::{validate_payload, ValidatedPayload};
use colored::Colorize;
use tracing::debug;

use super::json_output::{print_json, warnings_to_json, PayloadInfo, ValidateOutput};
use super::reporting::{self, CommandFailure};

/// Run the validate command
///
/// # Arguments
/// * `payload_path` - Path to the payload JSON file
/// * `json_output` - Whether to output machine-readable JSON diagnostics
///
/// # Returns
/// Exit code: 0 if valid, 1 if invalid
pub fn run(payload_path: &Path, json_output: bool) -> Result<ExitCode> {
    if !json_output {
        println!("{} {}", "Validating:".cyan().bold(), payload_path.display());
    }

    match validate_file(payload_path) {
        Ok(validated) => {
            if json_output {
                print_json(&ValidateOutput {
                    success: true,
                    errors: Vec::new(),
                    warnings: warnings_to_json(&validated.warnings),
                    result: Some(PayloadInfo::from_data(&validated.data)),
                })?;
            } else {
                reporting::print_warnings(&validated.warnings);
                reporting::print_payload(&validated.data);
                println!("\n{} Payload is valid", "SUCCESS".green().bold());
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            failure.report(json_output)?;
            Ok(ExitCode::from(1))
        }
    }
}

pub(crate) fn validate_file(payload_path: &Path) -> Result<ValidatedPayload, CommandFailure> {
    let value = reporting::load_payload(payload_path)?;
    let validated = validate_payload(&value)?;
    debug!(
        samples = validated.data.sample_count(),
        warnings = validated.warnings.len(),
        "payload valid"
    );
    Ok(validated)
}
