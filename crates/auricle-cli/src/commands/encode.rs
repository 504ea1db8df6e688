//! Encode command implementation
//!
//! Validates a payload and writes it as a WAV file under its suggested name.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use auricle_backend_wav::{encode_hrir, EncodeOptions};
use auricle_spec::{suggested_wav_name, ValidatedPayload};
use colored::Colorize;
use tracing::info;

use super::json_output::{
    error_codes, print_json, warnings_to_json, EncodeOutput, JsonError, PayloadInfo, WavOutputInfo,
};
use super::reporting::{self, CommandFailure};
use super::validate::validate_file;
use crate::config::{AuricleConfig, ConfigOverrides};

/// Arguments for the encode command.
#[derive(Debug, Clone, Default)]
pub struct EncodeArgs {
    pub payload: PathBuf,
    pub config: Option<PathBuf>,
    pub overrides: ConfigOverrides,
}

/// Result of encoding one payload to disk.
#[derive(Debug)]
pub(crate) struct Encoded {
    pub validated: ValidatedPayload,
    pub output: WavOutputInfo,
}

/// Run the encode command
///
/// # Returns
/// Exit code: 0 if the file was written, 1 otherwise
pub fn run(args: &EncodeArgs, json_output: bool) -> Result<ExitCode> {
    if !json_output {
        println!("{} {}", "Encoding:".cyan().bold(), args.payload.display());
    }

    let outcome = resolve_config(args.config.as_deref(), &args.overrides).and_then(|config| {
        let validated = validate_file(&args.payload)?;
        encode_to_dir(validated, &config, reporting::now_ms())
    });

    match outcome {
        Ok(encoded) => {
            print_encoded(&encoded, json_output)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            failure.report(json_output)?;
            Ok(ExitCode::from(1))
        }
    }
}

/// Loads the config file and applies command line overrides.
pub(crate) fn resolve_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<AuricleConfig, CommandFailure> {
    AuricleConfig::resolve(path)
        .map(|config| config.with_overrides(overrides))
        .map_err(|e| {
            CommandFailure::new(JsonError::new(error_codes::INVALID_CONFIG, format!("{:#}", e)))
        })
}

pub(crate) fn encode_options(config: &AuricleConfig) -> Result<EncodeOptions, CommandFailure> {
    config.encode_options().map_err(|e| {
        CommandFailure::new(JsonError::new(error_codes::INVALID_CONFIG, format!("{:#}", e)))
    })
}

/// Encodes a validated payload and writes it into the configured directory.
pub(crate) fn encode_to_dir(
    validated: ValidatedPayload,
    config: &AuricleConfig,
    timestamp_ms: i64,
) -> Result<Encoded, CommandFailure> {
    let options = encode_options(config)?;
    let wav = encode_hrir(&validated.data, &options).map_err(|e| {
        CommandFailure::new(JsonError::from_backend(&e)).with_warnings(&validated.warnings)
    })?;

    let file_name = suggested_wav_name(validated.data.channel, timestamp_ms);
    let path = reporting::write_output(&config.output.dir, &file_name, &wav.wav_data).map_err(
        |e| {
            CommandFailure::new(JsonError::new(error_codes::FILE_WRITE, format!("{:#}", e)))
                .with_warnings(&validated.warnings)
        },
    )?;
    info!(path = %path.display(), pcm_hash = %wav.pcm_hash, "wrote WAV");

    Ok(Encoded {
        output: WavOutputInfo::new(
            path.display().to_string(),
            &wav,
            options.quantization.as_str(),
        ),
        validated,
    })
}

pub(crate) fn print_encoded(encoded: &Encoded, json_output: bool) -> Result<()> {
    if json_output {
        return print_json(&EncodeOutput {
            success: true,
            errors: Vec::new(),
            warnings: warnings_to_json(&encoded.validated.warnings),
            payload: Some(PayloadInfo::from_data(&encoded.validated.data)),
            output: Some(encoded.output.clone()),
        });
    }

    let output = &encoded.output;
    reporting::print_warnings(&encoded.validated.warnings);
    reporting::print_payload(&encoded.validated.data);
    println!(
        "\n{} {} ({} ch, {} Hz, {}-bit {}, {} bytes)",
        "Wrote".green().bold(),
        output.path,
        output.channels,
        output.sample_rate,
        output.bits_per_sample,
        output.quantization,
        output.bytes
    );
    println!("{} {}", "PCM hash:".dimmed(), output.pcm_hash);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use auricle_backend_wav::wav::decode_samples;
    use pretty_assertions::assert_eq;
    use std::fs;

    const PAYLOAD: &str = r#"{
        "measurements": [{"feature": "Helix", "value": "Wide", "impact": "Lower notch"}],
        "impulseResponse": [0.0, 0.5, -0.5, 1.0, -1.0],
        "sampleRate": 44100
    }"#;

    #[test]
    fn test_encode_to_dir_uses_suggested_name() {
        let dir = tempfile::tempdir().unwrap();
        let payload = dir.path().join("payload.json");
        fs::write(&payload, PAYLOAD).unwrap();

        let mut config = AuricleConfig::default();
        config.output.dir = dir.path().join("out");

        let validated = validate_file(&payload).unwrap();
        let encoded = encode_to_dir(validated, &config, 42).unwrap();

        let expected = dir.path().join("out").join("custom_hrir_right_42.wav");
        assert_eq!(encoded.output.path, expected.display().to_string());
        let bytes = fs::read(&expected).unwrap();
        assert_eq!(
            decode_samples(&bytes).unwrap(),
            vec![0, 16383, -16384, 32767, -32768]
        );
        assert_eq!(encoded.output.quantization, "full-scale");
    }

    #[test]
    fn test_bad_bit_depth_is_a_config_error() {
        let overrides = ConfigOverrides {
            bit_depth: Some(20),
            ..Default::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("auricle.yaml");
        fs::write(&config_path, "output:\n  dir: out\n").unwrap();

        let config = resolve_config(Some(&config_path), &overrides).unwrap();
        let failure = encode_options(&config).unwrap_err();
        assert_eq!(failure.errors[0].code, error_codes::INVALID_CONFIG);
        assert!(failure.errors[0].message.contains("20"));
    }

    #[test]
    fn test_run_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let payload = dir.path().join("payload.json");
        fs::write(&payload, PAYLOAD).unwrap();

        let args = EncodeArgs {
            payload,
            config: None,
            overrides: ConfigOverrides {
                channels: Some(2),
                out_dir: Some(dir.path().join("wav")),
                ..Default::default()
            },
        };
        assert_eq!(run(&args, true).unwrap(), ExitCode::SUCCESS);

        let written: Vec<_> = fs::read_dir(dir.path().join("wav")).unwrap().collect();
        assert_eq!(written.len(), 1);
    }
}
