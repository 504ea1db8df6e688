//! Analyze command implementation
//!
//! Runs one full session: load the ear photo, hand it to an analyzer,
//! validate the returned payload, encode it and write the WAV file.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use auricle_backend_wav::EncodeOptions;
use auricle_spec::ValidatedPayload;
use colored::Colorize;
use tracing::info;

use super::encode::{encode_options, print_encoded, resolve_config, Encoded};
use super::json_output::{error_codes, JsonError, WavOutputInfo};
use super::reporting::{self, CommandFailure};
use crate::analyzer::{Analyzer, CommandAnalyzer, FixtureAnalyzer};
use crate::config::{AuricleConfig, ConfigOverrides};
use crate::session::{Session, SessionError, SessionState};
use crate::upload::UploadedImage;

/// Where the payload comes from.
#[derive(Debug, Clone)]
pub enum AnalyzerSource {
    /// A payload file returned as-is.
    Fixture(PathBuf),
    /// An external program speaking the stdin/stdout protocol.
    Command {
        program: String,
        args: Vec<String>,
        timeout: Option<Duration>,
    },
}

impl AnalyzerSource {
    fn build(&self) -> Box<dyn Analyzer> {
        match self {
            AnalyzerSource::Fixture(path) => Box::new(FixtureAnalyzer::new(path)),
            AnalyzerSource::Command {
                program,
                args,
                timeout,
            } => {
                let mut analyzer = CommandAnalyzer::new(program).with_args(args.iter().cloned());
                if let Some(timeout) = timeout {
                    analyzer = analyzer.with_timeout(*timeout);
                }
                Box::new(analyzer)
            }
        }
    }
}

/// Arguments for the analyze command.
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    pub image: PathBuf,
    pub source: AnalyzerSource,
    pub config: Option<PathBuf>,
    pub overrides: ConfigOverrides,
}

/// Run the analyze command
///
/// # Returns
/// Exit code: 0 if a WAV file was written, 1 otherwise
pub fn run(args: &AnalyzeArgs, json_output: bool) -> Result<ExitCode> {
    if !json_output {
        println!("{} {}", "Analyzing:".cyan().bold(), args.image.display());
    }

    let analyzer = args.source.build();
    match run_session(args, analyzer.as_ref(), reporting::now_ms()) {
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

fn session_failure(error: SessionError) -> CommandFailure {
    match error {
        SessionError::Schema(schema) => schema.into(),
        other => CommandFailure::new(JsonError::from_backend(&other)),
    }
}

/// Drives a [`Session`] from upload to written file. The session is reset
/// before returning on every path.
pub(crate) fn run_session(
    args: &AnalyzeArgs,
    analyzer: &dyn Analyzer,
    timestamp_ms: i64,
) -> Result<Encoded, CommandFailure> {
    let config = resolve_config(args.config.as_deref(), &args.overrides)?;
    let options = encode_options(&config)?;
    let image = UploadedImage::from_path(&args.image).map_err(|e| {
        CommandFailure::new(JsonError::from_backend(&e).with_file(args.image.display().to_string()))
    })?;

    let mut session = Session::new();
    let outcome = drive(&mut session, image, analyzer, timestamp_ms, &options, &config);
    session.reset();
    outcome
}

fn drive(
    session: &mut Session,
    image: UploadedImage,
    analyzer: &dyn Analyzer,
    timestamp_ms: i64,
    options: &EncodeOptions,
    config: &AuricleConfig,
) -> Result<Encoded, CommandFailure> {
    let ticket = session.analyze_with(image, analyzer).map_err(session_failure)?;
    info!(%ticket, "payload accepted");

    let validated = match session.state() {
        SessionState::Complete { data, warnings } => ValidatedPayload {
            data: data.clone(),
            warnings: warnings.clone(),
        },
        other => {
            return Err(session_failure(SessionError::InvalidTransition {
                action: "report",
                state: other.name(),
            }))
        }
    };

    let download = session
        .download(timestamp_ms, options)
        .map_err(|e| session_failure(e).with_warnings(&validated.warnings))?;

    let path = reporting::write_output(
        &config.output.dir,
        &download.file_name,
        &download.wav.wav_data,
    )
    .map_err(|e| {
        CommandFailure::new(JsonError::new(error_codes::FILE_WRITE, format!("{:#}", e)))
            .with_warnings(&validated.warnings)
    })?;

    Ok(Encoded {
        output: WavOutputInfo::new(
            path.display().to_string(),
            &download.wav,
            options.quantization.as_str(),
        ),
        validated,
    })
}
