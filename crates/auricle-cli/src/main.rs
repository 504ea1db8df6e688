//! Auricle CLI - validate ear-analysis payloads and export HRIR WAV files

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use auricle_backend_wav::Quantization;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;

use auricle_cli::commands::{self, analyze::AnalyzerSource};
use auricle_cli::config::ConfigOverrides;
use auricle_cli::logging;

/// Auricle - HRIR payload validation and WAV export
#[derive(Parser)]
#[command(name = "auricle")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an HRIR payload file
    Validate {
        /// Path to the payload JSON file
        #[arg(short, long)]
        payload: PathBuf,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Validate a payload and write it as a WAV file
    Encode {
        /// Path to the payload JSON file
        #[arg(short, long)]
        payload: PathBuf,

        #[command(flatten)]
        encoder: EncoderFlags,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Print the header and PCM hash of a WAV file
    Inspect {
        /// Path to the WAV file
        #[arg(short, long)]
        input: PathBuf,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Analyze an ear photo and export the resulting HRIR
    Analyze {
        /// Path to the ear photo (PNG, JPEG, WebP or GIF, at most 5 MiB)
        #[arg(long)]
        image: PathBuf,

        /// Use a payload file instead of calling an analyzer
        #[arg(long, conflicts_with = "command", required_unless_present = "command")]
        fixture: Option<PathBuf>,

        /// Analyzer program; receives the image on stdin, prints the payload
        #[arg(long)]
        command: Option<String>,

        /// Extra argument passed to the analyzer program (repeatable)
        #[arg(long = "arg", requires = "command", allow_hyphen_values = true)]
        command_args: Vec<String>,

        /// Analyzer time limit in seconds
        #[arg(long, requires = "command")]
        timeout: Option<u64>,

        #[command(flatten)]
        encoder: EncoderFlags,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },
}

/// Encoder and output flags shared by `encode` and `analyze`.
#[derive(Args)]
struct EncoderFlags {
    /// Output directory (default: from config, else current directory)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Bits per sample: 16, 24 or 32
    #[arg(long)]
    bit_depth: Option<u16>,

    /// Number of channels; each sample is written to every channel
    #[arg(long)]
    channels: Option<u16>,

    /// Float to integer mapping
    #[arg(long, value_enum)]
    quantization: Option<QuantizationArg>,

    /// Path to a YAML config file (default: ./auricle.yaml if present)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum QuantizationArg {
    FullScale,
    Symmetric,
}

impl From<QuantizationArg> for Quantization {
    fn from(arg: QuantizationArg) -> Self {
        match arg {
            QuantizationArg::FullScale => Quantization::FullScale,
            QuantizationArg::Symmetric => Quantization::Symmetric,
        }
    }
}

impl EncoderFlags {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            bit_depth: self.bit_depth,
            channels: self.channels,
            quantization: self.quantization.map(Into::into),
            out_dir: self.out_dir.clone(),
        }
    }
}

fn dispatch(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Validate { payload, json } => commands::validate::run(&payload, json),
        Commands::Encode {
            payload,
            encoder,
            json,
        } => commands::encode::run(
            &commands::encode::EncodeArgs {
                payload,
                config: encoder.config.clone(),
                overrides: encoder.overrides(),
            },
            json,
        ),
        Commands::Inspect { input, json } => commands::inspect::run(&input, json),
        Commands::Analyze {
            image,
            fixture,
            command,
            command_args,
            timeout,
            encoder,
            json,
        } => {
            let source = match (fixture, command) {
                (Some(path), _) => AnalyzerSource::Fixture(path),
                (None, Some(program)) => AnalyzerSource::Command {
                    program,
                    args: command_args,
                    timeout: timeout.map(Duration::from_secs),
                },
                (None, None) => anyhow::bail!("either --fixture or --command is required"),
            };
            commands::analyze::run(
                &commands::analyze::AnalyzeArgs {
                    image,
                    source,
                    config: encoder.config.clone(),
                    overrides: encoder.overrides(),
                },
                json,
            )
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match dispatch(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::from(1)
        }
    }
}
