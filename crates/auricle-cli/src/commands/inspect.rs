//! Inspect command implementation
//!
//! Prints the header fields and PCM hash of a WAV file.

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use auricle_backend_wav::wav::{compute_pcm_hash, read_wav_info};
use auricle_backend_wav::WavInfo;
use colored::Colorize;

use super::json_output::{error_codes, print_json, InspectOutput, JsonError};
use super::reporting::CommandFailure;

/// Run the inspect command
///
/// # Returns
/// Exit code: 0 if the file is a readable PCM WAV, 1 otherwise
pub fn run(input: &Path, json_output: bool) -> Result<ExitCode> {
    match inspect_file(input) {
        Ok((info, pcm_hash)) => {
            if json_output {
                print_json(&InspectOutput {
                    success: true,
                    errors: Vec::new(),
                    duration_seconds: Some(info.duration_seconds()),
                    info: Some(info),
                    pcm_hash,
                })?;
            } else {
                print_info(input, &info, pcm_hash.as_deref());
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            failure.report(json_output)?;
            Ok(ExitCode::from(1))
        }
    }
}

fn inspect_file(input: &Path) -> Result<(WavInfo, Option<String>), CommandFailure> {
    let file = input.display().to_string();
    let bytes = fs::read(input).map_err(|e| {
        CommandFailure::new(
            JsonError::new(error_codes::FILE_READ, format!("Failed to read file: {}", e))
                .with_file(&file),
        )
    })?;
    let info = read_wav_info(&bytes)
        .map_err(|e| CommandFailure::new(JsonError::from_backend(&e).with_file(&file)))?;
    Ok((info, compute_pcm_hash(&bytes)))
}

fn print_info(input: &Path, info: &WavInfo, pcm_hash: Option<&str>) {
    println!("{} {}", "File:".cyan().bold(), input.display());
    let format = if info.audio_format == 1 {
        "PCM".to_string()
    } else {
        format!("format {}", info.audio_format)
    };
    println!("  {:<14} {}", "Format:", format);
    println!("  {:<14} {}", "Channels:", info.channels);
    println!("  {:<14} {} Hz", "Sample rate:", info.sample_rate);
    println!("  {:<14} {}", "Bits/sample:", info.bits_per_sample);
    println!("  {:<14} {}", "Block align:", info.block_align);
    println!("  {:<14} {}", "Byte rate:", info.byte_rate);
    println!(
        "  {:<14} {} ({:.4} s)",
        "Frames:",
        info.num_frames,
        info.duration_seconds()
    );
    println!("  {:<14} {} bytes", "Data size:", info.data_size);
    if let Some(hash) = pcm_hash {
        println!("  {:<14} {}", "PCM hash:", hash.dimmed());
    }
}
