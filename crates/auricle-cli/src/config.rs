//! `auricle.yaml` configuration.
//!
//! Every field has a default, so an empty or partial file is valid. Command
//! line flags override values from the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use auricle_backend_wav::{BitDepth, EncodeOptions, Quantization};
use serde::{Deserialize, Serialize};

/// Name looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "auricle.yaml";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AuricleConfig {
    #[serde(default)]
    pub encoder: EncoderConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// 16, 24 or 32.
    #[serde(default = "default_bit_depth")]
    pub bit_depth: u16,
    #[serde(default = "default_channels")]
    pub channels: u16,
    #[serde(default)]
    pub quantization: Quantization,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

fn default_bit_depth() -> u16 {
    16
}
fn default_channels() -> u16 {
    1
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            bit_depth: default_bit_depth(),
            channels: default_channels(),
            quantization: Quantization::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

/// Command line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bit_depth: Option<u16>,
    pub channels: Option<u16>,
    pub quantization: Option<Quantization>,
    pub out_dir: Option<PathBuf>,
}

impl AuricleConfig {
    /// Load config from a YAML file, falling back to defaults for missing fields.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: AuricleConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Resolves the config for a command.
    ///
    /// An explicit path must exist and parse. Without one, `auricle.yaml` in
    /// the working directory is used if present, otherwise defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::load(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Applies command line overrides.
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(bits) = overrides.bit_depth {
            self.encoder.bit_depth = bits;
        }
        if let Some(channels) = overrides.channels {
            self.encoder.channels = channels;
        }
        if let Some(quantization) = overrides.quantization {
            self.encoder.quantization = quantization;
        }
        if let Some(dir) = &overrides.out_dir {
            self.output.dir = dir.clone();
        }
        self
    }

    /// Builds encoder options, rejecting unsupported bit depths.
    pub fn encode_options(&self) -> Result<EncodeOptions> {
        let bit_depth = BitDepth::from_bits(self.encoder.bit_depth)?;
        Ok(EncodeOptions {
            bit_depth,
            channels: self.encoder.channels,
            quantization: self.encoder.quantization,
        })
    }

    /// Save config to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }
}
