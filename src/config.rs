use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::store::StoreType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_backend")]
    pub backend: StoreType,
    #[serde(default)]
    pub aws: AwsConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileConfig>,
    #[serde(default)]
    pub rotation: RotationConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AwsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Upper bound on the store calls of one rotation; 0 disables it
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_backend() -> StoreType {
    StoreType::Aws
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RotationConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            aws: AwsConfig::default(),
            file: None,
            rotation: RotationConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let backend = match std::env::var("ROTATION_BACKEND") {
            Ok(value) => value
                .parse()
                .map_err(anyhow::Error::msg)
                .context("Invalid ROTATION_BACKEND")?,
            Err(_) => default_backend(),
        };

        let aws = AwsConfig {
            region: std::env::var("AWS_REGION").ok(),
            endpoint_url: std::env::var("AWS_ENDPOINT_URL").ok(),
        };

        let file = std::env::var("ROTATION_FILE_DIR")
            .ok()
            .map(|dir| FileConfig {
                directory: PathBuf::from(dir),
            });

        let rotation = RotationConfig {
            timeout_secs: match std::env::var("ROTATION_TIMEOUT_SECS") {
                Ok(value) => value
                    .parse()
                    .with_context(|| format!("Invalid ROTATION_TIMEOUT_SECS: {}", value))?,
                Err(_) => default_timeout_secs(),
            },
        };

        Ok(Self {
            backend,
            aws,
            file,
            rotation,
        })
    }

    /// Create a sample configuration file
    pub fn create_sample<P: AsRef<Path>>(path: P) -> Result<()> {
        let sample = Self {
            backend: StoreType::Aws,
            aws: AwsConfig {
                region: Some("us-east-1".to_string()),
                endpoint_url: None,
            },
            file: Some(FileConfig {
                directory: PathBuf::from("./secrets"),
            }),
            rotation: RotationConfig::default(),
        };

        let toml_string =
            toml::to_string_pretty(&sample).context("Failed to serialize sample config")?;
        fs::write(path.as_ref(), toml_string)
            .with_context(|| format!("Failed to write sample config to {:?}", path.as_ref()))?;

        Ok(())
    }
}
