//! CLI parsing and command execution
//!
//! This module handles command-line argument parsing and routes commands to the appropriate handlers.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tokio::time::Instant;
use tracing::{info, warn};

use secret_rotation::generator::{Generator, SecretGenerator};
use secret_rotation::handler;
use secret_rotation::models::GeneratorOptions;
use secret_rotation::store::{AwsSecretsStore, FileStore, Store, StoreType};
use secret_rotation::{validator, Config, Rotator};

#[derive(Parser)]
#[command(name = "rotate-secret")]
#[command(about = "Rotate plaintext and key-value secrets in AWS Secrets Manager", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "ROTATION_CONFIG")]
    pub config: Option<PathBuf>,

    /// Secret store to use (aws or file)
    #[arg(long, env = "ROTATION_BACKEND")]
    pub backend: Option<StoreType>,

    /// AWS region (overrides config file)
    #[arg(long)]
    pub region: Option<String>,

    /// Custom Secrets Manager endpoint (overrides config file)
    #[arg(long)]
    pub endpoint_url: Option<String>,

    /// Directory of the file store (overrides config file)
    #[arg(long)]
    pub file_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a sample configuration file
    Init {
        /// Output path for the configuration file
        #[arg(short, long, default_value = "rotation-config.toml")]
        output: PathBuf,
    },

    /// Rotate the secret described by a JSON rotation request
    Rotate {
        /// Path to the request file, or - for stdin
        #[arg(default_value = "-")]
        request: String,

        /// Seconds allowed for store calls (overrides config file, 0 disables)
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Check a rotation request without contacting the store
    Validate {
        /// Path to the request file, or - for stdin
        #[arg(default_value = "-")]
        request: String,
    },

    /// Generate a random secret and print it
    Generate(GenerateArgs),
}

/// Character classes default to all four when none is selected
#[derive(Args)]
pub struct GenerateArgs {
    /// Length of the generated secret
    #[arg(short, long, default_value = "32")]
    length: usize,

    /// Include lowercase letters
    #[arg(long)]
    lowercase: bool,

    /// Include uppercase letters
    #[arg(long)]
    uppercase: bool,

    /// Include digits
    #[arg(long)]
    digits: bool,

    /// Include special characters
    #[arg(long)]
    special: bool,

    /// Leave out 0, O, l and 1
    #[arg(long)]
    exclude_ambiguous: bool,

    /// Minimum number of digits
    #[arg(long)]
    min_digits: Option<usize>,

    /// Minimum number of special characters
    #[arg(long)]
    min_special: Option<usize>,
}

impl GenerateArgs {
    fn to_options(&self) -> GeneratorOptions {
        let any_class = self.lowercase || self.uppercase || self.digits || self.special;
        GeneratorOptions {
            length: self.length,
            include_lowercase: self.lowercase || !any_class,
            include_uppercase: self.uppercase || !any_class,
            include_digits: self.digits || !any_class,
            include_special_chars: self.special || !any_class,
            exclude_ambiguous: self.exclude_ambiguous,
            min_number_digits: self.min_digits,
            min_number_special: self.min_special,
        }
    }
}

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Init { output } => {
            Config::create_sample(output)
                .with_context(|| format!("Failed to create sample config at {:?}", output))?;
            info!("Sample configuration created at {:?}", output);
            return Ok(());
        }
        Commands::Validate { request } => {
            let payload = read_payload(request).await?;
            let request = handler::parse_request(&payload)?;
            let secret_type = validator::validate(&request).context("Request is invalid")?;
            println!(
                "Request is valid ({} secret {})",
                secret_type, request.secret_arn
            );
            return Ok(());
        }
        Commands::Generate(args) => {
            let secret = SecretGenerator::new()
                .generate(&args.to_options())
                .context("Failed to generate secret")?;
            eprintln!("WARNING: Secret value will be displayed. Ensure this output is secured.");
            println!("{}", secret);
            return Ok(());
        }
        Commands::Rotate { .. } => {}
    }

    let config = load_config(&cli)?;

    // Store and generator are built once and passed to the rotator
    let store = create_store(&config).await?;
    let generator = SecretGenerator::new();
    let rotator = Rotator::new(store.as_ref(), &generator);

    if let Commands::Rotate { request, timeout } = &cli.command {
        let payload = read_payload(request).await?;
        let timeout = match timeout {
            Some(0) => None,
            Some(secs) => Some(std::time::Duration::from_secs(*secs)),
            None => config.rotation.timeout(),
        };
        let deadline = timeout.map(|t| Instant::now() + t);

        let outcome = tokio::select! {
            outcome = handler::handle_request(&rotator, &payload, deadline) => outcome,
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted, abandoning rotation");
                anyhow::bail!("Rotation interrupted before completion");
            }
        };

        match outcome {
            Ok(response) => {
                println!("{}", serde_json::to_string_pretty(&response)?);
            }
            Err(failure) => {
                println!("{}", serde_json::to_string_pretty(&failure.response)?);
                return Err(failure.into());
            }
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?
    } else {
        Config::from_env().context("Failed to load config from environment")?
    };

    // Override with CLI arguments if provided
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(region) = &cli.region {
        config.aws.region = Some(region.clone());
    }
    if let Some(url) = &cli.endpoint_url {
        config.aws.endpoint_url = Some(url.clone());
    }
    if let Some(dir) = &cli.file_dir {
        config.file = Some(secret_rotation::config::FileConfig {
            directory: dir.clone(),
        });
    }

    Ok(config)
}

/// Create a store instance based on configuration
async fn create_store(config: &Config) -> Result<Store> {
    match config.backend {
        StoreType::Aws => {
            let store =
                AwsSecretsStore::new(config.aws.region.clone(), config.aws.endpoint_url.clone())
                    .await
                    .context("Failed to create AWS Secrets Manager store")?;
            Ok(Box::new(store))
        }
        StoreType::File => {
            let file_config = config.file.as_ref().ok_or_else(|| {
                anyhow::anyhow!(
                    "File store configuration not found. Set ROTATION_FILE_DIR or configure [file] section"
                )
            })?;
            let store = FileStore::new(&file_config.directory)
                .context("Failed to create file store")?;
            Ok(Box::new(store))
        }
    }
}

async fn read_payload(source: &str) -> Result<String> {
    if source == "-" {
        let mut payload = String::new();
        tokio::io::stdin()
            .read_to_string(&mut payload)
            .await
            .context("Failed to read request from stdin")?;
        Ok(payload)
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("Failed to read request file {}", source))
    }
}
