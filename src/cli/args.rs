//! Command line arguments.
//!
//! Positional arguments are collected loosely and counted by hand so that
//! any count other than three produces the usage text and exit code 1.

use crate::config::{Stage, ValidationMode, ValidatorConfig};
use crate::InfraError;
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

pub const USAGE: &str = "validate-infrastructure [OPTIONS] <STAGE> <REGION> <ACCOUNT_ID>";
pub const USAGE_EXAMPLE: &str = "validate-infrastructure dev us-west-2 123456789012";

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable terminal output
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
    /// JUnit XML for CI/CD integration
    Junit,
}

/// Parsed command line arguments
#[derive(Debug, Clone, Parser)]
#[command(
    name = "validate-infrastructure",
    about = "Validate the deployed Glue ingestion pipeline infrastructure",
    override_usage = USAGE,
    disable_version_flag = true,
    after_help = "EXIT CODES:\n    0   All checks passed\n    1   One or more checks failed, or invalid usage\n    3   Runtime error"
)]
pub struct Args {
    /// Stage (dev or prod), AWS region and 12-digit account id
    #[arg(value_name = "STAGE REGION ACCOUNT_ID", num_args = 0..)]
    pub targets: Vec<String>,

    /// Which checks to run
    #[arg(long, value_enum, default_value_t = ValidationMode::Deep, env = "INFRA_VALIDATOR_MODE")]
    pub mode: ValidationMode,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, env = "INFRA_VALIDATOR_FORMAT")]
    pub format: OutputFormat,

    /// Only output failures and warnings
    #[arg(short, long)]
    pub quiet: bool,

    /// Include details and timings for every check
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", value_parser = clap::builder::FalseyValueParser::new())]
    pub no_color: bool,

    /// Run only this check (repeatable)
    #[arg(long, value_name = "ID")]
    pub only: Vec<String>,

    /// Skip this check (repeatable)
    #[arg(long, value_name = "ID")]
    pub skip: Vec<String>,

    /// Stop on first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Per-check timeout in seconds
    #[arg(long = "timeout", value_name = "SECS", default_value_t = 120)]
    pub timeout_secs: u64,

    /// How long the trigger test waits for log evidence, in seconds
    #[arg(long = "trigger-timeout", value_name = "SECS")]
    pub trigger_timeout_secs: Option<u64>,

    /// Delay between trigger log scans, in seconds
    #[arg(long = "poll-interval", value_name = "SECS")]
    pub poll_interval_secs: Option<u64>,

    /// Load overrides from a TOML file
    #[arg(long, value_name = "FILE", env = "INFRA_VALIDATOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Print version information
    #[arg(short = 'V', long = "version", action = ArgAction::SetTrue)]
    pub version: bool,
}

/// Stage, region and account id taken from the positionals.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub stage: Stage,
    pub region: String,
    pub account_id: String,
}

impl Args {
    /// Validate the positional arguments.
    pub fn target(&self) -> Result<Target, InfraError> {
        match self.targets.as_slice() {
            [stage, region, account_id] => Ok(Target {
                stage: stage.parse()?,
                region: region.clone(),
                account_id: account_id.clone(),
            }),
            other => Err(InfraError::Usage(format!(
                "Expected 3 arguments (stage, region, account id), got {}",
                other.len()
            ))),
        }
    }

    /// Build the validator configuration: derived names, then the config
    /// file, then explicit flags.
    pub fn validator_config(&self) -> Result<ValidatorConfig, InfraError> {
        let target = self.target()?;
        let mut config = ValidatorConfig::new(target.stage, &target.region, &target.account_id)?
            .with_mode(self.mode);

        if let Some(ref path) = self.config {
            config.apply_file(crate::config::FileConfig::load(path)?)?;
        }

        if let Some(secs) = self.trigger_timeout_secs {
            config.trigger.timeout = std::time::Duration::from_secs(secs);
        }
        if let Some(secs) = self.poll_interval_secs {
            if secs == 0 {
                return Err(InfraError::Usage(
                    "--poll-interval must be greater than zero".to_string(),
                ));
            }
            config.trigger.poll_interval = std::time::Duration::from_secs(secs);
        }

        Ok(config)
    }
}
