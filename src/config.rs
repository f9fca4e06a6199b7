//! Validator configuration.
//!
//! Resource names are derived from the stage and account id the same way the
//! CDK stacks name them. A TOML file may override any derived value.

use crate::InfraError;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Dev,
    Prod,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Dev => "dev",
            Stage::Prod => "prod",
        }
    }

    /// Name of the CDK stage construct wrapping the infrastructure stack.
    fn construct_prefix(&self) -> &'static str {
        match self {
            Stage::Dev => "DevStage",
            Stage::Prod => "ProdStage",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = InfraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dev" => Ok(Stage::Dev),
            "prod" => Ok(Stage::Prod),
            _ => Err(InfraError::Usage(format!(
                "Unknown stage: '{}'. Valid stages: dev, prod",
                s
            ))),
        }
    }
}

/// Which family of checks to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ValidationMode {
    /// Buckets, exports, Glue database and the end-to-end trigger test
    #[default]
    Deep,
    /// Stack status, resource types and output exports
    Shallow,
    /// Deep checks followed by shallow checks
    Full,
}

impl ValidationMode {
    pub fn includes_deep(&self) -> bool {
        matches!(self, ValidationMode::Deep | ValidationMode::Full)
    }

    pub fn includes_shallow(&self) -> bool {
        matches!(self, ValidationMode::Shallow | ValidationMode::Full)
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationMode::Deep => write!(f, "deep"),
            ValidationMode::Shallow => write!(f, "shallow"),
            ValidationMode::Full => write!(f, "full"),
        }
    }
}

/// Names of the resources the validator expects to find.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceNames {
    pub input_bucket: String,
    pub output_bucket: String,
    pub assets_bucket: String,
    pub glue_database: String,
    /// Export carrying the trigger function's name
    pub trigger_export: String,
    pub expected_exports: Vec<String>,
    pub stack_name: String,
    pub expected_resource_types: Vec<String>,
}

impl ResourceNames {
    pub fn derive(stage: Stage, account_id: &str) -> Self {
        let s = stage.as_str();
        ResourceNames {
            input_bucket: format!("glue-input-{}-{}", s, account_id),
            output_bucket: format!("glue-output-{}-{}", s, account_id),
            assets_bucket: format!("glue-assets-{}-{}", s, account_id),
            glue_database: format!("glue_database_{}", s),
            trigger_export: format!("TriggerLambda-{}", s),
            expected_exports: [
                "InputBucket",
                "OutputBucket",
                "AssetsBucket",
                "GlueDatabase",
                "GlueJobRole",
                "TriggerLambda",
            ]
            .iter()
            .map(|prefix| format!("{}-{}", prefix, s))
            .collect(),
            stack_name: format!("{}-Infrastructure", stage.construct_prefix()),
            expected_resource_types: [
                "AWS::S3::Bucket",
                "AWS::Glue::Database",
                "AWS::IAM::Role",
                "AWS::Lambda::Function",
            ]
            .iter()
            .map(|t| t.to_string())
            .collect(),
        }
    }
}

/// Longest look-back accepted for trigger log events.
pub const MAX_LOG_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Polling behaviour of the trigger test.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerSettings {
    /// Delay between log scans
    pub poll_interval: Duration,
    /// Give up once this much time has passed since the upload
    pub timeout: Duration,
    /// How far back each scan reads log events
    pub log_window: Duration,
    /// Most recently active log streams scanned per attempt
    pub log_stream_limit: i32,
}

impl Default for TriggerSettings {
    fn default() -> Self {
        TriggerSettings {
            poll_interval: Duration::from_secs(5),
            timeout: Duration::from_secs(60),
            log_window: Duration::from_secs(300),
            log_stream_limit: 5,
        }
    }
}

/// Everything the validator needs to know about its target.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    pub stage: Stage,
    pub region: String,
    pub account_id: String,
    pub mode: ValidationMode,
    pub names: ResourceNames,
    pub trigger: TriggerSettings,
}

impl ValidatorConfig {
    pub fn new(stage: Stage, region: &str, account_id: &str) -> Result<Self, InfraError> {
        if region.trim().is_empty() {
            return Err(InfraError::Usage("Region must not be empty".to_string()));
        }
        validate_account_id(account_id)?;

        Ok(ValidatorConfig {
            stage,
            region: region.to_string(),
            account_id: account_id.to_string(),
            mode: ValidationMode::default(),
            names: ResourceNames::derive(stage, account_id),
            trigger: TriggerSettings::default(),
        })
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Layer values from a config file over the derived defaults.
    pub fn apply_file(&mut self, file: FileConfig) -> Result<(), InfraError> {
        if let Some(stack_name) = file.stack_name {
            self.names.stack_name = stack_name;
        }

        if let Some(names) = file.names {
            if let Some(v) = names.input_bucket {
                self.names.input_bucket = v;
            }
            if let Some(v) = names.output_bucket {
                self.names.output_bucket = v;
            }
            if let Some(v) = names.assets_bucket {
                self.names.assets_bucket = v;
            }
            if let Some(v) = names.glue_database {
                self.names.glue_database = v;
            }
            if let Some(v) = names.trigger_export {
                self.names.trigger_export = v;
            }
        }

        if let Some(exports) = file.expected_exports {
            self.names.expected_exports = exports;
        }
        if let Some(types) = file.expected_resource_types {
            self.names.expected_resource_types = types;
        }

        if let Some(trigger) = file.trigger {
            if let Some(secs) = trigger.poll_interval_secs {
                self.trigger.poll_interval = Duration::from_secs(secs);
            }
            if let Some(secs) = trigger.timeout_secs {
                self.trigger.timeout = Duration::from_secs(secs);
            }
            if let Some(secs) = trigger.log_window_secs {
                self.trigger.log_window = Duration::from_secs(secs);
            }
            if let Some(limit) = trigger.log_stream_limit {
                self.trigger.log_stream_limit = limit;
            }
        }

        self.check_trigger_settings()
    }

    fn check_trigger_settings(&self) -> Result<(), InfraError> {
        if self.trigger.poll_interval.is_zero() {
            return Err(InfraError::Config(
                "trigger poll interval must be greater than zero".to_string(),
            ));
        }
        if self.trigger.log_window.is_zero() || self.trigger.log_window > MAX_LOG_WINDOW {
            return Err(InfraError::Config(format!(
                "log_window_secs must be between 1 and {}, got {}",
                MAX_LOG_WINDOW.as_secs(),
                self.trigger.log_window.as_secs()
            )));
        }
        if !(1..=50).contains(&self.trigger.log_stream_limit) {
            return Err(InfraError::Config(format!(
                "log_stream_limit must be between 1 and 50, got {}",
                self.trigger.log_stream_limit
            )));
        }
        Ok(())
    }
}

fn validate_account_id(account_id: &str) -> Result<(), InfraError> {
    if account_id.len() == 12 && account_id.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(InfraError::Usage(format!(
            "Invalid account id: '{}'. Expected 12 digits",
            account_id
        )))
    }
}

/// Optional overrides read from a TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub stack_name: Option<String>,
    pub names: Option<NameOverrides>,
    pub expected_exports: Option<Vec<String>>,
    pub expected_resource_types: Option<Vec<String>>,
    pub trigger: Option<TriggerOverrides>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NameOverrides {
    pub input_bucket: Option<String>,
    pub output_bucket: Option<String>,
    pub assets_bucket: Option<String>,
    pub glue_database: Option<String>,
    pub trigger_export: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerOverrides {
    pub poll_interval_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub log_window_secs: Option<u64>,
    pub log_stream_limit: Option<i32>,
}

impl FileConfig {
    pub fn parse(content: &str) -> Result<Self, InfraError> {
        toml::from_str(content).map_err(|e| InfraError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, InfraError> {
        let content = std::fs::read_to_string(path).map_err(|source| InfraError::Io {
            context: format!("reading {}", path.display()),
            source,
        })?;
        Self::parse(&content)
    }
}
