//! infra-validator library
//!
//! Post-deploy validation for the Glue ingestion pipeline infrastructure.
//!
//! This library provides:
//! - Deep checks: bucket existence, CloudFormation exports, Glue database,
//!   and an end-to-end S3 → Lambda trigger test
//! - Shallow checks: stack status, stack resource types, stack output exports
//! - Sequential orchestration with per-check error capture
//! - Text, JSON and JUnit report formatting
//!
//! # Example
//!
//! ```no_run
//! use infra_validator::config::{Stage, ValidatorConfig};
//! use infra_validator::{InfrastructureValidator, RunOptions};
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), infra_validator::InfraError> {
//! let config = ValidatorConfig::new(Stage::Dev, "us-west-2", "123456789012")?;
//! let validator = Arc::new(InfrastructureValidator::connect(config).await);
//! let report = validator.run_all_validations(&RunOptions::default()).await?;
//! std::process::exit(report.exit_code());
//! # }
//! ```

pub mod aws;
pub mod checks;
pub mod cli;
pub mod config;
pub mod engine;
pub mod validator;
pub mod version;

use serde::Serialize;
use std::fmt;
use thiserror::Error;

pub use engine::result::{ResultSummary, ValidationReport};
pub use validator::InfrastructureValidator;

/// Outcome of a single validation check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CheckResult {
    /// Check passed
    Pass { message: String, duration_ms: u64 },
    /// Check passed, but something around it needs attention
    Warn {
        message: String,
        details: String,
        duration_ms: u64,
    },
    /// Check failed
    Fail {
        message: String,
        details: String,
        duration_ms: u64,
    },
    /// Check was not executed
    Skip { reason: String },
}

impl CheckResult {
    pub fn pass(message: impl Into<String>) -> Self {
        CheckResult::Pass {
            message: message.into(),
            duration_ms: 0,
        }
    }

    pub fn warn(message: impl Into<String>, details: impl Into<String>) -> Self {
        CheckResult::Warn {
            message: message.into(),
            details: details.into(),
            duration_ms: 0,
        }
    }

    pub fn fail(message: impl Into<String>, details: impl Into<String>) -> Self {
        CheckResult::Fail {
            message: message.into(),
            details: details.into(),
            duration_ms: 0,
        }
    }

    /// Stamp the measured wall time onto the result.
    pub fn with_duration(self, elapsed_ms: u64) -> Self {
        match self {
            CheckResult::Pass { message, .. } => CheckResult::Pass {
                message,
                duration_ms: elapsed_ms,
            },
            CheckResult::Warn { message, details, .. } => CheckResult::Warn {
                message,
                details,
                duration_ms: elapsed_ms,
            },
            CheckResult::Fail { message, details, .. } => CheckResult::Fail {
                message,
                details,
                duration_ms: elapsed_ms,
            },
            skip @ CheckResult::Skip { .. } => skip,
        }
    }

    /// Boolean view used for aggregation. Warnings count as passed.
    pub fn passed(&self) -> bool {
        !matches!(self, CheckResult::Fail { .. })
    }

    pub fn duration_ms(&self) -> Option<u64> {
        match self {
            CheckResult::Pass { duration_ms, .. }
            | CheckResult::Warn { duration_ms, .. }
            | CheckResult::Fail { duration_ms, .. } => Some(*duration_ms),
            CheckResult::Skip { .. } => None,
        }
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckResult::Pass { message, .. } => write!(f, "PASS: {}", message),
            CheckResult::Warn { message, details, .. } => {
                write!(f, "WARN: {} ({})", message, details)
            }
            CheckResult::Fail { message, details, .. } => {
                write!(f, "FAIL: {} ({})", message, details)
            }
            CheckResult::Skip { reason } => write!(f, "SKIP: {}", reason),
        }
    }
}

/// Check category for grouping related checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CheckCategory {
    /// S3 bucket existence
    Storage,
    /// CloudFormation exports published by the stack
    Exports,
    /// Glue Data Catalog
    Catalog,
    /// End-to-end S3 → Lambda trigger
    Trigger,
    /// Deployment stack status, resources and outputs
    Stack,
}

impl CheckCategory {
    /// Display order used by the formatters.
    pub const ALL: [CheckCategory; 5] = [
        CheckCategory::Storage,
        CheckCategory::Exports,
        CheckCategory::Catalog,
        CheckCategory::Trigger,
        CheckCategory::Stack,
    ];
}

impl fmt::Display for CheckCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckCategory::Storage => write!(f, "Storage"),
            CheckCategory::Exports => write!(f, "Exports"),
            CheckCategory::Catalog => write!(f, "Catalog"),
            CheckCategory::Trigger => write!(f, "Trigger"),
            CheckCategory::Stack => write!(f, "Stack"),
        }
    }
}

/// A validation check with its result.
#[derive(Debug, Clone, Serialize)]
pub struct Check {
    /// Unique identifier (e.g., "S3-001")
    pub id: String,
    /// Human-readable name
    pub name: String,
    pub category: CheckCategory,
    /// Description of what this check validates
    pub description: String,
    /// Result of the check (None if not yet executed)
    pub result: Option<CheckResult>,
}

/// Error types for infra-validator operations.
#[derive(Debug, Error)]
pub enum InfraError {
    /// Malformed invocation
    #[error("{0}")]
    Usage(String),

    #[error("configuration error: {0}")]
    Config(String),

    /// A provider API call failed
    #[error("{operation} failed: {message}")]
    Aws { operation: String, message: String },

    #[error("not found: {resource}")]
    NotFound { resource: String },

    #[error("timeout after {timeout_ms}ms: {operation}")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("I/O error in {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Options controlling which checks run and how.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Specific checks to run (by ID)
    pub only_checks: Vec<String>,
    /// Specific checks to skip (by ID)
    pub skip_checks: Vec<String>,
    /// Stop on first failure
    pub fail_fast: bool,
    /// Per-check timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            only_checks: Vec::new(),
            skip_checks: Vec::new(),
            fail_fast: false,
            timeout_ms: 120_000,
        }
    }
}

impl RunOptions {
    /// Create run options from command line arguments
    pub fn from_args(args: &cli::args::Args) -> Self {
        RunOptions {
            only_checks: args.only.clone(),
            skip_checks: args.skip.clone(),
            fail_fast: args.fail_fast,
            timeout_ms: args.timeout_secs.saturating_mul(1000),
        }
    }
}
