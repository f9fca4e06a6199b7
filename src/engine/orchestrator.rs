//! Check execution orchestrator.
//!
//! Manages check registration and sequential execution.
//!
//! # Graceful Degradation
//!
//! - Check errors: logged and converted to a Fail result for that check only
//! - Check panics: captured from the check's task, converted to Fail
//! - Check timeout: task aborted, Fail result with timeout message
//! - Invalid check ID: logged and skipped in run_specific/run_excluding
//! - Empty check list: Returns empty report (not an error)
//!
//! Every selected check runs regardless of earlier failures unless
//! fail_fast is enabled.

use crate::engine::result::{ResultAggregator, ValidationReport};
use crate::config::ValidationMode;
use crate::validator::InfrastructureValidator;
use crate::{Check, CheckCategory, CheckResult, InfraError};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Future produced by a registered check.
pub type CheckFuture = Pin<Box<dyn Future<Output = Result<CheckResult, InfraError>> + Send>>;

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub fail_fast: bool,
    /// Per-check timeout
    pub timeout_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        OrchestratorConfig {
            fail_fast: false,
            timeout_ms: 120_000,
        }
    }
}

/// What the report is about.
#[derive(Debug, Clone, Default)]
pub struct ReportTarget {
    pub stage: String,
    pub region: String,
    pub account_id: String,
    pub mode: String,
}

/// A registered check with its execution function
pub struct RegisteredCheck {
    pub id: String,
    pub name: String,
    pub category: CheckCategory,
    pub description: String,
    pub check_fn: Box<dyn Fn() -> CheckFuture + Send + Sync>,
}

/// Check orchestrator
pub struct CheckOrchestrator {
    config: OrchestratorConfig,
    target: ReportTarget,
    checks: Vec<RegisteredCheck>,
}

impl CheckOrchestrator {
    pub fn new(config: OrchestratorConfig) -> Self {
        CheckOrchestrator {
            config,
            target: ReportTarget::default(),
            checks: Vec::new(),
        }
    }

    pub fn with_target(mut self, target: ReportTarget) -> Self {
        self.target = target;
        self
    }

    /// Register checks for execution
    pub fn register_checks(&mut self, checks: Vec<RegisteredCheck>) {
        self.checks.extend(checks);
    }

    /// Register a single check
    pub fn register_check(&mut self, check: RegisteredCheck) {
        self.checks.push(check);
    }

    pub fn check_ids(&self) -> Vec<String> {
        self.checks.iter().map(|c| c.id.clone()).collect()
    }

    /// Run all registered checks
    pub async fn run_all(&self) -> ValidationReport {
        self.run_checks(&self.check_ids()).await
    }

    /// Run checks in a specific category
    pub async fn run_category(&self, category: CheckCategory) -> ValidationReport {
        let ids: Vec<String> = self
            .checks
            .iter()
            .filter(|c| c.category == category)
            .map(|c| c.id.clone())
            .collect();
        self.run_checks(&ids).await
    }

    /// Registered IDs kept by `only` (when non-empty) and not named in `skip`,
    /// in registration order.
    pub fn select_checks(&self, only: &[String], skip: &[String]) -> Vec<String> {
        self.warn_unknown(only);
        self.warn_unknown(skip);
        self.checks
            .iter()
            .map(|c| &c.id)
            .filter(|id| only.is_empty() || only.contains(id))
            .filter(|id| !skip.contains(id))
            .cloned()
            .collect()
    }

    /// Run a selection produced by `select_checks`.
    pub async fn run_selected(&self, check_ids: &[String]) -> ValidationReport {
        self.run_checks(check_ids).await
    }

    fn warn_unknown(&self, ids: &[String]) {
        for id in ids {
            if !self.checks.iter().any(|c| &c.id == id) {
                warn!(check = %id, "unknown check id ignored");
            }
        }
    }

    /// Execute the selected checks in registration order, one at a time.
    async fn run_checks(&self, check_ids: &[String]) -> ValidationReport {
        let start = Instant::now();
        let mut aggregator = ResultAggregator::new();

        for check in self.checks.iter().filter(|c| check_ids.contains(&c.id)) {
            info!(check = %check.id, name = %check.name, "running check");
            let result = self.execute_check(check).await;
            let failed = !result.passed();

            info!(check = %check.id, outcome = %result, "check finished");
            aggregator.add_result(Check {
                id: check.id.clone(),
                name: check.name.clone(),
                category: check.category,
                description: check.description.clone(),
                result: Some(result),
            });

            if self.config.fail_fast && failed {
                warn!(check = %check.id, "fail-fast: stopping after first failure");
                break;
            }
        }

        let mut report = aggregator.into_report(start.elapsed().as_millis() as u64);
        report.stage = self.target.stage.clone();
        report.region = self.target.region.clone();
        report.account_id = self.target.account_id.clone();
        report.mode = self.target.mode.clone();
        report
    }

    /// Execute a single check with error, panic and timeout capture
    async fn execute_check(&self, check: &RegisteredCheck) -> CheckResult {
        let start = Instant::now();
        let mut handle = tokio::spawn((check.check_fn)());
        let timeout = Duration::from_millis(self.config.timeout_ms);

        let outcome = tokio::time::timeout(timeout, &mut handle).await;
        let elapsed = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(Ok(result))) => result.with_duration(elapsed),
            Ok(Ok(Err(e))) => {
                warn!(check = %check.id, error = %e, "check raised an error");
                CheckResult::fail(format!("{} could not be completed", check.name), e.to_string())
                    .with_duration(elapsed)
            }
            Ok(Err(join_err)) => {
                warn!(check = %check.id, error = %join_err, "check task aborted");
                let message = if join_err.is_panic() {
                    "Check panicked during execution"
                } else {
                    "Check was cancelled"
                };
                CheckResult::fail(message, join_err.to_string()).with_duration(elapsed)
            }
            Err(_) => {
                handle.abort();
                warn!(check = %check.id, timeout_ms = self.config.timeout_ms, "check timed out");
                CheckResult::fail(
                    format!("Check timed out after {}ms", elapsed),
                    "Check exceeded the per-check timeout".to_string(),
                )
                .with_duration(elapsed)
            }
        }
    }
}

/// Wrap a validator method into a registered check.
fn register<F, Fut>(
    validator: &Arc<InfrastructureValidator>,
    id: &str,
    name: &str,
    category: CheckCategory,
    description: &str,
    run: F,
) -> RegisteredCheck
where
    F: Fn(Arc<InfrastructureValidator>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<CheckResult, InfraError>> + Send + 'static,
{
    let validator = Arc::clone(validator);
    RegisteredCheck {
        id: id.to_string(),
        name: name.to_string(),
        category,
        description: description.to_string(),
        check_fn: Box::new(move || -> CheckFuture { Box::pin(run(Arc::clone(&validator))) }),
    }
}

/// Create the checks for a validation mode, in execution order.
///
/// `check_timeout` is handed to the trigger test so it can finish its
/// cleanup before the orchestrator gives up on it.
pub fn create_checks(
    validator: &Arc<InfrastructureValidator>,
    mode: ValidationMode,
    check_timeout: Duration,
) -> Vec<RegisteredCheck> {
    let mut checks = Vec::new();

    if mode.includes_deep() {
        checks.push(register(
            validator,
            "S3-001",
            "S3 Buckets",
            CheckCategory::Storage,
            "Verify the input, output and assets buckets exist",
            |v| async move { v.validate_buckets().await },
        ));
        checks.push(register(
            validator,
            "CFN-001",
            "CloudFormation Exports",
            CheckCategory::Exports,
            "Verify every expected export is published",
            |v| async move { v.validate_cloudformation_exports().await },
        ));
        checks.push(register(
            validator,
            "GLUE-001",
            "Glue Database",
            CheckCategory::Catalog,
            "Verify the Glue database exists",
            |v| async move { v.validate_glue_database().await },
        ));
        checks.push(register(
            validator,
            "TRG-001",
            "S3 Lambda Trigger",
            CheckCategory::Trigger,
            "Upload a test object and look for it in the trigger function's logs",
            move |v| async move { v.test_s3_lambda_trigger_within(check_timeout).await },
        ));
    }

    if mode.includes_shallow() {
        checks.push(register(
            validator,
            "STK-001",
            "Stack Status",
            CheckCategory::Stack,
            "Verify the stack is in a successful terminal state",
            |v| async move { v.validate_stack_status().await },
        ));
        checks.push(register(
            validator,
            "STK-002",
            "Stack Resources",
            CheckCategory::Stack,
            "Verify each expected resource type is present in the stack",
            |v| async move { v.validate_stack_resources().await },
        ));
        checks.push(register(
            validator,
            "STK-003",
            "Stack Outputs",
            CheckCategory::Stack,
            "Verify the stack outputs carry every expected export",
            |v| async move { v.validate_stack_outputs().await },
        ));
    }

    checks
}
