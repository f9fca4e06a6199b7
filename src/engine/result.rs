//! Result aggregation and reporting.
//!
//! Collects check results and derives the summary and exit code.

use crate::{Check, CheckCategory, CheckResult};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Result summary statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSummary {
    pub passed: u32,
    pub warned: u32,
    pub failed: u32,
    pub skipped: u32,
    pub total: u32,
    pub total_duration_ms: u64,
}

impl ResultSummary {
    /// True iff no check failed.
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Validation report containing all check results
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub timestamp: DateTime<Utc>,
    pub stage: String,
    pub region: String,
    pub account_id: String,
    pub mode: String,
    pub checks: Vec<Check>,
    pub total_duration_ms: u64,
}

impl ValidationReport {
    /// Create a new empty report
    pub fn new() -> Self {
        ValidationReport {
            timestamp: Utc::now(),
            stage: String::new(),
            region: String::new(),
            account_id: String::new(),
            mode: String::new(),
            checks: Vec::new(),
            total_duration_ms: 0,
        }
    }

    /// Calculate summary statistics
    pub fn summary(&self) -> ResultSummary {
        summarize(&self.checks)
    }

    pub fn all_passed(&self) -> bool {
        self.summary().all_passed()
    }

    /// 0 when every check passed, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

fn summarize(checks: &[Check]) -> ResultSummary {
    let mut summary = ResultSummary::default();

    for check in checks {
        summary.total += 1;

        match &check.result {
            Some(CheckResult::Pass { duration_ms, .. }) => {
                summary.passed += 1;
                summary.total_duration_ms += duration_ms;
            }
            Some(CheckResult::Warn { duration_ms, .. }) => {
                summary.warned += 1;
                summary.total_duration_ms += duration_ms;
            }
            Some(CheckResult::Fail { duration_ms, .. }) => {
                summary.failed += 1;
                summary.total_duration_ms += duration_ms;
            }
            Some(CheckResult::Skip { .. }) | None => {
                summary.skipped += 1;
            }
        }
    }

    summary
}

/// Result aggregator for collecting check results
#[derive(Default)]
pub struct ResultAggregator {
    checks: Vec<Check>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        ResultAggregator { checks: Vec::new() }
    }

    /// Add a completed check result
    pub fn add_result(&mut self, check: Check) {
        self.checks.push(check);
    }

    /// Check if there are any failures
    pub fn has_failures(&self) -> bool {
        self.checks
            .iter()
            .any(|c| matches!(&c.result, Some(CheckResult::Fail { .. })))
    }

    pub fn get_summary(&self) -> ResultSummary {
        summarize(&self.checks)
    }

    /// Get checks by category
    pub fn get_by_category(&self, category: CheckCategory) -> Vec<&Check> {
        self.checks
            .iter()
            .filter(|c| c.category == category)
            .collect()
    }

    /// Get only failed checks
    pub fn get_failures(&self) -> Vec<&Check> {
        self.checks
            .iter()
            .filter(|c| matches!(&c.result, Some(CheckResult::Fail { .. })))
            .collect()
    }

    /// Consume the aggregator into the final report
    pub fn into_report(self, total_duration_ms: u64) -> ValidationReport {
        ValidationReport {
            checks: self.checks,
            total_duration_ms,
            ..ValidationReport::new()
        }
    }
}
