//! Output formatting for infra-validator.
//!
//! Provides terminal, JSON, and JUnit XML output formatters.
//!
//! All formatters produce valid output for any ValidationReport input,
//! including an empty one.

use crate::cli::args::OutputFormat;
use crate::engine::result::ValidationReport;
use crate::{Check, CheckCategory, CheckResult};

const RULE: &str = "------------------------------------------------------------";

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format a validation report into a string
    fn format(&self, report: &ValidationReport) -> String;
}

/// Terminal (human-readable) formatter
pub struct TerminalFormatter {
    color: bool,
    verbose: bool,
    quiet: bool,
}

impl TerminalFormatter {
    pub fn new(color: bool, verbose: bool, quiet: bool) -> Self {
        TerminalFormatter {
            color,
            verbose,
            quiet,
        }
    }

    fn colorize(&self, text: &str, color_code: &str) -> String {
        if self.color {
            format!("\x1b[{}m{}\x1b[0m", color_code, text)
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        self.colorize(text, "32")
    }

    fn yellow(&self, text: &str) -> String {
        self.colorize(text, "33")
    }

    fn red(&self, text: &str) -> String {
        self.colorize(text, "31")
    }

    fn gray(&self, text: &str) -> String {
        self.colorize(text, "90")
    }

    fn is_quiet_hidden(&self, check: &Check) -> bool {
        self.quiet
            && matches!(
                check.result,
                Some(CheckResult::Pass { .. }) | Some(CheckResult::Skip { .. })
            )
    }

    fn format_check(&self, check: &Check) -> String {
        let (status, message) = match &check.result {
            Some(CheckResult::Pass {
                message,
                duration_ms,
            }) => {
                let msg = if self.verbose {
                    format!("{} ({}ms)", message, duration_ms)
                } else {
                    message.clone()
                };
                (self.green("[PASS]"), msg)
            }
            Some(CheckResult::Warn {
                message,
                details,
                duration_ms,
            }) => {
                let msg = if self.verbose {
                    format!("{} - {} ({}ms)", message, details, duration_ms)
                } else {
                    format!("{} - {}", message, details)
                };
                (self.yellow("[WARN]"), msg)
            }
            Some(CheckResult::Fail {
                message,
                details,
                duration_ms,
            }) => {
                let msg = if self.verbose {
                    format!("{} - {} ({}ms)", message, details, duration_ms)
                } else {
                    format!("{} - {}", message, details)
                };
                (self.red("[FAIL]"), msg)
            }
            Some(CheckResult::Skip { reason }) => (self.gray("[SKIP]"), reason.clone()),
            None => (self.gray("[----]"), "Not executed".to_string()),
        };

        format!("  {} {}: {} ({})\n", status, check.id, check.name, message)
    }
}

impl OutputFormatter for TerminalFormatter {
    fn format(&self, report: &ValidationReport) -> String {
        let mut output = String::new();

        output.push_str(RULE);
        output.push('\n');
        output.push_str(&format!(
            "Validating infrastructure for stage: {}\n",
            report.stage
        ));
        output.push_str(&format!(
            "Region: {}, Account: {}, Mode: {}\n",
            report.region, report.account_id, report.mode
        ));
        output.push_str(&format!("Timestamp: {}\n", report.timestamp.to_rfc3339()));
        output.push_str(RULE);
        output.push_str("\n\n");

        for category in CheckCategory::ALL {
            let category_checks: Vec<&Check> = report
                .checks
                .iter()
                .filter(|c| c.category == category && !self.is_quiet_hidden(c))
                .collect();

            if category_checks.is_empty() {
                continue;
            }

            output.push_str(&format!("{} CHECKS\n", category.to_string().to_uppercase()));
            for check in category_checks {
                output.push_str(&self.format_check(check));
            }
            output.push('\n');
        }

        let summary = report.summary();
        output.push_str(RULE);
        output.push('\n');
        output.push_str(&format!(
            "SUMMARY: {} passed, {} warnings, {} failed, {} skipped\n",
            summary.passed, summary.warned, summary.failed, summary.skipped
        ));
        output.push_str(&format!(
            "Total time: {:.1}s\n",
            report.total_duration_ms as f64 / 1000.0
        ));

        let verdict = if summary.all_passed() {
            self.green(&format!(
                "All infrastructure validation checks PASSED for {}",
                report.stage
            ))
        } else {
            self.red(&format!(
                "Some infrastructure validation checks FAILED for {}",
                report.stage
            ))
        };
        output.push_str(&verdict);
        output.push('\n');
        output.push_str(&format!("Exit code: {}\n", report.exit_code()));
        output.push_str(RULE);

        output
    }
}

/// JSON formatter
#[cfg(feature = "json")]
pub struct JsonFormatter {
    pretty: bool,
}

#[cfg(feature = "json")]
impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        JsonFormatter { pretty }
    }
}

#[cfg(feature = "json")]
impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &ValidationReport) -> String {
        let value = serde_json::json!({
            "timestamp": report.timestamp,
            "stage": report.stage,
            "region": report.region,
            "account_id": report.account_id,
            "mode": report.mode,
            "total_duration_ms": report.total_duration_ms,
            "passed": report.all_passed(),
            "summary": report.summary(),
            "checks": report.checks,
        });

        let rendered = if self.pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        // Serializing a Value cannot fail.
        rendered.unwrap_or_default()
    }
}

/// JUnit XML formatter
#[cfg(feature = "junit")]
#[derive(Default)]
pub struct JunitFormatter;

#[cfg(feature = "junit")]
impl JunitFormatter {
    pub fn new() -> Self {
        JunitFormatter
    }

    fn escape_xml(s: &str) -> String {
        let mut result = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '&' => result.push_str("&amp;"),
                '<' => result.push_str("&lt;"),
                '>' => result.push_str("&gt;"),
                '"' => result.push_str("&quot;"),
                '\'' => result.push_str("&apos;"),
                c => result.push(c),
            }
        }
        result
    }
}

#[cfg(feature = "junit")]
impl OutputFormatter for JunitFormatter {
    fn format(&self, report: &ValidationReport) -> String {
        let mut output = String::new();
        output.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

        let summary = report.summary();
        output.push_str(&format!(
            "<testsuites name=\"infra-validator-{}\" tests=\"{}\" failures=\"{}\" errors=\"0\" skipped=\"{}\" time=\"{:.3}\">\n",
            Self::escape_xml(&report.stage),
            summary.total,
            summary.failed,
            summary.skipped,
            report.total_duration_ms as f64 / 1000.0
        ));

        for category in CheckCategory::ALL {
            let suite_name = category.to_string().to_lowercase();
            let category_checks: Vec<&Check> = report
                .checks
                .iter()
                .filter(|c| c.category == category)
                .collect();

            if category_checks.is_empty() {
                continue;
            }

            let suite_failures = category_checks
                .iter()
                .filter(|c| matches!(&c.result, Some(CheckResult::Fail { .. })))
                .count();
            let suite_skipped = category_checks
                .iter()
                .filter(|c| matches!(&c.result, Some(CheckResult::Skip { .. }) | None))
                .count();
            let suite_time: u64 = category_checks
                .iter()
                .filter_map(|c| c.result.as_ref().and_then(CheckResult::duration_ms))
                .sum();

            output.push_str(&format!(
                "  <testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"0\" skipped=\"{}\" time=\"{:.3}\">\n",
                suite_name,
                category_checks.len(),
                suite_failures,
                suite_skipped,
                suite_time as f64 / 1000.0
            ));

            for check in category_checks {
                let time = check
                    .result
                    .as_ref()
                    .and_then(CheckResult::duration_ms)
                    .unwrap_or(0);

                output.push_str(&format!(
                    "    <testcase name=\"{}: {}\" classname=\"infra-validator.{}\" time=\"{:.3}\"",
                    Self::escape_xml(&check.id),
                    Self::escape_xml(&check.name),
                    suite_name,
                    time as f64 / 1000.0
                ));

                match &check.result {
                    Some(CheckResult::Pass { message, .. }) => {
                        output.push_str(">\n");
                        output.push_str(&format!(
                            "      <system-out>{}</system-out>\n",
                            Self::escape_xml(message)
                        ));
                        output.push_str("    </testcase>\n");
                    }
                    Some(CheckResult::Warn { message, details, .. }) => {
                        output.push_str(">\n");
                        output.push_str(&format!(
                            "      <system-out>WARNING: {} - {}</system-out>\n",
                            Self::escape_xml(message),
                            Self::escape_xml(details)
                        ));
                        output.push_str("    </testcase>\n");
                    }
                    Some(CheckResult::Fail { message, details, .. }) => {
                        output.push_str(">\n");
                        output.push_str(&format!(
                            "      <failure message=\"{}\">{}</failure>\n",
                            Self::escape_xml(message),
                            Self::escape_xml(details)
                        ));
                        output.push_str("    </testcase>\n");
                    }
                    Some(CheckResult::Skip { reason }) => {
                        output.push_str(">\n");
                        output.push_str(&format!(
                            "      <skipped message=\"{}\" />\n",
                            Self::escape_xml(reason)
                        ));
                        output.push_str("    </testcase>\n");
                    }
                    None => {
                        output.push_str(" />\n");
                    }
                }
            }

            output.push_str("  </testsuite>\n");
        }

        output.push_str("</testsuites>");
        output
    }
}

/// Get a formatter based on the output format
///
/// Formats whose feature is disabled fall back to text.
pub fn get_formatter(
    format: &OutputFormat,
    no_color: bool,
    verbose: bool,
    quiet: bool,
) -> Box<dyn OutputFormatter> {
    match format {
        #[cfg(feature = "json")]
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
        #[cfg(feature = "junit")]
        OutputFormat::Junit => Box::new(JunitFormatter::new()),
        _ => Box::new(TerminalFormatter::new(!no_color, verbose, quiet)),
    }
}
