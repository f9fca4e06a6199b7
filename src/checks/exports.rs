//! CloudFormation export check.

use super::missing_names;
use crate::validator::InfrastructureValidator;
use crate::{CheckResult, InfraError};
use tracing::{info, warn};

impl InfrastructureValidator {
    /// CFN-001: every expected export name is published in the region.
    pub async fn validate_cloudformation_exports(&self) -> Result<CheckResult, InfraError> {
        let expected = &self.config().names.expected_exports;
        let exports = self.stacks().list_exports().await?;

        let missing = missing_names(expected, exports.iter().map(|e| e.name.as_str()));
        for name in expected.iter().filter(|n| !missing.contains(n)) {
            info!(export = %name, "export available");
        }

        if missing.is_empty() {
            Ok(CheckResult::pass(format!(
                "All {} exports available",
                expected.len()
            )))
        } else {
            warn!(missing = ?missing, "exports missing");
            Ok(CheckResult::fail(
                format!("Export missing: {}", missing.join(", ")),
                format!(
                    "{} of {} expected exports not found among {} exports",
                    missing.len(),
                    expected.len(),
                    exports.len()
                ),
            ))
        }
    }
}
