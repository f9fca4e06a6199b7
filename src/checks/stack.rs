//! Shallow stack checks: status, resource types and output exports.

use super::missing_names;
use crate::validator::InfrastructureValidator;
use crate::{CheckResult, InfraError};
use tracing::{info, warn};

/// Stack states that mean the last deployment finished successfully.
pub const SUCCESSFUL_STACK_STATUSES: [&str; 3] =
    ["CREATE_COMPLETE", "UPDATE_COMPLETE", "IMPORT_COMPLETE"];

pub fn is_successful_terminal_status(status: &str) -> bool {
    SUCCESSFUL_STACK_STATUSES.contains(&status)
}

impl InfrastructureValidator {
    /// STK-001: the deployment stack sits in a successful terminal state.
    pub async fn validate_stack_status(&self) -> Result<CheckResult, InfraError> {
        let stack_name = &self.config().names.stack_name;
        let stack = self.stacks().describe_stack(stack_name).await?;

        if is_successful_terminal_status(&stack.status) {
            info!(stack = %stack_name, status = %stack.status, "stack healthy");
            Ok(CheckResult::pass(format!(
                "Stack {} is {}",
                stack_name, stack.status
            )))
        } else {
            warn!(stack = %stack_name, status = %stack.status, "stack not in a successful state");
            Ok(CheckResult::fail(
                format!("Stack {} is {}", stack_name, stack.status),
                format!("Expected one of {}", SUCCESSFUL_STACK_STATUSES.join(", ")),
            ))
        }
    }

    /// STK-002: each expected resource type appears at least once.
    pub async fn validate_stack_resources(&self) -> Result<CheckResult, InfraError> {
        let names = &self.config().names;
        let resources = self.stacks().list_stack_resources(&names.stack_name).await?;

        let missing = missing_names(
            &names.expected_resource_types,
            resources.iter().map(|r| r.resource_type.as_str()),
        );

        if missing.is_empty() {
            Ok(CheckResult::pass(format!(
                "All {} resource types present among {} resources",
                names.expected_resource_types.len(),
                resources.len()
            )))
        } else {
            warn!(stack = %names.stack_name, missing = ?missing, "resource types missing");
            Ok(CheckResult::fail(
                format!("Resource type missing: {}", missing.join(", ")),
                format!(
                    "Stack {} has {} resources",
                    names.stack_name,
                    resources.len()
                ),
            ))
        }
    }

    /// STK-003: the stack's outputs carry every expected export name.
    pub async fn validate_stack_outputs(&self) -> Result<CheckResult, InfraError> {
        let names = &self.config().names;
        let stack = self.stacks().describe_stack(&names.stack_name).await?;

        let missing = missing_names(
            &names.expected_exports,
            stack.output_exports.iter().map(String::as_str),
        );

        if missing.is_empty() {
            Ok(CheckResult::pass(format!(
                "All {} exports declared on stack outputs",
                names.expected_exports.len()
            )))
        } else {
            warn!(stack = %names.stack_name, missing = ?missing, "output exports missing");
            Ok(CheckResult::fail(
                format!("Export missing: {}", missing.join(", ")),
                format!(
                    "Stack {} declares {} exports",
                    names.stack_name,
                    stack.output_exports.len()
                ),
            ))
        }
    }
}
