//! CloudFormation access: exports, stack status and stack resources.

use super::{sdk_error, StackApi, StackDescription, StackExport, StackResource};
use crate::InfraError;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_cloudformation::Client;
use tracing::debug;

pub struct CloudFormationStacks {
    client: Client,
}

impl CloudFormationStacks {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        CloudFormationStacks {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl StackApi for CloudFormationStacks {
    async fn list_exports(&self) -> Result<Vec<StackExport>, InfraError> {
        let mut exports = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_exports()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| sdk_error("ListExports", e))?;

            exports.extend(output.exports().iter().filter_map(|e| {
                Some(StackExport {
                    name: e.name()?.to_string(),
                    value: e.value().unwrap_or_default().to_string(),
                })
            }));

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        debug!(count = exports.len(), "ListExports");
        Ok(exports)
    }

    async fn describe_stack(&self, stack_name: &str) -> Result<StackDescription, InfraError> {
        let output = self
            .client
            .describe_stacks()
            .stack_name(stack_name)
            .send()
            .await
            .map_err(|e| sdk_error("DescribeStacks", e))?;

        let stack = output
            .stacks()
            .first()
            .ok_or_else(|| InfraError::NotFound {
                resource: format!("stack {}", stack_name),
            })?;

        Ok(StackDescription {
            name: stack_name.to_string(),
            status: stack
                .stack_status()
                .map(|s| s.as_str().to_string())
                .unwrap_or_default(),
            output_exports: stack
                .outputs()
                .iter()
                .filter_map(|o| o.export_name().map(str::to_string))
                .collect(),
        })
    }

    async fn list_stack_resources(
        &self,
        stack_name: &str,
    ) -> Result<Vec<StackResource>, InfraError> {
        let mut resources = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_stack_resources()
                .stack_name(stack_name)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| sdk_error("ListStackResources", e))?;

            resources.extend(output.stack_resource_summaries().iter().map(|r| {
                StackResource {
                    logical_id: r.logical_resource_id().unwrap_or_default().to_string(),
                    resource_type: r.resource_type().unwrap_or_default().to_string(),
                }
            }));

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        debug!(stack_name, count = resources.len(), "ListStackResources");
        Ok(resources)
    }
}
