//! AWS control-plane access.
//!
//! Each service the validator talks to sits behind a narrow async trait so
//! checks can run against the real SDK clients or an in-memory fake:
//! - `ObjectStorage`: S3 bucket existence, object put/delete
//! - `StackApi`: CloudFormation exports, stack description, stack resources
//! - `LogApi`: CloudWatch Logs stream listing and event retrieval
//! - `CatalogApi`: Glue Data Catalog database lookup
//!
//! SDK errors are flattened into `InfraError::Aws` with the service error
//! code preserved in the message.

pub mod cloudformation;
pub mod glue;
pub mod logs;
pub mod s3;

use crate::InfraError;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::error::DisplayErrorContext;

/// A CloudFormation export.
#[derive(Debug, Clone, PartialEq)]
pub struct StackExport {
    pub name: String,
    pub value: String,
}

/// The parts of a stack description the validator inspects.
#[derive(Debug, Clone, PartialEq)]
pub struct StackDescription {
    pub name: String,
    pub status: String,
    /// Export names declared on the stack's outputs
    pub output_exports: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StackResource {
    pub logical_id: String,
    pub resource_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub timestamp_ms: i64,
    pub message: String,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Succeeds when the bucket exists and is reachable with current credentials.
    async fn head_bucket(&self, bucket: &str) -> Result<(), InfraError>;

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), InfraError>;

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), InfraError>;
}

#[async_trait]
pub trait StackApi: Send + Sync {
    /// All exports in the region, across every page.
    async fn list_exports(&self) -> Result<Vec<StackExport>, InfraError>;

    async fn describe_stack(&self, stack_name: &str) -> Result<StackDescription, InfraError>;

    /// All resources of the stack, across every page.
    async fn list_stack_resources(&self, stack_name: &str)
        -> Result<Vec<StackResource>, InfraError>;
}

#[async_trait]
pub trait LogApi: Send + Sync {
    /// Names of the most recently active streams, newest first.
    ///
    /// A log group that does not exist yet is `InfraError::NotFound`.
    async fn recent_log_streams(
        &self,
        log_group: &str,
        limit: i32,
    ) -> Result<Vec<String>, InfraError>;

    /// Events of one stream at or after `start_time_ms` (epoch millis).
    async fn log_events_since(
        &self,
        log_group: &str,
        log_stream: &str,
        start_time_ms: i64,
    ) -> Result<Vec<LogEvent>, InfraError>;
}

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn get_database(&self, name: &str) -> Result<(), InfraError>;
}

/// Load the shared SDK configuration for one region.
///
/// Credentials come from the default provider chain.
pub async fn load_sdk_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}

/// Convert any SDK error into an `InfraError`, keeping the full error chain.
pub(crate) fn sdk_error<E>(operation: &str, err: E) -> InfraError
where
    E: std::error::Error,
{
    InfraError::Aws {
        operation: operation.to_string(),
        message: DisplayErrorContext(err).to_string(),
    }
}
