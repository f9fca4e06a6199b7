//! End-to-end S3 → Lambda trigger test.
//!
//! A uniquely named object is uploaded to the input bucket, then the trigger
//! function's log group is polled for a line mentioning the object key. The
//! object is removed again on every path once the upload has succeeded.

use crate::aws::ObjectStorage;
use crate::validator::InfrastructureValidator;
use crate::{CheckResult, InfraError};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const TEST_OBJECT_CONTENT_TYPE: &str = "application/json";

/// `test-<8 hex chars>.json`
pub fn test_object_key() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("test-{}.json", &id[..8])
}

pub fn test_object_body(now: DateTime<Utc>) -> Vec<u8> {
    serde_json::json!({
        "test": true,
        "timestamp": now.to_rfc3339(),
        "message": "Infrastructure validation test",
    })
    .to_string()
    .into_bytes()
}

/// What happened to the test object after the inspection ran.
#[derive(Debug, Clone, PartialEq)]
pub enum Cleanup {
    Removed,
    Failed(String),
}

/// Inspection outcome together with the cleanup status of the test object.
#[derive(Debug)]
pub struct Scoped<T> {
    pub outcome: Result<T, InfraError>,
    pub cleanup: Cleanup,
}

/// Upload `body` under `key`, run `inspect`, then delete the object.
///
/// The outer `Err` is returned only when the upload itself fails, in which
/// case there is nothing to clean up. With a `budget`, counted from the
/// start of the upload, `inspect` is cut off once it is spent so the delete
/// still runs inside the caller's own deadline. Delete failures never surface as errors; they are logged and
/// reported through `Scoped::cleanup`.
pub async fn with_test_object<T, F, Fut>(
    storage: &dyn ObjectStorage,
    bucket: &str,
    key: &str,
    body: Vec<u8>,
    budget: Option<Duration>,
    inspect: F,
) -> Result<Scoped<T>, InfraError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, InfraError>>,
{
    let started = Instant::now();
    storage
        .put_object(bucket, key, body, TEST_OBJECT_CONTENT_TYPE)
        .await?;
    info!(bucket, key, "uploaded test object s3://{}/{}", bucket, key);

    let outcome = match budget {
        Some(budget) => tokio::time::timeout(budget.saturating_sub(started.elapsed()), inspect())
            .await
            .unwrap_or_else(|_| {
                warn!(
                    key,
                    budget_ms = budget.as_millis() as u64,
                    "stopped waiting for trigger evidence"
                );
                Err(InfraError::Timeout {
                    operation: "waiting for trigger evidence".to_string(),
                    timeout_ms: budget.as_millis() as u64,
                })
            }),
        None => inspect().await,
    };

    let cleanup = match storage.delete_object(bucket, key).await {
        Ok(()) => {
            info!(bucket, key, "cleaned up test object");
            Cleanup::Removed
        }
        Err(e) => {
            warn!(bucket, key, error = %e, "failed to clean up test object");
            Cleanup::Failed(e.to_string())
        }
    };

    Ok(Scoped { outcome, cleanup })
}

/// Part of a check timeout spent on upload and log wait. The rest, a quarter of the
/// timeout but at most five seconds, is kept for deleting the test object.
pub fn wait_budget(check_timeout: Duration) -> Duration {
    let reserve = (check_timeout / 4).min(Duration::from_secs(5));
    check_timeout.saturating_sub(reserve)
}

/// Result of polling a log group for the test key.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerWait {
    pub log_group: String,
    /// Stream holding the matching event, if one was found
    pub found_in: Option<String>,
    pub attempts: u32,
    pub waited: Duration,
}

impl InfrastructureValidator {
    /// TRG-001: an upload to the input bucket shows up in the trigger
    /// function's logs within the configured time.
    pub async fn test_s3_lambda_trigger(&self) -> Result<CheckResult, InfraError> {
        self.run_trigger_test(None).await
    }

    /// TRG-001 under a per-check timeout. The log wait is cut short early
    /// enough that the test object is removed before `check_timeout` expires.
    pub async fn test_s3_lambda_trigger_within(
        &self,
        check_timeout: Duration,
    ) -> Result<CheckResult, InfraError> {
        self.run_trigger_test(Some(wait_budget(check_timeout))).await
    }

    async fn run_trigger_test(
        &self,
        budget: Option<Duration>,
    ) -> Result<CheckResult, InfraError> {
        let bucket = &self.config().names.input_bucket;
        let key = test_object_key();
        let body = test_object_body(Utc::now());

        let scoped = with_test_object(self.storage(), bucket, &key, body, budget, || async {
            let function = self.resolve_trigger_function().await?;
            let log_group = format!("/aws/lambda/{}", function);
            info!(log_group = %log_group, "checking trigger logs");
            self.await_trigger_evidence(&log_group, &key).await
        })
        .await?;

        let cleanup_note = match &scoped.cleanup {
            Cleanup::Removed => String::new(),
            Cleanup::Failed(e) => format!("; test object cleanup failed: {}", e),
        };

        let wait = match scoped.outcome {
            Ok(wait) => wait,
            Err(e) => {
                warn!(key = %key, error = %e, "error checking trigger logs");
                return Ok(CheckResult::fail(
                    format!("Error checking Lambda logs for {}", key),
                    format!("{}{}", e, cleanup_note),
                ));
            }
        };

        match (&wait.found_in, &scoped.cleanup) {
            (Some(stream), Cleanup::Removed) => Ok(CheckResult::pass(format!(
                "Lambda triggered for {} (stream {}, {} poll(s))",
                key, stream, wait.attempts
            ))),
            (Some(stream), Cleanup::Failed(e)) => Ok(CheckResult::warn(
                format!("Lambda triggered for {} (stream {})", key, stream),
                format!("Test object cleanup failed: {}", e),
            )),
            (None, _) => Ok(CheckResult::fail(
                format!("Lambda trigger not detected for {}", key),
                format!(
                    "No log event mentioning the key in {} after {} poll(s) over {}s{}",
                    wait.log_group,
                    wait.attempts,
                    wait.waited.as_secs(),
                    cleanup_note
                ),
            )),
        }
    }

    /// Name of the trigger function, read from its export.
    async fn resolve_trigger_function(&self) -> Result<String, InfraError> {
        let export = &self.config().names.trigger_export;
        self.stacks()
            .list_exports()
            .await?
            .into_iter()
            .find(|e| &e.name == export && !e.value.is_empty())
            .map(|e| e.value)
            .ok_or_else(|| InfraError::NotFound {
                resource: format!("export {}", export),
            })
    }

    /// Poll until the key shows up or the trigger timeout elapses.
    pub async fn await_trigger_evidence(
        &self,
        log_group: &str,
        key: &str,
    ) -> Result<TriggerWait, InfraError> {
        let settings = &self.config().trigger;
        let started = Instant::now();
        let mut attempts = 0;

        loop {
            tokio::time::sleep(settings.poll_interval).await;
            attempts += 1;

            let found_in = self.scan_for_key(log_group, key).await?;
            let waited = started.elapsed();
            debug!(attempt = attempts, found = found_in.is_some(), "trigger log scan");

            if found_in.is_some() || waited >= settings.timeout {
                return Ok(TriggerWait {
                    log_group: log_group.to_string(),
                    found_in,
                    attempts,
                    waited,
                });
            }
        }
    }

    /// One pass over the most recent streams within the log window.
    async fn scan_for_key(&self, log_group: &str, key: &str) -> Result<Option<String>, InfraError> {
        let settings = &self.config().trigger;
        let window_ms = i64::try_from(settings.log_window.as_millis()).unwrap_or(i64::MAX);
        let start_time_ms = Utc::now().timestamp_millis().saturating_sub(window_ms).max(0);

        // The group is created on the function's first invocation.
        let streams = match self
            .logs()
            .recent_log_streams(log_group, settings.log_stream_limit)
            .await
        {
            Ok(streams) => streams,
            Err(InfraError::NotFound { resource }) => {
                debug!(%resource, "log group not created yet");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        for stream in streams {
            let events = self
                .logs()
                .log_events_since(log_group, &stream, start_time_ms)
                .await?;
            if events.iter().any(|e| e.message.contains(key)) {
                return Ok(Some(stream));
            }
        }

        Ok(None)
    }
}
