//! CloudWatch Logs access for trigger evidence.

use super::{sdk_error, LogApi, LogEvent};
use crate::InfraError;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_cloudwatchlogs::types::OrderBy;
use aws_sdk_cloudwatchlogs::Client;
use tracing::debug;

pub struct CloudWatchLogs {
    client: Client,
}

impl CloudWatchLogs {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        CloudWatchLogs {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl LogApi for CloudWatchLogs {
    async fn recent_log_streams(
        &self,
        log_group: &str,
        limit: i32,
    ) -> Result<Vec<String>, InfraError> {
        let result = self
            .client
            .describe_log_streams()
            .log_group_name(log_group)
            .order_by(OrderBy::LastEventTime)
            .descending(true)
            .limit(limit)
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_resource_not_found_exception()) =>
            {
                return Err(InfraError::NotFound {
                    resource: format!("log group {}", log_group),
                });
            }
            Err(e) => return Err(sdk_error("DescribeLogStreams", e)),
        };

        let streams: Vec<String> = output
            .log_streams()
            .iter()
            .filter_map(|s| s.log_stream_name().map(str::to_string))
            .collect();
        debug!(log_group, count = streams.len(), "DescribeLogStreams");
        Ok(streams)
    }

    // A single page is enough: the window is short and the trigger logs a
    // handful of lines per invocation.
    async fn log_events_since(
        &self,
        log_group: &str,
        log_stream: &str,
        start_time_ms: i64,
    ) -> Result<Vec<LogEvent>, InfraError> {
        let output = self
            .client
            .get_log_events()
            .log_group_name(log_group)
            .log_stream_name(log_stream)
            .start_time(start_time_ms)
            .send()
            .await
            .map_err(|e| sdk_error("GetLogEvents", e))?;

        Ok(output
            .events()
            .iter()
            .map(|e| LogEvent {
                timestamp_ms: e.timestamp().unwrap_or_default(),
                message: e.message().unwrap_or_default().to_string(),
            })
            .collect())
    }
}
