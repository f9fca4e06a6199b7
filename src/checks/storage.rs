//! S3 bucket existence check.

use crate::validator::InfrastructureValidator;
use crate::{CheckResult, InfraError};
use tracing::{info, warn};

impl InfrastructureValidator {
    /// S3-001: check the input, output and assets buckets.
    pub async fn validate_buckets(&self) -> Result<CheckResult, InfraError> {
        let names = &self.config().names;
        let buckets = [
            ("Input", &names.input_bucket),
            ("Output", &names.output_bucket),
            ("Assets", &names.assets_bucket),
        ];

        let mut missing = Vec::new();
        for (kind, bucket) in buckets {
            match self.storage().head_bucket(bucket).await {
                Ok(()) => info!(bucket = %bucket, "{} bucket exists", kind),
                Err(e) => {
                    warn!(bucket = %bucket, error = %e, "{} bucket missing", kind);
                    missing.push(format!("{} bucket {}: {}", kind, bucket, e));
                }
            }
        }

        if missing.is_empty() {
            Ok(CheckResult::pass(format!(
                "All {} buckets exist",
                buckets.len()
            )))
        } else {
            Ok(CheckResult::fail(
                format!("{} of {} buckets missing", missing.len(), buckets.len()),
                missing.join("; "),
            ))
        }
    }
}
