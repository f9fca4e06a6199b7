//! Deep validation tests against the in-memory cloud.
//!
//! Covers bucket, export and database checks plus the S3 → Lambda trigger
//! test, including cleanup of the uploaded test object.

use crate::mocks::{fast_config, MockCloud, TRIGGER_FUNCTION};
use infra_validator::checks::trigger::{with_test_object, Cleanup};
use infra_validator::config::ValidationMode;
use infra_validator::engine::result::ValidationReport;
use infra_validator::{CheckResult, InfraError, RunOptions};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

fn result_of<'a>(report: &'a ValidationReport, id: &str) -> &'a CheckResult {
    report
        .checks
        .iter()
        .find(|c| c.id == id)
        .and_then(|c| c.result.as_ref())
        .unwrap_or_else(|| panic!("no result for {}", id))
}

fn fail_message(result: &CheckResult) -> (&str, &str) {
    match result {
        CheckResult::Fail { message, details, .. } => (message, details),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_healthy_deployment_passes() {
    let config = fast_config(ValidationMode::Deep);
    let cloud = MockCloud::healthy(&config);
    let input = config.names.input_bucket.clone();
    let validator = cloud.validator(config);

    let report = validator.run_all_validations(&RunOptions::default()).await.unwrap();

    let ids: Vec<&str> = report.checks.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["S3-001", "CFN-001", "GLUE-001", "TRG-001"]);
    assert!(report.all_passed(), "{:?}", report.checks);
    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.stage, "dev");
    assert_eq!(report.region, "us-west-2");
    assert_eq!(report.mode, "deep");
    assert_eq!(cloud.object_count(&input), 0);
}

#[tokio::test]
async fn test_missing_bucket_fails_only_bucket_check() {
    let config = fast_config(ValidationMode::Deep);
    let cloud = MockCloud::healthy(&config);
    cloud.remove_bucket(&config.names.output_bucket);
    let output = config.names.output_bucket.clone();
    let validator = cloud.validator(config);

    let report = validator.run_all_validations(&RunOptions::default()).await.unwrap();

    let (message, details) = fail_message(result_of(&report, "S3-001"));
    assert_eq!(message, "1 of 3 buckets missing");
    assert!(details.contains(&output));
    assert!(result_of(&report, "CFN-001").passed());
    assert!(result_of(&report, "GLUE-001").passed());
    assert!(result_of(&report, "TRG-001").passed());
    assert_eq!(report.exit_code(), 1);
}

#[tokio::test]
async fn test_missing_export_is_named_exactly() {
    let config = fast_config(ValidationMode::Deep);
    let cloud = MockCloud::healthy(&config);
    cloud.remove_export("GlueJobRole-dev");
    let validator = cloud.validator(config);

    let report = validator
        .run_all_validations(&RunOptions {
            only_checks: vec!["CFN-001".to_string()],
            ..RunOptions::default()
        })
        .await
        .unwrap();

    assert_eq!(report.checks.len(), 1);
    let (message, _) = fail_message(result_of(&report, "CFN-001"));
    assert_eq!(message, "Export missing: GlueJobRole-dev");
}

#[tokio::test]
async fn test_missing_database_fails() {
    let config = fast_config(ValidationMode::Deep);
    let cloud = MockCloud::healthy(&config);
    cloud.remove_database("glue_database_dev");
    let validator = cloud.validator(config);

    let report = validator
        .run_all_validations(&RunOptions {
            only_checks: vec!["GLUE-001".to_string()],
            ..RunOptions::default()
        })
        .await
        .unwrap();

    let (message, details) = fail_message(result_of(&report, "GLUE-001"));
    assert_eq!(message, "Glue database missing: glue_database_dev");
    assert!(details.contains("EntityNotFoundException"));
}

#[tokio::test]
async fn test_trigger_detected_after_several_polls() {
    let config = fast_config(ValidationMode::Deep);
    let cloud = MockCloud::healthy(&config);
    cloud.set_trigger_delay(3);
    let input = config.names.input_bucket.clone();
    let validator = cloud.validator(config);

    let result = validator.test_s3_lambda_trigger().await.unwrap();

    assert!(matches!(result, CheckResult::Pass { .. }), "{:?}", result);
    assert!(cloud.scans() >= 3);
    assert_eq!(cloud.object_count(&input), 0);
}

#[tokio::test]
async fn test_trigger_not_detected_still_cleans_up() {
    let config = fast_config(ValidationMode::Deep);
    let cloud = MockCloud::healthy(&config);
    cloud.disable_trigger();
    cloud.put_existing_object(&config.names.input_bucket, "data/existing.json");
    let input = config.names.input_bucket.clone();
    let validator = cloud.validator(config);

    let result = validator.test_s3_lambda_trigger().await.unwrap();

    let (message, details) = fail_message(&result);
    assert!(message.starts_with("Lambda trigger not detected for test-"));
    assert!(details.contains("/aws/lambda/"));
    assert_eq!(cloud.object_count(&input), 1);
    assert_eq!(cloud.uploads().len(), 1);
    assert_eq!(cloud.uploads(), cloud.deletes());
}

#[tokio::test]
async fn test_trigger_uploads_unique_json_key() {
    let config = fast_config(ValidationMode::Deep);
    let cloud = MockCloud::healthy(&config);
    let input = config.names.input_bucket.clone();
    let validator = cloud.validator(config);

    validator.test_s3_lambda_trigger().await.unwrap();
    validator.test_s3_lambda_trigger().await.unwrap();

    let uploads = cloud.uploads();
    assert_eq!(uploads.len(), 2);
    assert!(uploads.iter().all(|(bucket, _)| bucket == &input));
    assert!(uploads.iter().all(|(_, key)| key.starts_with("test-") && key.ends_with(".json")));
    assert_ne!(uploads[0].1, uploads[1].1);
}

#[tokio::test]
async fn test_cleanup_failure_downgrades_to_warning() {
    let config = fast_config(ValidationMode::Deep);
    let cloud = MockCloud::healthy(&config);
    cloud.fail_operation("DeleteObject");
    let validator = cloud.validator(config);

    let result = validator.test_s3_lambda_trigger().await.unwrap();

    match result {
        CheckResult::Warn { details, .. } => {
            assert!(details.starts_with("Test object cleanup failed"));
        }
        other => panic!("expected warning, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_trigger_export_fails_and_cleans_up() {
    let config = fast_config(ValidationMode::Deep);
    let cloud = MockCloud::healthy(&config);
    cloud.remove_export("TriggerLambda-dev");
    let input = config.names.input_bucket.clone();
    let validator = cloud.validator(config);

    let result = validator.test_s3_lambda_trigger().await.unwrap();

    let (message, details) = fail_message(&result);
    assert!(message.starts_with("Error checking Lambda logs for test-"));
    assert!(details.contains("TriggerLambda-dev"));
    assert_eq!(cloud.object_count(&input), 0);
    assert_eq!(cloud.deletes().len(), 1);
}

#[tokio::test]
async fn test_log_failure_fails_and_cleans_up() {
    let config = fast_config(ValidationMode::Deep);
    let cloud = MockCloud::healthy(&config);
    cloud.fail_operation("GetLogEvents");
    let input = config.names.input_bucket.clone();
    let validator = cloud.validator(config);

    let result = validator.test_s3_lambda_trigger().await.unwrap();

    let (message, details) = fail_message(&result);
    assert!(message.starts_with("Error checking Lambda logs for"));
    assert!(details.contains("GetLogEvents"));
    assert_eq!(cloud.object_count(&input), 0);
}

#[tokio::test]
async fn test_log_group_created_after_first_scan() {
    let config = fast_config(ValidationMode::Deep);
    let cloud = MockCloud::healthy(&config);
    cloud.set_log_group_delay(1);
    cloud.set_trigger_delay(2);
    let input = config.names.input_bucket.clone();
    let validator = cloud.validator(config);

    let result = validator.test_s3_lambda_trigger().await.unwrap();

    assert!(matches!(result, CheckResult::Pass { .. }), "{:?}", result);
    assert!(cloud.scans() >= 2);
    assert_eq!(cloud.object_count(&input), 0);
}

#[tokio::test]
async fn test_log_group_never_created_times_out() {
    let config = fast_config(ValidationMode::Deep);
    let cloud = MockCloud::healthy(&config);
    cloud.disable_trigger();
    cloud.remove_log_group(&format!("/aws/lambda/{}", TRIGGER_FUNCTION));
    let input = config.names.input_bucket.clone();
    let validator = cloud.validator(config);

    let result = validator.test_s3_lambda_trigger().await.unwrap();

    let (message, _) = fail_message(&result);
    assert!(message.starts_with("Lambda trigger not detected for test-"), "{}", message);
    assert!(cloud.scans() > 1);
    assert_eq!(cloud.object_count(&input), 0);
}

#[tokio::test]
async fn test_check_timeout_shorter_than_trigger_wait_still_cleans_up() {
    let mut config = fast_config(ValidationMode::Deep);
    config.trigger.timeout = Duration::from_secs(5);
    let cloud = MockCloud::healthy(&config);
    cloud.disable_trigger();
    let input = config.names.input_bucket.clone();
    let validator = cloud.validator(config);

    let report = validator
        .run_all_validations(&RunOptions {
            only_checks: vec!["TRG-001".to_string()],
            timeout_ms: 100,
            ..RunOptions::default()
        })
        .await
        .unwrap();

    let (message, details) = fail_message(result_of(&report, "TRG-001"));
    assert!(message.starts_with("Error checking Lambda logs for test-"), "{}", message);
    assert!(details.contains("waiting for trigger evidence"), "{}", details);
    assert_eq!(cloud.object_count(&input), 0);
    assert_eq!(cloud.deletes().len(), 1);
}

#[tokio::test]
async fn test_upload_failure_reported_by_orchestrator() {
    let config = fast_config(ValidationMode::Deep);
    let cloud = MockCloud::healthy(&config);
    cloud.fail_operation("PutObject");
    let validator = cloud.validator(config);

    let report = validator
        .run_all_validations(&RunOptions {
            only_checks: vec!["TRG-001".to_string()],
            ..RunOptions::default()
        })
        .await
        .unwrap();

    let (message, details) = fail_message(result_of(&report, "TRG-001"));
    assert_eq!(message, "S3 Lambda Trigger could not be completed");
    assert!(details.contains("PutObject"));
    assert!(cloud.deletes().is_empty());
}

#[tokio::test]
async fn test_export_listing_failure_fails_export_check() {
    let config = fast_config(ValidationMode::Deep);
    let cloud = MockCloud::healthy(&config);
    cloud.fail_operation("ListExports");
    let validator = cloud.validator(config);

    let report = validator.run_all_validations(&RunOptions::default()).await.unwrap();

    let (message, _) = fail_message(result_of(&report, "CFN-001"));
    assert_eq!(message, "CloudFormation Exports could not be completed");
    assert!(result_of(&report, "S3-001").passed());
    assert!(!result_of(&report, "TRG-001").passed());
    assert_eq!(report.checks.len(), 4);
}

#[tokio::test]
async fn test_fail_fast_stops_deep_run() {
    let config = fast_config(ValidationMode::Deep);
    let cloud = MockCloud::healthy(&config);
    cloud.remove_bucket(&config.names.assets_bucket);
    let validator = cloud.validator(config);

    let report = validator
        .run_all_validations(&RunOptions {
            fail_fast: true,
            ..RunOptions::default()
        })
        .await
        .unwrap();

    assert_eq!(report.checks.len(), 1);
    assert!(cloud.uploads().is_empty());
}

#[tokio::test]
async fn test_skip_trigger_avoids_writes() {
    let config = fast_config(ValidationMode::Deep);
    let cloud = MockCloud::healthy(&config);
    let validator = cloud.validator(config);

    let report = validator
        .run_all_validations(&RunOptions {
            skip_checks: vec!["TRG-001".to_string()],
            ..RunOptions::default()
        })
        .await
        .unwrap();

    assert_eq!(report.checks.len(), 3);
    assert!(cloud.uploads().is_empty());
}

#[tokio::test]
async fn test_scoped_object_removed_on_inspect_error() {
    let config = fast_config(ValidationMode::Deep);
    let cloud = MockCloud::healthy(&config);
    let input = config.names.input_bucket.clone();

    let scoped = with_test_object::<(), _, _>(
        cloud.as_ref(),
        &input,
        "test-00000000.json",
        b"{}".to_vec(),
        None,
        || async {
            Err(InfraError::NotFound {
                resource: "export TriggerLambda-dev".to_string(),
            })
        },
    )
    .await
    .unwrap();

    assert!(scoped.outcome.is_err());
    assert_eq!(scoped.cleanup, Cleanup::Removed);
    assert_eq!(cloud.object_count(&input), 0);
}

#[tokio::test]
async fn test_scoped_upload_refused_skips_inspect() {
    let cloud = MockCloud::empty();
    let inspected = AtomicBool::new(false);

    let scoped = with_test_object(
        cloud.as_ref(),
        "no-such-bucket",
        "test-22222222.json",
        b"{}".to_vec(),
        None,
        || async {
            inspected.store(true, Ordering::SeqCst);
            Ok::<_, InfraError>(())
        },
    )
    .await;

    assert!(scoped.is_err());
    assert!(!inspected.load(Ordering::SeqCst));
    assert!(cloud.deletes().is_empty());
}

#[tokio::test]
async fn test_scoped_object_cleanup_status() {
    let config = fast_config(ValidationMode::Deep);
    let cloud = MockCloud::healthy(&config);
    let input = config.names.input_bucket.clone();

    let scoped = with_test_object(
        cloud.as_ref(),
        &input,
        "test-11111111.json",
        b"{}".to_vec(),
        None,
        || async { Ok::<_, InfraError>(42) },
    )
    .await
    .unwrap();

    assert_eq!(scoped.outcome.unwrap(), 42);
    assert_eq!(scoped.cleanup, Cleanup::Removed);
    assert_eq!(cloud.object_count(&input), 0);
}

#[tokio::test]
async fn test_scoped_object_removed_when_budget_spent() {
    let config = fast_config(ValidationMode::Deep);
    let cloud = MockCloud::healthy(&config);
    let input = config.names.input_bucket.clone();

    let scoped = with_test_object(
        cloud.as_ref(),
        &input,
        "test-33333333.json",
        b"{}".to_vec(),
        Some(Duration::from_millis(20)),
        || async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, InfraError>(())
        },
    )
    .await
    .unwrap();

    assert!(matches!(scoped.outcome, Err(InfraError::Timeout { .. })));
    assert_eq!(scoped.cleanup, Cleanup::Removed);
    assert_eq!(cloud.object_count(&input), 0);
}
