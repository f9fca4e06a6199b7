//! Validation check modules.
//!
//! Deep checks:
//! - Storage: bucket existence
//! - Exports: CloudFormation exports
//! - Catalog: Glue database
//! - Trigger: end-to-end S3 → Lambda trigger test
//!
//! Shallow checks:
//! - Stack: status, resource types, output exports
//!
//! Every check is an `InfrastructureValidator` method returning
//! `Result<CheckResult, InfraError>`. An `Err` means the check could not be
//! carried out; the orchestrator turns it into a failure for that check only.

pub mod catalog;
pub mod exports;
pub mod stack;
pub mod storage;
pub mod trigger;

/// Expected names absent from `present`, in expected order.
pub fn missing_names<'a, I>(expected: &[String], present: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let present: Vec<&str> = present.into_iter().collect();
    expected
        .iter()
        .filter(|name| !present.contains(&name.as_str()))
        .cloned()
        .collect()
}
