//! Glue database existence check.

use crate::validator::InfrastructureValidator;
use crate::{CheckResult, InfraError};
use tracing::{info, warn};

impl InfrastructureValidator {
    /// GLUE-001: look up the Glue database by name.
    pub async fn validate_glue_database(&self) -> Result<CheckResult, InfraError> {
        let database = &self.config().names.glue_database;

        match self.catalog().get_database(database).await {
            Ok(()) => {
                info!(database = %database, "Glue database exists");
                Ok(CheckResult::pass(format!("Glue database exists: {}", database)))
            }
            Err(e) => {
                warn!(database = %database, error = %e, "Glue database missing");
                Ok(CheckResult::fail(
                    format!("Glue database missing: {}", database),
                    e.to_string(),
                ))
            }
        }
    }
}
