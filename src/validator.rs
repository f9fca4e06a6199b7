//! The infrastructure validator: configuration plus client handles.
//!
//! Clients are acquired once, at construction, and shared read-only by every
//! check. The check implementations live in `crate::checks`.

use crate::aws::cloudformation::CloudFormationStacks;
use crate::aws::glue::GlueCatalog;
use crate::aws::logs::CloudWatchLogs;
use crate::aws::s3::S3Storage;
use crate::aws::{self, CatalogApi, LogApi, ObjectStorage, StackApi};
use crate::config::ValidatorConfig;
use crate::engine::orchestrator::{create_checks, CheckOrchestrator, OrchestratorConfig, ReportTarget};
use crate::engine::result::ValidationReport;
use crate::{InfraError, RunOptions};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct InfrastructureValidator {
    config: ValidatorConfig,
    storage: Arc<dyn ObjectStorage>,
    stacks: Arc<dyn StackApi>,
    logs: Arc<dyn LogApi>,
    catalog: Arc<dyn CatalogApi>,
}

impl InfrastructureValidator {
    /// Build SDK clients for the configured region.
    pub async fn connect(config: ValidatorConfig) -> Self {
        let sdk_config = aws::load_sdk_config(&config.region).await;
        info!(region = %config.region, "AWS clients initialised");

        InfrastructureValidator {
            storage: Arc::new(S3Storage::new(&sdk_config)),
            stacks: Arc::new(CloudFormationStacks::new(&sdk_config)),
            logs: Arc::new(CloudWatchLogs::new(&sdk_config)),
            catalog: Arc::new(GlueCatalog::new(&sdk_config)),
            config,
        }
    }

    /// Build a validator over caller-supplied backends.
    pub fn with_backends(
        config: ValidatorConfig,
        storage: Arc<dyn ObjectStorage>,
        stacks: Arc<dyn StackApi>,
        logs: Arc<dyn LogApi>,
        catalog: Arc<dyn CatalogApi>,
    ) -> Self {
        InfrastructureValidator {
            config,
            storage,
            stacks,
            logs,
            catalog,
        }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub(crate) fn storage(&self) -> &dyn ObjectStorage {
        self.storage.as_ref()
    }

    pub(crate) fn stacks(&self) -> &dyn StackApi {
        self.stacks.as_ref()
    }

    pub(crate) fn logs(&self) -> &dyn LogApi {
        self.logs.as_ref()
    }

    pub(crate) fn catalog(&self) -> &dyn CatalogApi {
        self.catalog.as_ref()
    }

    /// Run every check of the configured mode, honouring `options`.
    ///
    /// A selection that leaves no check to run is a usage error.
    pub async fn run_all_validations(
        self: &Arc<Self>,
        options: &RunOptions,
    ) -> Result<ValidationReport, InfraError> {
        info!(
            stage = %self.config.stage,
            region = %self.config.region,
            account = %self.config.account_id,
            mode = %self.config.mode,
            "validating infrastructure"
        );

        let mut orchestrator = CheckOrchestrator::new(OrchestratorConfig {
            fail_fast: options.fail_fast,
            timeout_ms: options.timeout_ms,
        })
        .with_target(ReportTarget {
            stage: self.config.stage.to_string(),
            region: self.config.region.clone(),
            account_id: self.config.account_id.clone(),
            mode: self.config.mode.to_string(),
        });
        orchestrator.register_checks(create_checks(
            self,
            self.config.mode,
            Duration::from_millis(options.timeout_ms),
        ));

        let selected = orchestrator.select_checks(&options.only_checks, &options.skip_checks);
        if selected.is_empty() {
            return Err(InfraError::Usage(format!(
                "No checks left to run in {} mode (available: {})",
                self.config.mode,
                orchestrator.check_ids().join(", ")
            )));
        }

        Ok(orchestrator.run_selected(&selected).await)
    }
}
