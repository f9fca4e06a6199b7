//! Glue Data Catalog access.

use super::{sdk_error, CatalogApi};
use crate::InfraError;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_glue::Client;

pub struct GlueCatalog {
    client: Client,
}

impl GlueCatalog {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        GlueCatalog {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl CatalogApi for GlueCatalog {
    async fn get_database(&self, name: &str) -> Result<(), InfraError> {
        self.client
            .get_database()
            .name(name)
            .send()
            .await
            .map_err(|e| sdk_error("GetDatabase", e))?;
        Ok(())
    }
}
