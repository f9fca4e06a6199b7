//! S3 access for bucket lookups and the trigger test object.

use super::{sdk_error, ObjectStorage};
use crate::InfraError;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::debug;

pub struct S3Storage {
    client: Client,
}

impl S3Storage {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        S3Storage {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn head_bucket(&self, bucket: &str) -> Result<(), InfraError> {
        debug!(bucket, "HeadBucket");
        self.client
            .head_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| sdk_error("HeadBucket", e))?;
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), InfraError> {
        debug!(bucket, key, bytes = body.len(), "PutObject");
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| sdk_error("PutObject", e))?;
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), InfraError> {
        debug!(bucket, key, "DeleteObject");
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| sdk_error("DeleteObject", e))?;
        Ok(())
    }
}
