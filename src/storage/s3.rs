//! AWS S3 snapshot store.
//!
//! Stores the snapshot as a single JSON object in a bucket. A put is
//! followed by a bounded existence poll so success means future gets are
//! guaranteed to observe the new value.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;

use crate::error::{AppError, Result};
use crate::storage::SnapshotStore;

const EXISTENCE_POLL_ATTEMPTS: u32 = 10;
const EXISTENCE_POLL_DELAY_MS: u64 = 500;

/// S3-backed snapshot storage.
#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Create a new S3 store for the given bucket.
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Create an S3 store from ambient AWS configuration.
    pub async fn from_env(bucket: impl Into<String>) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config), bucket)
    }

    async fn exists(&self, key: &str) -> bool {
        self.client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .is_ok()
    }

    /// Poll until the object is observable after a put.
    async fn wait_until_exists(&self, key: &str) -> Result<()> {
        for _ in 0..EXISTENCE_POLL_ATTEMPTS {
            if self.exists(key).await {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(EXISTENCE_POLL_DELAY_MS)).await;
        }
        Err(AppError::storage(format!(
            "object s3://{}/{} not observable after put",
            self.bucket, key
        )))
    }
}

#[async_trait]
impl SnapshotStore for S3Store {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(output) => {
                let bytes = output
                    .body
                    .collect()
                    .await
                    .map_err(AppError::storage)?;
                Ok(Some(bytes.into_bytes().to_vec()))
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    info!("No snapshot at s3://{}/{}", self.bucket, key);
                    Ok(None)
                } else {
                    Err(AppError::storage(service_err))
                }
            }
        }
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes.to_vec()))
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| AppError::storage(e.into_service_error()))?;

        self.wait_until_exists(key).await?;

        info!("Wrote {} bytes to s3://{}/{}", bytes.len(), self.bucket, key);
        Ok(())
    }

    fn location(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }
}
