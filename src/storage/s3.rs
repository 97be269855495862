//! S3-compatible object store (AWS S3 or MinIO).

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::StorageConfig;
use crate::storage::ObjectStore;

/// Raw payload storage in a single bucket.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build a client from storage settings.
    ///
    /// Static credentials and a custom endpoint are applied when configured;
    /// otherwise the default AWS provider chain is used.
    pub async fn from_config(config: &StorageConfig) -> Result<Self> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
            loader = loader.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "reddit-ingest-static",
            ));
        }
        let shared = loader.load().await;

        let mut builder =
            aws_sdk_s3::config::Builder::from(&shared).force_path_style(config.force_path_style);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Ok(Self::new(Client::from_conf(builder.build()), &config.bucket))
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

fn s3_error(action: &str, err: impl std::error::Error) -> AppError {
    AppError::S3(format!("{action}: {}", DisplayErrorContext(err)))
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn ensure_bucket(&self) -> Result<()> {
        let head = self.client.head_bucket().bucket(&self.bucket).send().await;
        let err = match head {
            Ok(_) => return Ok(()),
            Err(err) => err,
        };

        let status = err.raw_response().map(|r| r.status().as_u16());
        let missing = matches!(status, Some(404) | Some(400))
            || err.as_service_error().is_some_and(|e| e.is_not_found());
        if !missing {
            return Err(s3_error("head_bucket", err));
        }

        log::info!("Creating bucket s3://{}", self.bucket);
        self.client
            .create_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| s3_error("create_bucket", e))?;
        Ok(())
    }

    async fn put_json(&self, key: &str, value: &Value) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        let size = bytes.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| s3_error("put_object", e))?;

        log::debug!("Wrote {size} bytes to s3://{}/{}", self.bucket, key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_config_with_static_credentials() {
        let config = StorageConfig {
            bucket: "swarm-raw-test".to_string(),
            ..StorageConfig::default()
        };
        let store = S3ObjectStore::from_config(&config).await.unwrap();
        assert_eq!(store.bucket(), "swarm-raw-test");
    }
}
