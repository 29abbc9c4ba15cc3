//! S3-backed storage client.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;

use pipeline_transfer_storage::{AwsCredentials, StorageClient, StorageError};

/// Credential scope label attached to per-call SDK credentials.
const CREDENTIAL_PROVIDER_NAME: &str = "pipeline-transfer";

/// Region used when the execution environment does not supply one.
const DEFAULT_REGION: &str = "us-east-1";

/// `StorageClient` implementation using the AWS SDK for Rust.
///
/// A fresh SDK client is configured from the supplied credentials on every
/// call. Credentials vary per caller (artifact read credentials, assumed
/// destination roles), so nothing credential-derived is cached here.
pub struct SdkStorageClient {
    /// Region all operations are issued against.
    region: String,
}

impl SdkStorageClient {
    /// Create a client pinned to a region.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
        }
    }

    /// Create a client using the `AWS_REGION` environment variable.
    pub fn from_env() -> Self {
        Self::new(region_or_default(std::env::var("AWS_REGION").ok()))
    }

    /// Build an SDK client scoped to one credential triple.
    fn s3_client(&self, credentials: &AwsCredentials) -> S3Client {
        let provider = Credentials::new(
            &credentials.access_key_id,
            &credentials.secret_access_key,
            credentials.session_token.clone(),
            None,
            CREDENTIAL_PROVIDER_NAME,
        );
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()))
            .credentials_provider(provider)
            .build();
        S3Client::from_conf(config)
    }
}

/// Resolve the effective region from an optional environment value.
fn region_or_default(region: Option<String>) -> String {
    match region {
        Some(r) if !r.is_empty() => r,
        _ => DEFAULT_REGION.to_string(),
    }
}

#[async_trait]
impl StorageClient for SdkStorageClient {
    async fn get_object(
        &self,
        credentials: &AwsCredentials,
        bucket: &str,
        key: &str,
    ) -> Result<Vec<u8>, StorageError> {
        let request = self
            .s3_client(credentials)
            .get_object()
            .bucket(bucket)
            .key(key);

        match request.send().await {
            Ok(output) => {
                let data = output.body.collect().await.map_err(|err| {
                    StorageError::Network {
                        message: err.to_string(),
                    }
                })?;
                Ok(data.into_bytes().to_vec())
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    Err(StorageError::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    })
                } else {
                    Err(StorageError::Network {
                        message: service_err.to_string(),
                    })
                }
            }
        }
    }

    async fn put_object(
        &self,
        credentials: &AwsCredentials,
        bucket: &str,
        key: &str,
        data: &[u8],
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let body = ByteStream::from(data.to_vec());

        let mut request = self
            .s3_client(credentials)
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body);

        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        request
            .send()
            .await
            .map_err(|err| StorageError::Network {
                message: err.to_string(),
            })?;

        Ok(())
    }
}
