//! Storage traits implemented by each backend.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::types::AwsCredentials;

/// Low-level object storage operations.
///
/// Implementations construct whatever per-call state they need from the
/// supplied credentials; no credential may be cached across calls.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Download an object into memory.
    async fn get_object(
        &self,
        credentials: &AwsCredentials,
        bucket: &str,
        key: &str,
    ) -> Result<Vec<u8>, StorageError>;

    /// Upload bytes as one object.
    async fn put_object(
        &self,
        credentials: &AwsCredentials,
        bucket: &str,
        key: &str,
        data: &[u8],
        content_type: Option<&str>,
    ) -> Result<(), StorageError>;
}

/// Short-lived credential acquisition by assuming an IAM role.
#[async_trait]
pub trait RoleAssumer: Send + Sync {
    /// Assume `role_arn` and return the temporary credential triple.
    async fn assume_role(&self, role_arn: &str) -> Result<AwsCredentials, StorageError>;
}
