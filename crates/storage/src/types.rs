//! Shared value types for storage operations.

use serde::Deserialize;

/// AWS credential triple.
///
/// Either the read-scoped credentials delivered with a pipeline job, or the
/// short-lived set obtained by assuming a destination role.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsCredentials {
    /// Access key id.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Session token (always present for pipeline-issued credentials).
    #[serde(default)]
    pub session_token: Option<String>,
}

impl AwsCredentials {
    /// Create a credential triple.
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token,
        }
    }
}

/// A bucket/key pair naming one remote object.
///
/// Field names mirror the pipeline job event (`bucketName` / `objectKey`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteLocation {
    /// Bucket the object resides in.
    pub bucket_name: String,
    /// Key of the object inside the bucket.
    pub object_key: String,
}

impl RemoteLocation {
    /// Create a remote location.
    pub fn new(bucket_name: impl Into<String>, object_key: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            object_key: object_key.into(),
        }
    }

    /// Render as an `s3://` URI, for logs and error messages.
    pub fn uri(&self) -> String {
        format!("s3://{}/{}", self.bucket_name, self.object_key)
    }
}
