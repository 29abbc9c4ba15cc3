//! STS-backed role assumption.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sts::Client as StsClient;

use pipeline_transfer_storage::{AwsCredentials, RoleAssumer, StorageError};

/// Session name used when the Lambda environment does not supply one.
const DEFAULT_SESSION_NAME: &str = "default";

/// `RoleAssumer` implementation using AWS STS.
///
/// The STS call runs under the ambient execution role; only the resulting
/// temporary credentials are handed back to callers. The Lambda function
/// name doubles as role session name and external id, matching the trust
/// policy the deployment templates establish for destination roles.
pub struct SdkRoleAssumer {
    /// Underlying STS client.
    client: StsClient,
    /// Role session name and external id.
    session_name: String,
}

impl SdkRoleAssumer {
    /// Create an assumer from the ambient AWS configuration.
    pub async fn new() -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self {
            client: StsClient::new(&config),
            session_name: function_name(),
        }
    }

    /// Create an assumer from an existing STS client (for testing).
    pub fn from_client(client: StsClient, session_name: impl Into<String>) -> Self {
        Self {
            client,
            session_name: session_name.into(),
        }
    }
}

/// Session name from the Lambda execution environment.
fn function_name() -> String {
    std::env::var("AWS_LAMBDA_FUNCTION_NAME")
        .ok()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_SESSION_NAME.to_string())
}

#[async_trait]
impl RoleAssumer for SdkRoleAssumer {
    async fn assume_role(&self, role_arn: &str) -> Result<AwsCredentials, StorageError> {
        let output = self
            .client
            .assume_role()
            .role_arn(role_arn)
            .role_session_name(&self.session_name)
            .external_id(&self.session_name)
            .send()
            .await
            .map_err(|err| StorageError::AssumeRoleDenied {
                message: err.into_service_error().to_string(),
            })?;

        let credentials = output.credentials().ok_or_else(|| {
            StorageError::AssumeRoleDenied {
                message: "response contained no credentials".to_string(),
            }
        })?;

        log::debug!("assumed role {role_arn}");

        Ok(AwsCredentials::new(
            credentials.access_key_id(),
            credentials.secret_access_key(),
            Some(credentials.session_token().to_string()),
        ))
    }
}
