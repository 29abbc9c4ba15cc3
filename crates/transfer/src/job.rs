//! Internal job representation.
//!
//! The hosting shell translates the pipeline's native job event into this
//! form; nothing here is specific to how the job was delivered. Field names
//! mirror the event's camelCase so the translation is a direct projection.

use serde::Deserialize;

use pipeline_transfer_storage::{AwsCredentials, RemoteLocation};

/// One transfer job: input artifacts, read credentials, and the raw rule
/// configuration string.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Raw `UserParameters` string holding the JSON array of rules.
    pub user_parameters: String,
    /// Named upstream artifacts available to this job.
    pub input_artifacts: Vec<InputArtifact>,
    /// Credential triple scoped to read the input artifacts. Never used
    /// against destination buckets.
    pub artifact_credentials: AwsCredentials,
}

/// One named input artifact and where its archive lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputArtifact {
    /// Logical artifact name referenced by rules.
    pub name: String,
    /// Remote location of the zip archive.
    pub location: RemoteLocation,
}
