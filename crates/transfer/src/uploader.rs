//! Top-level transfer orchestration.

use std::path::Path;
use std::sync::Arc;

use futures::future::try_join_all;
use serde_json::Value;

use pipeline_transfer_storage::{RoleAssumer, StorageClient};

use crate::artifact::{Artifact, ArtifactMap};
use crate::destination::Destination;
use crate::error::TransferError;
use crate::job::Job;
use crate::validate::{self, Rule};

/// Orchestrates one transfer job end to end: builds the artifact map,
/// validates the rule list, and runs every destination to completion.
pub struct Uploader {
    /// Parsed (but not yet validated) rule configuration.
    parameters: Value,
    /// Input artifacts keyed by logical name, shared with every
    /// destination and attribute. This map is the only state shared across
    /// destinations, and only each artifact mutates itself.
    artifacts: Arc<ArtifactMap>,
    /// Storage backend shared by artifacts and uploads.
    client: Arc<dyn StorageClient>,
    /// Role assumption backend.
    assumer: Arc<dyn RoleAssumer>,
}

impl Uploader {
    /// Build an uploader from a job, staging artifacts in the OS temp
    /// directory.
    ///
    /// Artifacts are constructed eagerly but materialized lazily; no I/O
    /// happens here.
    ///
    /// # Errors
    /// `NoInputArtifacts` if the job names none; `Validation` if the raw
    /// configuration string is not JSON.
    pub fn new(
        job: &Job,
        client: Arc<dyn StorageClient>,
        assumer: Arc<dyn RoleAssumer>,
    ) -> Result<Self, TransferError> {
        Self::with_scratch_root(job, client, assumer, &std::env::temp_dir())
    }

    /// Build an uploader staging artifacts under an explicit scratch root.
    pub fn with_scratch_root(
        job: &Job,
        client: Arc<dyn StorageClient>,
        assumer: Arc<dyn RoleAssumer>,
        scratch_root: &Path,
    ) -> Result<Self, TransferError> {
        let parameters: Value =
            serde_json::from_str(&job.user_parameters).map_err(|err| TransferError::Validation {
                messages: format!("user parameters are not valid JSON: {err}"),
            })?;

        if job.input_artifacts.is_empty() {
            return Err(TransferError::NoInputArtifacts);
        }

        let artifacts: ArtifactMap = job
            .input_artifacts
            .iter()
            .map(|input| {
                (
                    input.name.clone(),
                    Artifact::with_scratch_root(
                        input.location.clone(),
                        job.artifact_credentials.clone(),
                        Arc::clone(&client),
                        scratch_root,
                    ),
                )
            })
            .collect();

        Ok(Self {
            parameters,
            artifacts: Arc::new(artifacts),
            client,
            assumer,
        })
    }

    /// Validated rules with defaults applied.
    ///
    /// # Errors
    /// `Validation` listing every schema violation.
    pub fn user_parameters(&self) -> Result<Vec<Rule>, TransferError> {
        validate::validate(&self.parameters)
    }

    /// One destination per validated rule, sharing the artifact map.
    pub fn destinations(&self) -> Result<Vec<Destination>, TransferError> {
        self.user_parameters()?
            .into_iter()
            .map(|rule| {
                Destination::new(
                    rule,
                    Arc::clone(&self.artifacts),
                    Arc::clone(&self.client),
                    Arc::clone(&self.assumer),
                )
            })
            .collect()
    }

    /// Run every destination's upload concurrently.
    ///
    /// Resolves once all destinations complete, to the per-destination URI
    /// lists in rule order. Fail-fast: the first destination failure fails
    /// the invocation.
    pub async fn perform(&self) -> Result<Vec<Vec<String>>, TransferError> {
        let destinations: Vec<Destination> = self.destinations()?;
        let uris: Vec<Vec<String>> =
            try_join_all(destinations.iter().map(Destination::upload)).await?;
        log::info!(
            "transfer complete: {} file(s) across {} destination(s)",
            uris.iter().map(Vec::len).sum::<usize>(),
            uris.len()
        );
        Ok(uris)
    }
}
