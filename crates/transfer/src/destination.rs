//! One configured transfer rule.
//!
//! A destination ties together role assumption, file discovery across the
//! referenced artifacts, and the parallel per-file upload. Credential
//! resolution, bucket resolution, and discovery are mutually independent
//! and run concurrently; uploads fan out once all three are in hand.

use std::sync::Arc;

use futures::future::try_join_all;

use pipeline_transfer_storage::{AwsCredentials, RoleAssumer, StorageClient};

use crate::artifact::ArtifactMap;
use crate::attribute::{value_to_string, Attribute};
use crate::error::TransferError;
use crate::file::SourceFile;
use crate::validate::Rule;

/// One `artifact::glob` source entry, split on the first `::`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    /// Logical name of the input artifact to search.
    pub artifact: String,
    /// Glob pattern matched against paths inside the artifact.
    pub pattern: String,
}

impl SourceSpec {
    /// Parse a `name::glob` entry. Both halves must be non-empty;
    /// anything else is a configuration error.
    pub fn parse(entry: &str) -> Result<Self, TransferError> {
        let malformed = || TransferError::MalformedSource {
            entry: entry.to_string(),
        };
        let (artifact, pattern) = entry.split_once("::").ok_or_else(malformed)?;
        if artifact.is_empty() || pattern.is_empty() {
            return Err(malformed());
        }
        Ok(Self {
            artifact: artifact.to_string(),
            pattern: pattern.to_string(),
        })
    }
}

/// One transfer rule, ready to run.
pub struct Destination {
    /// Role granting write access to the destination bucket.
    role_arn: Attribute,
    /// Destination bucket.
    bucket: Attribute,
    /// Parsed source entries, in configuration order.
    sources: Vec<SourceSpec>,
    /// Key prefix applied to every upload.
    prefix: String,
    /// Working directory globs match under.
    cwd: String,
    /// Shared artifact map.
    artifacts: Arc<ArtifactMap>,
    /// Storage backend for uploads.
    client: Arc<dyn StorageClient>,
    /// Role assumption backend.
    assumer: Arc<dyn RoleAssumer>,
}

impl Destination {
    /// Build a destination from a validated rule.
    ///
    /// # Errors
    /// `MalformedSource` if any `src` entry does not split into
    /// `artifact::glob`.
    pub fn new(
        rule: Rule,
        artifacts: Arc<ArtifactMap>,
        client: Arc<dyn StorageClient>,
        assumer: Arc<dyn RoleAssumer>,
    ) -> Result<Self, TransferError> {
        let sources: Vec<SourceSpec> = rule
            .src
            .iter()
            .map(|entry| SourceSpec::parse(entry))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            role_arn: Attribute::new(rule.role_arn, Arc::clone(&artifacts)),
            bucket: Attribute::new(rule.bucket, Arc::clone(&artifacts)),
            sources,
            prefix: rule.prefix,
            cwd: rule.cwd,
            artifacts,
            client,
            assumer,
        })
    }

    /// Assume the destination role and return temporary credentials.
    ///
    /// Resolving the role ARN attribute may itself trigger artifact
    /// materialization.
    ///
    /// # Errors
    /// `RoleAssumption`, wrapping the attempted role ARN.
    pub async fn credentials(&self) -> Result<AwsCredentials, TransferError> {
        let role_arn: String = value_to_string(&self.role_arn.value().await?);
        self.assumer
            .assume_role(&role_arn)
            .await
            .map_err(|source| TransferError::RoleAssumption { role_arn, source })
    }

    /// Resolve the destination bucket name.
    pub async fn bucket_name(&self) -> Result<String, TransferError> {
        Ok(value_to_string(&self.bucket.value().await?))
    }

    /// Discover every file matched by the rule's source entries.
    ///
    /// Entries resolve concurrently; the result concatenates per-entry
    /// matches in configuration order. Order within one entry's matches is
    /// filesystem-dependent.
    ///
    /// # Errors
    /// `ArtifactNotFound` for unknown artifact names, plus any
    /// materialization or matching failure.
    pub async fn files(&self) -> Result<Vec<SourceFile>, TransferError> {
        let per_entry = self.sources.iter().map(|spec| async move {
            let artifact = self.artifacts.get(&spec.artifact).ok_or_else(|| {
                TransferError::ArtifactNotFound {
                    name: spec.artifact.clone(),
                }
            })?;
            artifact.ready().await?;
            artifact.match_files(&spec.pattern, &self.cwd).await
        });
        let matched: Vec<Vec<SourceFile>> = try_join_all(per_entry).await?;
        Ok(matched.into_iter().flatten().collect())
    }

    /// Run the transfer: assume the role, resolve the bucket, discover
    /// files (all concurrently), then upload every file in parallel.
    ///
    /// Fail-fast: the first failure among the concurrent operations fails
    /// the whole transfer and in-flight siblings are dropped. Resolves to
    /// the uploaded `s3://` URIs.
    pub async fn upload(&self) -> Result<Vec<String>, TransferError> {
        let (credentials, bucket, files) =
            tokio::try_join!(self.credentials(), self.bucket_name(), self.files())?;

        let uploads = files
            .iter()
            .map(|file| file.upload(self.client.as_ref(), &bucket, &credentials, &self.prefix));
        let uris: Vec<String> = try_join_all(uploads).await?;

        log::info!("uploaded {} file(s) to {bucket}", uris.len());
        Ok(uris)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source_spec() {
        let spec: SourceSpec = SourceSpec::parse("BuildOutput::**/*.js").unwrap();
        assert_eq!(spec.artifact, "BuildOutput");
        assert_eq!(spec.pattern, "**/*.js");
    }

    #[test]
    fn test_parse_splits_on_first_delimiter() {
        let spec: SourceSpec = SourceSpec::parse("A::dir::with::colons/*").unwrap();
        assert_eq!(spec.artifact, "A");
        assert_eq!(spec.pattern, "dir::with::colons/*");
    }

    #[test]
    fn test_parse_rejects_missing_delimiter() {
        let err: TransferError = SourceSpec::parse("no-delimiter").unwrap_err();
        assert!(matches!(err, TransferError::MalformedSource { .. }));
    }

    #[test]
    fn test_parse_rejects_empty_halves() {
        assert!(matches!(
            SourceSpec::parse("::*.js").unwrap_err(),
            TransferError::MalformedSource { .. }
        ));
        assert!(matches!(
            SourceSpec::parse("A::").unwrap_err(),
            TransferError::MalformedSource { .. }
        ));
    }
}
