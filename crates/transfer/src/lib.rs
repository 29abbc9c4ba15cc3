//! Core of the pipeline transfer action.
//!
//! Given a job naming upstream build artifacts (zip archives in S3) and a
//! declarative list of transfer rules, this crate resolves each rule's
//! parameters, assumes the destination role, matches files inside the
//! source artifacts, and uploads them to the destination bucket:
//!
//! - `Job` - Internal job representation (artifacts, credentials, rules)
//! - `Artifact` - Lazy, single-flight archive materialization and queries
//! - `Attribute` - Literal-or-reference configuration value resolution
//! - `SourceFile` - One matched file and its upload
//! - `Destination` - One rule: role assumption, discovery, parallel upload
//! - `Uploader` - Whole-job orchestration, fail-fast across destinations
//!
//! Storage access goes through the `pipeline-transfer-storage` traits;
//! production wiring lives in `pipeline-transfer-storage-aws`.

pub mod artifact;
pub mod attribute;
pub mod destination;
pub mod error;
pub mod file;
pub mod job;
pub mod uploader;
pub mod validate;

pub use artifact::{Artifact, ArtifactMap};
pub use attribute::{Attribute, AttributeKind, AttributeMapping};
pub use destination::{Destination, SourceSpec};
pub use error::TransferError;
pub use file::SourceFile;
pub use job::{InputArtifact, Job};
pub use uploader::Uploader;
pub use validate::{validate, Rule};
