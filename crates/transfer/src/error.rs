//! Error taxonomy for the transfer action.
//!
//! Every failure a transfer can hit maps to one variant here. Errors are
//! cloneable so a failed artifact can hand the same terminal error to every
//! later caller of its readiness operation.

use pipeline_transfer_storage::StorageError;
use thiserror::Error;

/// Errors produced while resolving and executing transfer rules.
#[derive(Error, Debug, Clone)]
pub enum TransferError {
    /// The job named no input artifacts.
    #[error("No input artifacts defined")]
    NoInputArtifacts,

    /// The rule configuration failed schema validation.
    #[error("Invalid user parameters: {messages}")]
    Validation {
        /// Every collected schema violation, joined.
        messages: String,
    },

    /// A `src` entry did not split into `artifact::glob`.
    #[error("Malformed source entry \"{entry}\" (expected \"artifact::glob\")")]
    MalformedSource {
        /// The offending entry.
        entry: String,
    },

    /// A remote attribute mapping lacked the recognized reference key.
    #[error("Unsupported attribute mapping key(s) \"{keys}\"")]
    UnsupportedReference {
        /// Keys present on the unrecognized mapping object.
        keys: String,
    },

    /// A reference named an artifact absent from the input artifact map.
    #[error("Artifact \"{name}\" was referenced, but is not a valid input artifact")]
    ArtifactNotFound {
        /// The unknown artifact name.
        name: String,
    },

    /// A resolved remote value was null or empty.
    #[error("Value was null or empty for \"{path}\"")]
    NullValue {
        /// `artifact::file::key` path of the reference.
        path: String,
    },

    /// Artifact materialization failed; wraps the failing step.
    #[error("Error occurred retrieving artifact: {source}")]
    Ready {
        /// The fetch, write, or decompression failure underneath.
        #[source]
        source: Box<TransferError>,
    },

    /// The remote archive could not be retrieved.
    #[error("Could not retrieve artifact {location}: {source}")]
    Fetch {
        /// URI of the remote archive.
        location: String,
        /// Storage-layer cause.
        #[source]
        source: StorageError,
    },

    /// The downloaded archive could not be decompressed.
    #[error("Failed to decompress artifact: {message}")]
    Decompression {
        /// What went wrong.
        message: String,
    },

    /// A file inside a materialized artifact could not be read or parsed.
    #[error("Could not read artifact file \"{filename}\": {message}")]
    Read {
        /// File path relative to the artifact root.
        filename: String,
        /// Underlying cause.
        message: String,
    },

    /// A JSON key was absent from an artifact file.
    #[error("Key \"{key}\" not found in file \"{filename}\"")]
    KeyNotFound {
        /// File the key was looked up in.
        filename: String,
        /// The missing key.
        key: String,
    },

    /// A `src` glob pattern failed to compile.
    #[error("Invalid glob pattern \"{pattern}\": {reason}")]
    InvalidGlobPattern {
        /// The pattern.
        pattern: String,
        /// Compiler message.
        reason: String,
    },

    /// Assuming the destination role failed.
    #[error("Could not assume role \"{role_arn}\": {source}")]
    RoleAssumption {
        /// The attempted role ARN.
        role_arn: String,
        /// Storage-layer cause.
        #[source]
        source: StorageError,
    },

    /// One destination upload failed.
    #[error("Failed to upload file with key \"{key}\": {source}")]
    Upload {
        /// Effective destination object key.
        key: String,
        /// Storage-layer cause.
        #[source]
        source: StorageError,
    },

    /// Local I/O error.
    #[error("I/O error for {path}: {message}")]
    Io {
        /// Path where the error occurred.
        path: String,
        /// Underlying cause.
        message: String,
    },
}

impl TransferError {
    /// Wrap a materialization step failure in the readiness error.
    pub(crate) fn ready(source: TransferError) -> Self {
        Self::Ready {
            source: Box::new(source),
        }
    }

    /// Create an `Io` error from a `std::io::Error`.
    pub(crate) fn from_io(path: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
