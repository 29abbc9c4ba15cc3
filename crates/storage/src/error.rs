//! Error types for storage operations.

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    /// Object not found.
    #[error("Object not found: s3://{bucket}/{key}")]
    NotFound {
        /// Bucket the object was requested from.
        bucket: String,
        /// Key of the missing object.
        key: String,
    },

    /// Access denied by the storage layer.
    #[error("Access denied to s3://{bucket}/{key}: {message}")]
    AccessDenied {
        /// Bucket the operation targeted.
        bucket: String,
        /// Key the operation targeted.
        key: String,
        /// Service error message.
        message: String,
    },

    /// Network or service error.
    #[error("Network error: {message}")]
    Network {
        /// Underlying error message.
        message: String,
    },

    /// Role assumption rejected by the token service.
    #[error("Role assumption denied: {message}")]
    AssumeRoleDenied {
        /// Service error message.
        message: String,
    },

    /// Local I/O error.
    #[error("I/O error for {path}: {message}")]
    Io {
        /// Path where the error occurred.
        path: String,
        /// Underlying error message.
        message: String,
    },

    /// Invalid client configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What was wrong.
        message: String,
    },
}

impl StorageError {
    /// Create an `Io` error from a `std::io::Error`.
    pub fn from_io(path: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
