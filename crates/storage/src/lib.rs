//! Storage abstraction for the pipeline transfer action.
//!
//! This crate defines the interface between the transfer core and object
//! storage. It is deliberately backend-agnostic:
//!
//! - `StorageClient` - Object read/write operations
//! - `RoleAssumer` - Short-lived credential acquisition via role assumption
//! - `AwsCredentials` / `RemoteLocation` - Shared value types
//!
//! # Credential Scoping
//!
//! Every operation takes an [`AwsCredentials`] value per call rather than
//! binding credentials at client construction. A pipeline job carries one
//! credential triple for reading input artifacts and assumes a different
//! role per destination, so a single shared client instance must serve
//! callers holding different short-lived credentials.

mod error;
mod traits;
mod types;

pub use error::StorageError;
pub use traits::{RoleAssumer, StorageClient};
pub use types::{AwsCredentials, RemoteLocation};
