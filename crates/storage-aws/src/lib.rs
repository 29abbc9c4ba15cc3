//! AWS SDK backends for the pipeline transfer storage interface.
//!
//! - [`SdkStorageClient`] - S3-backed `StorageClient`
//! - [`SdkRoleAssumer`] - STS-backed `RoleAssumer`
//!
//! Both are thin: the S3 client is rebuilt from the per-call credential
//! triple on every operation (credentials differ per artifact and per
//! destination), and the STS client uses the ambient Lambda execution role.

mod client;
mod sts;

pub use client::SdkStorageClient;
pub use sts::SdkRoleAssumer;
