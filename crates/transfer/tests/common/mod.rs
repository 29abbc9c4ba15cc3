//! Shared test support: in-memory storage/role doubles and zip fixtures.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use pipeline_transfer_storage::{AwsCredentials, RoleAssumer, StorageClient, StorageError};

/// One recorded `put_object` call.
#[derive(Debug, Clone)]
pub struct UploadRecord {
    /// Destination bucket.
    pub bucket: String,
    /// Effective object key.
    pub key: String,
    /// Content type supplied with the upload.
    pub content_type: Option<String>,
    /// Uploaded bytes.
    pub data: Vec<u8>,
    /// Access key id the upload was issued with.
    pub access_key_id: String,
}

/// In-memory `StorageClient` double.
///
/// Seeded objects serve `get_object`; `put_object` calls are recorded.
/// Individual keys can be marked to fail, for fail-fast tests.
#[derive(Default)]
pub struct MemoryStorageClient {
    /// Seeded objects keyed by (bucket, key).
    objects: RwLock<HashMap<(String, String), Vec<u8>>>,
    /// Every successful upload, in arrival order.
    uploads: RwLock<Vec<UploadRecord>>,
    /// Keys whose uploads fail with a network error.
    fail_put_keys: RwLock<HashSet<String>>,
    /// Number of `get_object` calls issued.
    get_calls: AtomicUsize,
}

impl MemoryStorageClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one readable object.
    pub fn insert(&self, bucket: &str, key: &str, data: Vec<u8>) {
        self.objects
            .write()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), data);
    }

    /// Make uploads of `key` fail.
    pub fn fail_puts_for(&self, key: &str) {
        self.fail_put_keys.write().unwrap().insert(key.to_string());
    }

    /// Recorded uploads so far.
    pub fn uploads(&self) -> Vec<UploadRecord> {
        self.uploads.read().unwrap().clone()
    }

    /// Number of `get_object` calls issued.
    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl StorageClient for MemoryStorageClient {
    async fn get_object(
        &self,
        _credentials: &AwsCredentials,
        bucket: &str,
        key: &str,
    ) -> Result<Vec<u8>, StorageError> {
        self.get_calls.fetch_add(1, Ordering::Relaxed);
        self.objects
            .read()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    async fn put_object(
        &self,
        credentials: &AwsCredentials,
        bucket: &str,
        key: &str,
        data: &[u8],
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        if self.fail_put_keys.read().unwrap().contains(key) {
            return Err(StorageError::Network {
                message: format!("injected failure for {key}"),
            });
        }
        self.uploads.write().unwrap().push(UploadRecord {
            bucket: bucket.to_string(),
            key: key.to_string(),
            content_type: content_type.map(str::to_string),
            data: data.to_vec(),
            access_key_id: credentials.access_key_id.clone(),
        });
        Ok(())
    }
}

/// `RoleAssumer` double handing out one fixed credential triple.
pub struct StaticRoleAssumer {
    /// Credentials returned for every assumption.
    credentials: AwsCredentials,
    /// Role ARNs assumed, in order.
    assumed: RwLock<Vec<String>>,
    /// When true, every assumption is denied.
    deny: bool,
}

impl StaticRoleAssumer {
    pub fn new(credentials: AwsCredentials) -> Self {
        Self {
            credentials,
            assumed: RwLock::new(Vec::new()),
            deny: false,
        }
    }

    /// An assumer that denies every role.
    pub fn denying() -> Self {
        Self {
            credentials: credentials("DENIED"),
            assumed: RwLock::new(Vec::new()),
            deny: true,
        }
    }

    /// Role ARNs assumed so far.
    pub fn assumed(&self) -> Vec<String> {
        self.assumed.read().unwrap().clone()
    }
}

#[async_trait]
impl RoleAssumer for StaticRoleAssumer {
    async fn assume_role(&self, role_arn: &str) -> Result<AwsCredentials, StorageError> {
        if self.deny {
            return Err(StorageError::AssumeRoleDenied {
                message: format!("denied {role_arn}"),
            });
        }
        self.assumed.write().unwrap().push(role_arn.to_string());
        Ok(self.credentials.clone())
    }
}

/// Credential triple with a recognizable access key id.
pub fn credentials(access_key_id: &str) -> AwsCredentials {
    AwsCredentials::new(access_key_id, "secret", Some("token".to_string()))
}

/// Build a zip archive in memory. Entries ending in `/` become
/// directories.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::FileOptions::default();
        for (name, data) in entries {
            if name.ends_with('/') {
                writer.add_directory(name.trim_end_matches('/'), options).unwrap();
            } else {
                writer.start_file(*name, options).unwrap();
                writer.write_all(data).unwrap();
            }
        }
        writer.finish().unwrap();
    }
    cursor.into_inner()
}
