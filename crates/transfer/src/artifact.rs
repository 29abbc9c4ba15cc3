//! Input artifact materialization and content queries.
//!
//! An artifact is an upstream build output: a zip archive in a bucket this
//! process can only read with the job-supplied credentials. Before any
//! content query it must be materialized - fetched, persisted to scratch
//! storage, and decompressed. Materialization is lazy, runs at most once,
//! and is shared by every caller:
//!
//! - First caller of `ready()` performs fetch -> write -> unzip
//! - Concurrent callers queue on the state mutex and observe the outcome
//! - A failure is terminal; later callers receive the same error

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use globset::{Glob, GlobMatcher};
use serde_json::Value;
use tokio::sync::Mutex;
use uuid::Uuid;
use walkdir::WalkDir;
use zip::ZipArchive;

use pipeline_transfer_storage::{AwsCredentials, RemoteLocation, StorageClient};

use crate::error::TransferError;
use crate::file::SourceFile;

/// Artifacts keyed by their logical pipeline name.
pub type ArtifactMap = HashMap<String, Artifact>;

/// Materialization lifecycle. `Ready` and `Failed` are terminal.
enum MaterializeState {
    /// No materialization attempted yet.
    NotReady,
    /// Archive fetched, written, and decompressed.
    Ready,
    /// Materialization failed; the error is replayed to later callers.
    Failed(TransferError),
}

/// One upstream input artifact.
pub struct Artifact {
    /// Scratch identity; local paths derive from it.
    id: Uuid,
    /// Remote location of the zip archive.
    location: RemoteLocation,
    /// Read-scoped credentials for the archive's bucket.
    credentials: AwsCredentials,
    /// Storage backend used to fetch the archive.
    client: Arc<dyn StorageClient>,
    /// Local path the archive is written to (`{scratch}/{id}.zip`).
    archive_path: PathBuf,
    /// Directory the archive is decompressed into (`{scratch}/{id}`).
    extract_dir: PathBuf,
    /// Single-flight materialization guard. The lock queue is the wait
    /// list: whoever holds the lock either sees a terminal state or does
    /// the work.
    state: Mutex<MaterializeState>,
}

impl Artifact {
    /// Create a not-yet-materialized artifact using the OS temp directory
    /// as scratch space.
    pub fn new(
        location: RemoteLocation,
        credentials: AwsCredentials,
        client: Arc<dyn StorageClient>,
    ) -> Self {
        Self::with_scratch_root(location, credentials, client, &std::env::temp_dir())
    }

    /// Create an artifact with an explicit scratch root.
    pub fn with_scratch_root(
        location: RemoteLocation,
        credentials: AwsCredentials,
        client: Arc<dyn StorageClient>,
        scratch_root: &Path,
    ) -> Self {
        let id: Uuid = Uuid::new_v4();
        Self {
            id,
            location,
            credentials,
            client,
            archive_path: scratch_root.join(format!("{id}.zip")),
            extract_dir: scratch_root.join(id.to_string()),
            state: Mutex::new(MaterializeState::NotReady),
        }
    }

    /// Local path of the downloaded archive.
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Local directory holding the decompressed contents.
    pub fn extract_dir(&self) -> &Path {
        &self.extract_dir
    }

    /// Ensure the artifact is fetched, written, and decompressed.
    ///
    /// The first caller performs the work; everyone else waits on the state
    /// mutex and observes the cached outcome. After a success this returns
    /// immediately with no I/O. After a failure the artifact stays failed
    /// for the rest of the invocation and every call returns the same
    /// readiness error.
    ///
    /// # Errors
    /// `Ready`, wrapping the fetch, write, or decompression failure.
    pub async fn ready(&self) -> Result<(), TransferError> {
        let mut state = self.state.lock().await;
        match &*state {
            MaterializeState::Ready => Ok(()),
            MaterializeState::Failed(err) => Err(err.clone()),
            MaterializeState::NotReady => {
                log::debug!("materializing artifact {} from {}", self.id, self.location.uri());
                match self.materialize().await {
                    Ok(()) => {
                        log::debug!("artifact {} ready at {}", self.id, self.extract_dir.display());
                        *state = MaterializeState::Ready;
                        Ok(())
                    }
                    Err(err) => {
                        let err: TransferError = TransferError::ready(err);
                        *state = MaterializeState::Failed(err.clone());
                        Err(err)
                    }
                }
            }
        }
    }

    /// Fetch, persist, decompress. Runs under the state lock.
    async fn materialize(&self) -> Result<(), TransferError> {
        let data: Vec<u8> = self.fetch().await?;
        self.write(&data).await?;
        self.unzip().await?;
        Ok(())
    }

    /// Download the archive with the artifact's own credentials.
    async fn fetch(&self) -> Result<Vec<u8>, TransferError> {
        self.client
            .get_object(
                &self.credentials,
                &self.location.bucket_name,
                &self.location.object_key,
            )
            .await
            .map_err(|source| TransferError::Fetch {
                location: self.location.uri(),
                source,
            })
    }

    /// Persist the archive bytes to scratch storage.
    async fn write(&self, data: &[u8]) -> Result<(), TransferError> {
        tokio::fs::write(&self.archive_path, data)
            .await
            .map_err(|err| TransferError::from_io(self.archive_path.display().to_string(), err))
    }

    /// Decompress the written archive into a fresh directory.
    ///
    /// Directory creation is deliberately not idempotent: it fails if the
    /// directory exists, guarding against a second extraction.
    async fn unzip(&self) -> Result<(), TransferError> {
        std::fs::create_dir(&self.extract_dir).map_err(|err| TransferError::Decompression {
            message: format!("could not create {}: {err}", self.extract_dir.display()),
        })?;

        let archive_path: PathBuf = self.archive_path.clone();
        let extract_dir: PathBuf = self.extract_dir.clone();
        tokio::task::spawn_blocking(move || -> Result<(), TransferError> {
            let file = std::fs::File::open(&archive_path)
                .map_err(|err| TransferError::Decompression {
                    message: err.to_string(),
                })?;
            let mut archive = ZipArchive::new(file).map_err(|err| {
                TransferError::Decompression {
                    message: err.to_string(),
                }
            })?;
            archive
                .extract(&extract_dir)
                .map_err(|err| TransferError::Decompression {
                    message: err.to_string(),
                })
        })
        .await
        .map_err(|err| TransferError::Decompression {
            message: err.to_string(),
        })?
    }

    /// Match files under `extract_dir/relative_path` against a glob.
    ///
    /// Only valid after `ready()` has succeeded. Directories are excluded,
    /// symlinked files are followed, and each match is keyed by its path
    /// relative to the search root. No matches is an empty list.
    ///
    /// # Errors
    /// `InvalidGlobPattern` for an uncompilable pattern; `Io` for walk
    /// failures.
    pub async fn match_files(
        &self,
        pattern: &str,
        relative_path: &str,
    ) -> Result<Vec<SourceFile>, TransferError> {
        let matcher: GlobMatcher = Glob::new(pattern)
            .map_err(|err| TransferError::InvalidGlobPattern {
                pattern: pattern.to_string(),
                reason: err.to_string(),
            })?
            .compile_matcher();
        let root: PathBuf = self.extract_dir.join(relative_path);
        let root_display: String = root.display().to_string();

        tokio::task::spawn_blocking(move || walk_matches(&root, &matcher))
            .await
            .map_err(|err| TransferError::Io {
                path: root_display,
                message: err.to_string(),
            })?
    }

    /// Read a file's content as UTF-8 from inside the decompressed tree.
    ///
    /// Only valid after `ready()` has succeeded.
    pub async fn get(&self, filename: &str) -> Result<String, TransferError> {
        let path: PathBuf = self.extract_dir.join(filename);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|err| TransferError::Read {
                filename: filename.to_string(),
                message: err.to_string(),
            })
    }

    /// Read `obj[key]` from a JSON file inside the decompressed tree.
    pub async fn attribute(&self, filename: &str, key: &str) -> Result<Value, TransferError> {
        let content: String = self.get(filename).await?;
        let value: Value = serde_json::from_str(&content).map_err(|err| TransferError::Read {
            filename: filename.to_string(),
            message: err.to_string(),
        })?;
        let object = value.as_object().ok_or_else(|| TransferError::Read {
            filename: filename.to_string(),
            message: "not a JSON object".to_string(),
        })?;
        object
            .get(key)
            .cloned()
            .ok_or_else(|| TransferError::KeyNotFound {
                filename: filename.to_string(),
                key: key.to_string(),
            })
    }
}

/// Walk `root` and collect every non-directory entry matching the glob.
///
/// A nonexistent root matches nothing - a rule's `cwd` may name a subtree
/// the artifact simply does not contain.
fn walk_matches(root: &Path, matcher: &GlobMatcher) -> Result<Vec<SourceFile>, TransferError> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut files: Vec<SourceFile> = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry: walkdir::DirEntry = entry.map_err(|err| TransferError::Io {
            path: err
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            message: err.to_string(),
        })?;

        if entry.file_type().is_dir() {
            continue;
        }

        let relative: String = match entry.path().strip_prefix(root) {
            Ok(rel) => to_posix_path(rel),
            Err(_) => continue,
        };

        if matcher.is_match(&relative) {
            files.push(SourceFile::new(&relative, entry.path().to_path_buf()));
        }
    }
    Ok(files)
}

/// Render a relative path with forward slashes, as globs and keys expect.
fn to_posix_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_paths_follow_id() {
        let artifact: Artifact = Artifact::with_scratch_root(
            RemoteLocation::new("bucket", "key.zip"),
            AwsCredentials::new("ak", "sk", None),
            Arc::new(NoopClient),
            Path::new("/scratch"),
        );
        let id: String = artifact.id.to_string();
        assert_eq!(
            artifact.archive_path(),
            Path::new(&format!("/scratch/{id}.zip"))
        );
        assert_eq!(artifact.extract_dir(), Path::new(&format!("/scratch/{id}")));
    }

    #[test]
    fn test_to_posix_path() {
        assert_eq!(to_posix_path(Path::new("a/b/c.txt")), "a/b/c.txt");
        assert_eq!(to_posix_path(Path::new("file.png")), "file.png");
    }

    /// Client double for tests that never reach storage.
    struct NoopClient;

    #[async_trait::async_trait]
    impl StorageClient for NoopClient {
        async fn get_object(
            &self,
            _credentials: &AwsCredentials,
            bucket: &str,
            key: &str,
        ) -> Result<Vec<u8>, pipeline_transfer_storage::StorageError> {
            Err(pipeline_transfer_storage::StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
        }

        async fn put_object(
            &self,
            _credentials: &AwsCredentials,
            _bucket: &str,
            _key: &str,
            _data: &[u8],
            _content_type: Option<&str>,
        ) -> Result<(), pipeline_transfer_storage::StorageError> {
            Ok(())
        }
    }
}
