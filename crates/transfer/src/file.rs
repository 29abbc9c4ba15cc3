//! One matched source file and its upload behavior.

use std::path::{Path, PathBuf};

use pipeline_transfer_storage::{AwsCredentials, StorageClient, StorageError};

use crate::error::TransferError;

/// A file matched inside a materialized artifact.
///
/// Immutable after construction: a rooted key (relative path from the
/// search root, `/`-prefixed) plus the absolute path of the local copy.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Rooted storage key, e.g. `/img/logo.png`.
    key: String,
    /// Absolute path of the decompressed local copy.
    absolute_path: PathBuf,
}

impl SourceFile {
    /// Create a file from its search-root-relative path and local copy.
    pub(crate) fn new(relative_path: &str, absolute_path: PathBuf) -> Self {
        Self {
            key: format!("/{}", relative_path.trim_start_matches('/')),
            absolute_path,
        }
    }

    /// The rooted storage key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Absolute path of the local copy.
    pub fn absolute_path(&self) -> &Path {
        &self.absolute_path
    }

    /// MIME type inferred from the file extension; `None` if unrecognized.
    pub fn content_type(&self) -> Option<&'static str> {
        mime_guess::from_path(&self.absolute_path).first_raw()
    }

    /// Upload this file to `bucket` under `prefix` with the supplied
    /// temporary credentials.
    ///
    /// The effective key is `prefix + "/" + key`, normalized with the
    /// leading slash stripped. Returns the resulting `s3://` URI. One
    /// write, no retry.
    ///
    /// # Errors
    /// `Upload`, wrapping the effective key and the storage-layer cause.
    pub async fn upload(
        &self,
        client: &dyn StorageClient,
        bucket: &str,
        credentials: &AwsCredentials,
        prefix: &str,
    ) -> Result<String, TransferError> {
        let key: String = object_key(prefix, &self.key);

        let data: Vec<u8> = tokio::fs::read(&self.absolute_path).await.map_err(|err| {
            TransferError::Upload {
                key: key.clone(),
                source: StorageError::from_io(self.absolute_path.display().to_string(), err),
            }
        })?;

        client
            .put_object(credentials, bucket, &key, &data, self.content_type())
            .await
            .map_err(|source| TransferError::Upload {
                key: key.clone(),
                source,
            })?;

        let uri: String = format!("s3://{bucket}/{key}");
        log::debug!("uploaded {uri}");
        Ok(uri)
    }
}

/// Join a prefix and a rooted key into a storage key.
///
/// Collapses duplicate separators and `.` segments and strips the leading
/// slash, so `"/images"` + `"/icons/x.png"` becomes `images/icons/x.png`.
pub(crate) fn object_key(prefix: &str, key: &str) -> String {
    format!("/{prefix}/{key}")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<&str>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_rooted() {
        let file: SourceFile = SourceFile::new("img/logo.png", PathBuf::from("/tmp/x/img/logo.png"));
        assert_eq!(file.key(), "/img/logo.png");

        let rooted: SourceFile = SourceFile::new("/already.png", PathBuf::from("/tmp/already.png"));
        assert_eq!(rooted.key(), "/already.png");
    }

    #[test]
    fn test_content_type_known_extension() {
        let file: SourceFile = SourceFile::new("img/logo.png", PathBuf::from("/tmp/logo.png"));
        assert_eq!(file.content_type(), Some("image/png"));
    }

    #[test]
    fn test_content_type_unknown_extension() {
        let file: SourceFile = SourceFile::new("data.unknownext", PathBuf::from("/tmp/data.unknownext"));
        assert_eq!(file.content_type(), None);
    }

    #[test]
    fn test_object_key_strips_leading_slash() {
        assert_eq!(object_key("/", "/file.txt"), "file.txt");
        assert_eq!(object_key("/images", "/logo.png"), "images/logo.png");
    }

    #[test]
    fn test_object_key_collapses_separators() {
        assert_eq!(object_key("images/", "/a//b.png"), "images/a/b.png");
        assert_eq!(object_key("", "/x.txt"), "x.txt");
        assert_eq!(object_key("a/./b", "/c.txt"), "a/b/c.txt");
    }

    #[test]
    fn test_object_key_nested_prefix() {
        assert_eq!(
            object_key("s3/key/prefix/", "/dist/app.js"),
            "s3/key/prefix/dist/app.js"
        );
    }
}
