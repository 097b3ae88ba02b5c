//! Directory-backed blob uploader.
//!
//! Each upload is copied to `<base>/<uuid>[.<ext>]` and addressed by a
//! `file://` URL, which is what ends up in a message's `imageUrl`.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use chatter_shared::{BlobUploader, UploadError};

#[derive(Debug, Clone)]
pub struct FileBlobStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FileBlobStore {
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, UploadError> {
        fs::create_dir_all(&base_path).await?;
        // URLs must be absolute.
        let base_path = fs::canonicalize(&base_path).await?;

        info!(path = %base_path.display(), "Blob store initialized");

        Ok(Self {
            base_path,
            max_size,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    async fn store_file(&self, local: &Path) -> Result<PathBuf, UploadError> {
        let meta = match fs::metadata(local).await {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => return Err(UploadError::NotFound(local.display().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(UploadError::NotFound(local.display().to_string()))
            }
            Err(e) => return Err(UploadError::Io(e)),
        };

        if meta.len() == 0 {
            return Err(UploadError::Empty);
        }
        if meta.len() > self.max_size {
            return Err(UploadError::TooLarge {
                size: meta.len(),
                max: self.max_size,
            });
        }

        let id = Uuid::new_v4();
        let file_name = match local.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.chars().all(|c| c.is_ascii_alphanumeric()) => format!("{id}.{ext}"),
            _ => id.to_string(),
        };
        let target = self.base_path.join(file_name);

        fs::copy(local, &target).await?;

        debug!(id = %id, size = meta.len(), "Stored blob");
        Ok(target)
    }
}

impl BlobUploader for FileBlobStore {
    async fn upload(&self, local: &Path) -> Result<String, UploadError> {
        let stored = self.store_file(local).await?;
        let url = Url::from_file_path(&stored)
            .map_err(|_| UploadError::Rejected(format!("not an absolute path: {}", stored.display())))?;
        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_store(max: u64) -> (FileBlobStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = FileBlobStore::new(dir.path().join("blobs"), max)
            .await
            .unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn upload_returns_file_url() {
        let (store, dir) = test_store(1024).await;
        let local = dir.path().join("photo.jpg");
        std::fs::write(&local, b"jpeg-bytes").unwrap();

        let url = store.upload(&local).await.unwrap();
        assert!(url.starts_with("file://"));
        assert!(url.ends_with(".jpg"));

        let stored = Url::parse(&url).unwrap().to_file_path().unwrap();
        assert_eq!(std::fs::read(stored).unwrap(), b"jpeg-bytes");
    }

    #[tokio::test]
    async fn missing_file_fails() {
        let (store, dir) = test_store(1024).await;
        let err = store.upload(&dir.path().join("nope.png")).await.unwrap_err();
        assert!(matches!(err, UploadError::NotFound(_)));
    }

    #[tokio::test]
    async fn empty_and_oversized_files_fail() {
        let (store, dir) = test_store(4).await;

        let empty = dir.path().join("empty.png");
        std::fs::write(&empty, b"").unwrap();
        assert!(matches!(store.upload(&empty).await, Err(UploadError::Empty)));

        let big = dir.path().join("big.png");
        std::fs::write(&big, b"12345").unwrap();
        assert!(matches!(
            store.upload(&big).await,
            Err(UploadError::TooLarge { size: 5, max: 4 })
        ));
    }
}
