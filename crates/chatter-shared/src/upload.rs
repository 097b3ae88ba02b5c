use std::future::Future;
use std::path::Path;

use crate::error::UploadError;

/// Blob storage that turns a local file into a durable, retrievable URL.
pub trait BlobUploader: Send + Sync + 'static {
    fn upload(&self, local: &Path) -> impl Future<Output = Result<String, UploadError>> + Send;
}
