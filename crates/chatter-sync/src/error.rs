use thiserror::Error;

use chatter_shared::{BackendError, UploadError};

#[derive(Error, Debug)]
pub enum SyncError {
    /// The backend refused or could not take the write. Nothing was stored.
    #[error("Write failed: {0}")]
    Write(#[source] BackendError),

    /// The image never reached blob storage. No message was written.
    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),

    #[error("Could not attach listener: {0}")]
    Listen(#[source] BackendError),

    #[error("Message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, SyncError>;
