use chatter_shared::BackendError;
use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The key is already taken in this collection.
    #[error("Record already exists: {path}/{key}")]
    Duplicate { path: String, key: String },

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// A value could not be encoded as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for BackendError {
    fn from(e: StoreError) -> Self {
        let message = e.to_string();
        match e {
            StoreError::Duplicate { path, key } => {
                BackendError::AlreadyExists(format!("{path}/{key}"))
            }
            StoreError::Json(_) => BackendError::Serialization(message),
            StoreError::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => match err.code {
                rusqlite::ErrorCode::ReadOnly | rusqlite::ErrorCode::PermissionDenied => {
                    BackendError::PermissionDenied(message)
                }
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked => {
                    BackendError::Unavailable(message)
                }
                _ => BackendError::Storage(message),
            },
            _ => BackendError::Storage(message),
        }
    }
}
