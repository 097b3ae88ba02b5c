use thiserror::Error;

/// Errors reported by a realtime backend, either to a listener or to a writer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Record already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl BackendError {
    /// Whether a listener hitting this error may still receive snapshots later.
    ///
    /// Connectivity loss is transient; a revoked permission or a bad path is not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Storage(_))
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Local file not found: {0}")]
    NotFound(String),

    #[error("File too large: {size} bytes (max {max})")]
    TooLarge { size: u64, max: u64 },

    #[error("Empty file")]
    Empty,

    #[error("Upload rejected: {0}")]
    Rejected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A snapshot child that could not be turned into a record.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Record under key {key} is not an object")]
    NotAnObject { key: String },

    #[error("Record under key {key} is malformed: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Notification category not registered: {0}")]
    UnknownCategory(String),

    #[error("Notification facility unavailable: {0}")]
    Unavailable(String),
}
