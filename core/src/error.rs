use thiserror::Error;

/// Errors from decoding a persisted settings snapshot
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("settings JSON must be an object, got {0}")]
    NotAnObject(&'static str),
}

/// Errors from the persistence collaborator
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage (de)serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Errors from exporting the diplopia log
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LogError {
    /// Reported to the user as a notice, never fatal
    #[error("No data to export")]
    Empty,
}
