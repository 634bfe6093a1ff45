/// Errors that can occur within the value-store layer.
///
/// Callers computing rates are expected to degrade on these rather than fail:
/// a store that cannot be read is treated like a store with no history, so a
/// transient persistence problem costs one cycle of output instead of the
/// whole check.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An underlying SQLite error.
    #[error("value store: SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Serialization or deserialization of a stored document failed.
    #[error("value store: JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem-level failure on the scope's backing database.
    #[error("value store: I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The scope identifier cannot be mapped to a backing file.
    #[error("value store: invalid scope id '{scope}'")]
    InvalidScope { scope: String },
}

/// Convenience `Result` alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
