use thiserror::Error;

pub type Result<T> = std::result::Result<T, HistoryError>;

/// History storage errors
///
/// None of these are fatal: a failed write leaves the in-memory log updated
/// and an unreadable log starts the session empty.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Writing the serialized log to storage failed
    #[error("failed to persist history to {key}: {source}")]
    Persist {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading the stored log failed
    #[error("failed to read history from {key}: {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The stored log could not be decoded
    #[error("stored history at {key} is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The in-memory log could not be encoded
    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
}
