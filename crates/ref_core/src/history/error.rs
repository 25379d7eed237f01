use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] rmp_serde::decode::Error),

    #[error("Decompression error")]
    Decompression,

    #[error("Corrupted history data")]
    Corrupted,

    #[error("Checksum mismatch")]
    ChecksumMismatch,

    #[error("Version mismatch: found {found}, supported up to {supported}")]
    VersionMismatch { found: u32, supported: u32 },

    #[error("History store unavailable: {0}")]
    Unavailable(String),
}

impl HistoryError {
    /// Whether retrying (or starting from an empty history) can help.
    pub fn is_recoverable(&self) -> bool {
        match self {
            HistoryError::Io(_) => true,
            HistoryError::Unavailable(_) => true,
            HistoryError::VersionMismatch { .. } => false,
            HistoryError::Corrupted => false,
            HistoryError::ChecksumMismatch => false,
            _ => false,
        }
    }
}
