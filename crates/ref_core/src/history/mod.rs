// Completed-match history
// MessagePack + LZ4 compression with versioning and integrity checks

pub mod error;
pub mod format;
pub mod store;

pub use error::HistoryError;
pub use format::{decode_history, encode_history, HistoryFile, HISTORY_VERSION};
pub use store::{FileHistoryStore, HistoryStore, InMemoryHistoryStore, HISTORY_FILE_NAME};
