use chrono::{DateTime, Utc};
use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::HistoryError;
use crate::models::CompletedMatch;

pub const HISTORY_VERSION: u32 = 1;

const CHECKSUM_LEN: usize = 32;
/// lz4 size prefix
const SIZE_PREFIX_LEN: usize = 4;

/// On-disk envelope holding every completed match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryFile {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub matches: Vec<CompletedMatch>,
}

impl HistoryFile {
    pub fn new(matches: Vec<CompletedMatch>) -> Self {
        Self {
            version: HISTORY_VERSION,
            saved_at: Utc::now(),
            matches,
        }
    }
}

impl Default for HistoryFile {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// MessagePack (named fields) -> LZ4 with size prefix -> SHA-256 trailer.
pub fn encode_history(file: &HistoryFile) -> Result<Vec<u8>, HistoryError> {
    let msgpack = to_vec_named(file)?;
    let mut bytes = compress_prepend_size(&msgpack);

    let checksum = Sha256::digest(&bytes);
    bytes.extend_from_slice(&checksum);
    Ok(bytes)
}

pub fn decode_history(bytes: &[u8]) -> Result<HistoryFile, HistoryError> {
    if bytes.len() < SIZE_PREFIX_LEN + CHECKSUM_LEN {
        return Err(HistoryError::Corrupted);
    }

    let (payload, checksum) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    if Sha256::digest(payload).as_slice() != checksum {
        return Err(HistoryError::ChecksumMismatch);
    }

    let msgpack = decompress_size_prepended(payload).map_err(|_| HistoryError::Decompression)?;
    let file: HistoryFile = from_slice(&msgpack)?;

    if file.version > HISTORY_VERSION {
        return Err(HistoryError::VersionMismatch {
            found: file.version,
            supported: HISTORY_VERSION,
        });
    }
    Ok(file)
}
