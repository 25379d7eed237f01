use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::error::HistoryError;
use super::format::{decode_history, encode_history, HistoryFile};
use crate::models::CompletedMatch;

pub const HISTORY_FILE_NAME: &str = "completed_matches.dat";

/// Persistence contract for completed matches.
pub trait HistoryStore {
    fn save(&mut self, completed: CompletedMatch) -> Result<(), HistoryError>;

    /// Every stored match, newest `completed_at` first.
    fn load_all(&self) -> Result<Vec<CompletedMatch>, HistoryError>;

    /// Remove by id. `Ok(false)` when nothing matched.
    fn delete(&mut self, id: Uuid) -> Result<bool, HistoryError>;

    fn wipe_all(&mut self) -> Result<(), HistoryError>;

    /// Up to `limit` newest matches; read failures yield an empty list.
    fn load_recent(&self, limit: usize) -> Vec<CompletedMatch> {
        match self.load_all() {
            Ok(mut all) => {
                all.truncate(limit);
                all
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load match history");
                Vec::new()
            }
        }
    }
}

fn newest_first(matches: &mut [CompletedMatch]) {
    matches.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
}

// ============================================================================
// File store
// ============================================================================

/// Single-file store in a directory. A missing file reads as empty history.
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(HISTORY_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<Vec<CompletedMatch>, HistoryError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let bytes = fs::read(&self.path)?;
        let file = decode_history(&bytes)?;
        tracing::debug!(bytes = bytes.len(), path = ?self.path, "loaded match history");
        Ok(file.matches)
    }

    fn write_file(&self, matches: Vec<CompletedMatch>) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = encode_history(&HistoryFile::new(matches))?;

        // Atomic save: temp file, fsync, rename
        let temp_path = self.path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&data)?;
            file.flush()?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;

        tracing::debug!(bytes = data.len(), path = ?self.path, "saved match history");
        Ok(())
    }
}

impl HistoryStore for FileHistoryStore {
    fn save(&mut self, completed: CompletedMatch) -> Result<(), HistoryError> {
        let mut matches = self.read_file()?;
        let id = completed.id;
        matches.retain(|existing| existing.id != id);
        matches.push(completed);
        self.write_file(matches)?;
        tracing::info!(%id, "completed match saved");
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<CompletedMatch>, HistoryError> {
        let mut matches = self.read_file()?;
        newest_first(&mut matches);
        Ok(matches)
    }

    fn delete(&mut self, id: Uuid) -> Result<bool, HistoryError> {
        let mut matches = self.read_file()?;
        let before = matches.len();
        matches.retain(|existing| existing.id != id);
        if matches.len() == before {
            return Ok(false);
        }
        self.write_file(matches)?;
        tracing::info!(%id, "completed match deleted");
        Ok(true)
    }

    fn wipe_all(&mut self) -> Result<(), HistoryError> {
        self.write_file(Vec::new())?;
        tracing::info!(path = ?self.path, "match history wiped");
        Ok(())
    }
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct InMemoryHistoryStore {
    matches: Vec<CompletedMatch>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn save(&mut self, completed: CompletedMatch) -> Result<(), HistoryError> {
        self.matches.retain(|existing| existing.id != completed.id);
        self.matches.push(completed);
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<CompletedMatch>, HistoryError> {
        let mut matches = self.matches.clone();
        newest_first(&mut matches);
        Ok(matches)
    }

    fn delete(&mut self, id: Uuid) -> Result<bool, HistoryError> {
        let before = self.matches.len();
        self.matches.retain(|existing| existing.id != id);
        Ok(self.matches.len() != before)
    }

    fn wipe_all(&mut self) -> Result<(), HistoryError> {
        self.matches.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Match, MatchConfiguration};
    use chrono::{Duration, TimeZone, Utc};
    use tempfile::TempDir;

    fn completed(minutes_after: i64) -> CompletedMatch {
        let at = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes_after);
        CompletedMatch::new(Match::new(MatchConfiguration::standard()), Vec::new(), at)
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileHistoryStore::new(temp_dir.path());
        assert!(store.load_all().unwrap().is_empty());
        assert!(store.load_recent(5).is_empty());
    }

    #[test]
    fn test_file_store_orders_newest_first() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileHistoryStore::new(temp_dir.path());
        let older = completed(0);
        let newer = completed(90);
        store.save(older.clone()).unwrap();
        store.save(newer.clone()).unwrap();

        let reopened = FileHistoryStore::new(temp_dir.path());
        let ids: Vec<_> = reopened.load_all().unwrap().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
        assert_eq!(reopened.load_recent(1)[0].id, newer.id);

        // Temp file should not linger
        assert!(!store.path().with_extension("tmp").exists());
    }

    #[test]
    fn test_file_store_delete_and_wipe() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileHistoryStore::new(temp_dir.path());
        let first = completed(0);
        store.save(first.clone()).unwrap();
        store.save(completed(10)).unwrap();

        assert!(store.delete(first.id).unwrap());
        assert!(!store.delete(first.id).unwrap());
        assert_eq!(store.load_all().unwrap().len(), 1);

        store.wipe_all().unwrap();
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_corrupted_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileHistoryStore::new(temp_dir.path());
        store.save(completed(0)).unwrap();

        let mut bytes = fs::read(store.path()).unwrap();
        bytes[0] ^= 0xFF;
        fs::write(store.path(), bytes).unwrap();

        let err = store.load_all().unwrap_err();
        assert!(matches!(err, HistoryError::ChecksumMismatch));
        assert!(store.load_recent(10).is_empty());
    }

    #[test]
    fn test_save_same_id_replaces() {
        let mut store = InMemoryHistoryStore::new();
        let mut item = completed(0);
        store.save(item.clone()).unwrap();
        item.match_info.home_team = "CITY".to_string();
        store.save(item.clone()).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.load_all().unwrap()[0].match_info.home_team, "CITY");
    }
}
