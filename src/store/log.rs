//! Persistent append-only store backend.
//!
//! Every mutation appends one checksummed record to `entries.log` and is
//! fsynced before the call returns. On open, the log is replayed in file
//! order to rebuild the live view: the latest record per key wins, and a
//! tombstone drops the key. Any record that fails verification during
//! replay aborts the open with a corruption error.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::observability::{Logger, Severity};

use super::errors::{StoreError, StoreResult};
use super::record::EntryRecord;
use super::Store;

const LOG_FILE_NAME: &str = "entries.log";

struct LogStoreInner {
    file: File,
    /// Live view of the log: latest record per key, tombstones resolved.
    entries: HashMap<String, String>,
}

/// Durable store that persists every mutation to an append-only log.
pub struct LogStore {
    inner: RwLock<LogStoreInner>,
    log_path: PathBuf,
}

impl LogStore {
    /// Opens or creates the log under `data_dir`, replaying existing
    /// records to rebuild the live view.
    ///
    /// # Errors
    ///
    /// I/O failures surface as [`StoreError::Io`]; a record that fails
    /// verification aborts the open with [`StoreError::Corruption`].
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        if !data_dir.exists() {
            fs::create_dir_all(data_dir).map_err(|e| {
                StoreError::io(
                    format!("failed to create data directory: {}", data_dir.display()),
                    e,
                )
            })?;
        }

        let log_path = data_dir.join(LOG_FILE_NAME);

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&log_path)
            .map_err(|e| {
                StoreError::io(
                    format!("failed to open log file: {}", log_path.display()),
                    e,
                )
            })?;

        let entries = Self::replay(&log_path)?;

        Logger::log(
            Severity::Info,
            "log_store_opened",
            &[
                ("entries", &entries.len().to_string()),
                ("path", &log_path.display().to_string()),
            ],
        );

        Ok(Self {
            inner: RwLock::new(LogStoreInner { file, entries }),
            log_path,
        })
    }

    /// Replays the log in file order and returns the live view.
    fn replay(log_path: &Path) -> StoreResult<HashMap<String, String>> {
        let data = fs::read(log_path)
            .map_err(|e| StoreError::io("failed to read log for replay", e))?;

        let mut entries = HashMap::new();
        let mut offset: usize = 0;

        while offset < data.len() {
            let (record, consumed) = EntryRecord::deserialize(&data[offset..])
                .map_err(|e| StoreError::corruption(offset as u64, e.to_string()))?;

            if record.is_tombstone {
                entries.remove(&record.key);
            } else {
                entries.insert(record.key, record.value);
            }

            offset += consumed;
        }

        Ok(entries)
    }

    /// Appends a record and fsyncs before returning.
    fn append(inner: &mut LogStoreInner, record: &EntryRecord) -> StoreResult<()> {
        let serialized = record.serialize();

        inner.file.write_all(&serialized).map_err(|e| {
            StoreError::io(format!("failed to append record for key: {}", record.key), e)
        })?;

        inner.file.sync_all().map_err(|e| {
            StoreError::io(format!("fsync failed after appending key: {}", record.key), e)
        })?;

        Ok(())
    }

    /// Path of the backing log file.
    pub fn path(&self) -> &Path {
        &self.log_path
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.entries.len()).unwrap_or(0)
    }

    /// Whether the store holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Store for LogStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let inner = self.inner.read().map_err(StoreError::from_poison)?;
        Ok(inner.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut inner = self.inner.write().map_err(StoreError::from_poison)?;
        Self::append(&mut inner, &EntryRecord::live(key, value))?;
        inner.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut inner = self.inner.write().map_err(StoreError::from_poison)?;

        // Removing a missing key is a no-op; no tombstone is written.
        if !inner.entries.contains_key(key) {
            return Ok(());
        }

        Self::append(&mut inner, &EntryRecord::tombstone(key))?;
        inner.entries.remove(key);
        Ok(())
    }
}
