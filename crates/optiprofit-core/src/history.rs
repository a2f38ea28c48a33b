//! Bounded, newest-first check history and its file store.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::HistoryError;
use crate::models::history::HistoryEntry;

/// Number of entries kept by default.
pub const HISTORY_LIMIT: usize = 200;

/// File name of the history store, versioned with the record shape.
pub const HISTORY_FILE_NAME: &str = "history.v1.json";

/// Result type for history operations.
pub type Result<T> = std::result::Result<T, HistoryError>;

/// In-memory history list, newest entry first.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    limit: usize,
}

impl History {
    /// Create an empty history with the default limit.
    pub fn new() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }

    /// Create an empty history keeping at most `limit` entries.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit,
        }
    }

    /// Wrap existing entries (assumed newest first), dropping any beyond the limit.
    pub fn from_entries(mut entries: Vec<HistoryEntry>, limit: usize) -> Self {
        entries.truncate(limit);
        Self { entries, limit }
    }

    /// Prepend an entry and evict the oldest ones beyond the limit.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(self.limit);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<HistoryEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

/// Persistence for the check history.
pub trait HistoryStore {
    /// Load all entries, newest first. Unreadable storage yields an empty list.
    fn load(&self) -> Vec<HistoryEntry>;

    /// Prepend an entry, enforce the limit and persist; returns the updated list.
    fn save(&self, entry: HistoryEntry) -> Result<Vec<HistoryEntry>>;

    /// Remove all entries.
    fn clear(&self) -> Result<()>;
}

/// History stored as a JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    limit: usize,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            limit: HISTORY_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Default location under the platform data directory.
    pub fn default_path(data_dir: &Path) -> PathBuf {
        data_dir.join("optiprofit").join(HISTORY_FILE_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, entries: &[HistoryEntry]) -> Result<()> {
        let content = serde_json::to_string(entries)?;
        let write_err = |source: std::io::Error| HistoryError::Write {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(&self.path, content).map_err(write_err)
    }
}

impl HistoryStore for JsonFileStore {
    fn load(&self) -> Vec<HistoryEntry> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Could not read history");
                return Vec::new();
            }
        };

        if raw.trim().is_empty() {
            return Vec::new();
        }

        match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Discarding malformed history");
                Vec::new()
            }
        }
    }

    fn save(&self, entry: HistoryEntry) -> Result<Vec<HistoryEntry>> {
        let mut history = History::from_entries(self.load(), self.limit);
        history.push(entry);
        self.write(history.entries())?;
        debug!(entries = history.len(), "History saved");
        Ok(history.into_entries())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(HistoryError::Clear {
                path: self.path.display().to_string(),
                source,
            }),
        }
    }
}
