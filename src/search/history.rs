//! Client-local search history.
//!
//! The history lives with the client that issued the searches and is never
//! sent to the server. It is persisted as a whole into a single named slot.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Maximum number of remembered queries.
pub const HISTORY_CAP: usize = 5;

/// Name of the storage slot holding the serialized history.
pub const HISTORY_SLOT_NAME: &str = "search_history.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHistoryEntry {
    pub query: String,
    pub timestamp: DateTime<Utc>,
}

/// Bounded, deduplicated, most-recent-first list of past queries.
///
/// Never holds more than [`HISTORY_CAP`] entries nor two entries with the
/// same query text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<SearchHistoryEntry>", into = "Vec<SearchHistoryEntry>")]
pub struct SearchHistory {
    entries: Vec<SearchHistoryEntry>,
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a query now. See [`SearchHistory::record_at`].
    pub fn record(&mut self, query: &str) -> bool {
        self.record_at(query, Utc::now())
    }

    /// Move `query` to the front with the given timestamp, dropping any
    /// older entry with identical text and anything past the cap.
    ///
    /// Blank queries are ignored; returns whether the history changed.
    pub fn record_at(&mut self, query: &str, timestamp: DateTime<Utc>) -> bool {
        if query.trim().is_empty() {
            return false;
        }

        self.entries.retain(|entry| entry.query != query);
        self.entries.insert(
            0,
            SearchHistoryEntry {
                query: query.to_string(),
                timestamp,
            },
        );
        self.entries.truncate(HISTORY_CAP);
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[SearchHistoryEntry] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&SearchHistoryEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<SearchHistoryEntry>> for SearchHistory {
    /// Rebuild a history from stored entries, keeping the first occurrence
    /// of each query and at most [`HISTORY_CAP`] entries.
    fn from(stored: Vec<SearchHistoryEntry>) -> Self {
        let mut entries: Vec<SearchHistoryEntry> = Vec::with_capacity(HISTORY_CAP);
        for entry in stored {
            if entries.len() == HISTORY_CAP {
                break;
            }
            if !entries.iter().any(|e| e.query == entry.query) {
                entries.push(entry);
            }
        }
        Self { entries }
    }
}

impl From<SearchHistory> for Vec<SearchHistoryEntry> {
    fn from(history: SearchHistory) -> Self {
        history.entries
    }
}

/// A named storage location for the serialized history.
///
/// Every save overwrites the whole slot.
pub trait HistorySlot {
    /// Load the stored history; a slot that was never written is empty.
    fn load(&self) -> Result<SearchHistory, AppError>;

    fn save(&self, history: &SearchHistory) -> Result<(), AppError>;
}

/// JSON file slot in a client data directory.
#[derive(Debug, Clone)]
pub struct FileHistorySlot {
    path: PathBuf,
}

impl FileHistorySlot {
    /// Slot named [`HISTORY_SLOT_NAME`] inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(HISTORY_SLOT_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistorySlot for FileHistorySlot {
    fn load(&self) -> Result<SearchHistory, AppError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SearchHistory::new())
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&raw).map_err(|e| {
            AppError::Storage(format!(
                "Corrupt search history at {}: {e}",
                self.path.display()
            ))
        })
    }

    fn save(&self, history: &SearchHistory) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(history)
            .map_err(|e| AppError::Storage(format!("Failed to serialize history: {e}")))?;

        // The slot is replaced atomically, never left half-written.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// The history of one client session, kept in sync with its slot.
///
/// Mutations are persisted before they become visible: if saving fails the
/// in-memory history stays as it was.
pub struct HistorySession<S: HistorySlot> {
    slot: S,
    history: SearchHistory,
}

impl<S: HistorySlot> HistorySession<S> {
    pub fn open(slot: S) -> Result<Self, AppError> {
        let history = slot.load()?;
        Ok(Self { slot, history })
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn record(&mut self, query: &str) -> Result<(), AppError> {
        let mut next = self.history.clone();
        if next.record(query) {
            self.commit(next)?;
        }
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), AppError> {
        self.commit(SearchHistory::new())
    }

    fn commit(&mut self, next: SearchHistory) -> Result<(), AppError> {
        self.slot.save(&next)?;
        self.history = next;
        Ok(())
    }
}
