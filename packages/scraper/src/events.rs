//! Event data: the persisted set of documents already handed off.
//!
//! Event data is keyed by `source_file_url`. A document whose URL has an
//! event record is never fetched or emitted again.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScraperError};

/// What is remembered about a processed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// When the document was last handed off (RFC 3339).
    pub last_seen: String,

    /// Last-Modified header value at that time.
    pub last_modified: String,

    /// Run that handed the document off.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
}

/// Event records keyed by document URL.
pub type EventData = BTreeMap<String, EventRecord>;

/// Durable storage for event data between runs.
pub trait EventStore {
    /// Load the event data. Failure aborts the run.
    fn load(&self) -> Result<EventData>;

    /// Replace the stored event data.
    fn store(&self, events: &EventData) -> Result<()>;
}

/// [`EventStore`] backed by a JSON file.
///
/// A missing file is an empty store.
#[derive(Debug, Clone)]
pub struct JsonFileEventStore {
    path: PathBuf,
}

impl JsonFileEventStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

impl EventStore for JsonFileEventStore {
    fn load(&self) -> Result<EventData> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No event file yet, starting empty");
                return Ok(EventData::new());
            }
            Err(e) => {
                return Err(ScraperError::EventStoreLoad {
                    location: self.location(),
                    message: e.to_string(),
                })
            }
        };

        serde_json::from_str(&content).map_err(|e| ScraperError::EventStoreLoad {
            location: self.location(),
            message: e.to_string(),
        })
    }

    fn store(&self, events: &EventData) -> Result<()> {
        let json = serde_json::to_string_pretty(events)?;
        fs::write(&self.path, json).map_err(|e| ScraperError::EventStoreWrite {
            location: self.location(),
            message: e.to_string(),
        })
    }
}

/// In-memory [`EventStore`], used for dry runs without a local cache and in tests.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    events: RefCell<EventData>,
}

impl MemoryEventStore {
    #[must_use]
    pub fn new(events: EventData) -> Self {
        Self {
            events: RefCell::new(events),
        }
    }

    /// Snapshot of the stored events.
    #[must_use]
    pub fn snapshot(&self) -> EventData {
        self.events.borrow().clone()
    }
}

impl EventStore for MemoryEventStore {
    fn load(&self) -> Result<EventData> {
        Ok(self.snapshot())
    }

    fn store(&self, events: &EventData) -> Result<()> {
        *self.events.borrow_mut() = events.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record() -> EventRecord {
        EventRecord {
            last_seen: "2024-06-13T08:00:00+00:00".to_string(),
            last_modified: "Wed, 12 Jun 2024 10:00:00 GMT".to_string(),
            run_id: None,
        }
    }

    #[test]
    fn test_json_store_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileEventStore::new(dir.path().join("events.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_json_store_roundtrip() {
        let dir = tempdir().unwrap();
        let store = JsonFileEventStore::new(dir.path().join("events.json"));

        let mut events = EventData::new();
        events.insert("https://example.org/a.pdf".to_string(), record());
        store.store(&events).unwrap();

        assert_eq!(store.load().unwrap(), events);
    }

    #[test]
    fn test_json_store_corrupt_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.json");
        fs::write(&path, "not json").unwrap();

        let err = JsonFileEventStore::new(&path).load().unwrap_err();
        assert!(matches!(err, ScraperError::EventStoreLoad { .. }));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryEventStore::default();
        let mut events = EventData::new();
        events.insert("u".to_string(), record());
        store.store(&events).unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }
}
