use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use anyhow::{Context, Result};
use desk_shared::domain::{LogEntry, LogLevel};
use desk_storage::KeyValueStore;
use tracing::{error, warn};

pub const LOGS_STORAGE_KEY: &str = "desk-logs";
/// Entries kept; appending beyond this drops the oldest.
pub const LOG_CAPACITY: usize = 100;

pub struct LogStore {
    entries: Mutex<VecDeque<LogEntry>>,
    store: Arc<dyn KeyValueStore>,
}

impl LogStore {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let entries = match read_entries(store.as_ref()) {
            Ok(Some(mut entries)) => {
                entries.truncate(LOG_CAPACITY);
                entries
            }
            Ok(None) => VecDeque::new(),
            Err(err) => {
                warn!(error = %format!("{err:#}"), "failed to load logs, starting empty");
                VecDeque::new()
            }
        };

        Self {
            entries: Mutex::new(entries),
            store,
        }
    }

    pub fn append(&self, level: LogLevel, message: impl Into<String>) {
        self.append_raw(LogEntry::stamped(level, message));
    }

    pub fn append_raw(&self, entry: LogEntry) {
        let mut entries = self.lock();
        entries.push_front(entry);
        entries.truncate(LOG_CAPACITY);
        self.persist(&entries);
    }

    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.clear();
        self.persist(&entries);
    }

    /// Newest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, entries: &VecDeque<LogEntry>) {
        let written = serde_json::to_string(entries)
            .context("failed to serialize logs")
            .and_then(|text| self.store.set_string(LOGS_STORAGE_KEY, &text));
        if let Err(err) = written {
            error!(error = %format!("{err:#}"), "failed to save logs");
        }
    }
}

fn read_entries(store: &dyn KeyValueStore) -> Result<Option<VecDeque<LogEntry>>> {
    let Some(text) = store.get_string(LOGS_STORAGE_KEY)? else {
        return Ok(None);
    };
    let entries = serde_json::from_str(&text).context("persisted logs are not valid JSON")?;
    Ok(Some(entries))
}

#[cfg(test)]
#[path = "tests/log_store_tests.rs"]
mod tests;
