use std::sync::{Mutex, PoisonError};

use crate::{
    entry::{HistoryEntry, HistoryLog},
    error::{HistoryError, Result},
    storage::Storage,
};

/// Owner of the persisted generation log
///
/// The store is the only writer to its storage slot. Every mutation is a
/// read-modify-write performed under one lock that is never held across an
/// await point, so concurrent appends cannot lose each other's entries.
pub struct HistoryStore {
    storage: Box<dyn Storage>,
    max_entries: usize,
    log: Mutex<HistoryLog>,
}

impl HistoryStore {
    /// Create a store with an empty in-memory view; call [`Self::load`] to read storage
    pub fn new(storage: impl Storage + 'static, max_entries: usize) -> Self {
        Self {
            storage: Box::new(storage),
            max_entries: max_entries.max(1),
            log: Mutex::new(HistoryLog::new()),
        }
    }

    /// Create a store and immediately load whatever storage holds
    pub fn open(storage: impl Storage + 'static, max_entries: usize) -> Self {
        let store = Self::new(storage, max_entries);
        store.load();
        store
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Read the persisted log, replacing the in-memory view
    ///
    /// Missing storage yields an empty log. Unreadable or corrupt storage
    /// also yields an empty log; the problem is logged, never raised.
    pub fn load(&self) -> HistoryLog {
        let loaded = match self.read_persisted() {
            Ok(log) => log,
            Err(e) => {
                tracing::warn!(error = %e, "starting with empty history");
                HistoryLog::new()
            }
        };

        let mut log = self.lock();
        *log = loaded;
        log.clone()
    }

    /// Prepend `entry`, evict past the cap, persist, and return the new log
    ///
    /// A failed write is logged and the entry stays in memory for the rest
    /// of the session.
    pub fn append(&self, entry: HistoryEntry) -> HistoryLog {
        let mut log = self.lock();
        log.push_newest(entry, self.max_entries);

        if let Err(e) = self.persist(&log) {
            tracing::warn!(error = %e, "history kept in memory only");
        }

        log.clone()
    }

    /// The in-memory log as of the last load or append
    pub fn current(&self) -> HistoryLog {
        self.lock().clone()
    }

    fn read_persisted(&self) -> Result<HistoryLog> {
        let key = self.storage.key();

        let Some(raw) = self.storage.read().map_err(|source| HistoryError::Read {
            key: key.to_owned(),
            source,
        })?
        else {
            tracing::debug!(key, "no stored history");
            return Ok(HistoryLog::new());
        };

        let mut log: HistoryLog = serde_json::from_str(&raw).map_err(|source| HistoryError::Corrupt {
            key: key.to_owned(),
            source,
        })?;

        // A log written under a larger cap is trimmed on the way in
        log.truncate(self.max_entries);

        tracing::debug!(key, entries = log.len(), "loaded history");

        Ok(log)
    }

    fn persist(&self, log: &HistoryLog) -> Result<()> {
        let encoded = serde_json::to_string(log)?;

        self.storage.write(&encoded).map_err(|source| HistoryError::Persist {
            key: self.storage.key().to_owned(),
            source,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HistoryLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("key", &self.storage.key())
            .field("max_entries", &self.max_entries)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Arc;

    use centai_core::{GenerationOptions, GenerationRequest, GenerationResult};
    use jiff::Timestamp;

    use super::*;
    use crate::{
        MAX_HISTORY,
        storage::{FileStorage, MemoryStorage},
    };

    fn entry(n: usize) -> HistoryEntry {
        let request = GenerationRequest::new(format!("prompt {n}"), GenerationOptions::default()).unwrap();
        let url = url::Url::parse(&format!("https://x/{n}.png")).unwrap();
        let submitted_at = Timestamp::from_second(1_700_000_000 + i64::try_from(n).unwrap()).unwrap();

        HistoryEntry::new(&request, GenerationResult::new(url), submitted_at)
    }

    /// Shares its slot with the test so writes can be inspected after the store takes ownership
    #[derive(Clone, Default)]
    struct SharedStorage(Arc<MemoryStorage>);

    impl Storage for SharedStorage {
        fn key(&self) -> &str {
            "shared"
        }

        fn read(&self) -> io::Result<Option<String>> {
            self.0.read()
        }

        fn write(&self, contents: &str) -> io::Result<()> {
            self.0.write(contents)
        }
    }

    struct FailingStorage;

    impl Storage for FailingStorage {
        fn key(&self) -> &str {
            "failing"
        }

        fn read(&self) -> io::Result<Option<String>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }

        fn write(&self, _contents: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    #[test]
    fn fresh_store_loads_empty() {
        let store = HistoryStore::new(MemoryStorage::new(), MAX_HISTORY);
        assert!(store.load().is_empty());
        assert!(store.current().is_empty());
    }

    #[test]
    fn corrupt_store_loads_empty() {
        let store = HistoryStore::new(MemoryStorage::with_contents("{not json"), MAX_HISTORY);
        assert!(store.load().is_empty());

        let store = HistoryStore::new(MemoryStorage::with_contents(r#"{"result": 1}"#), MAX_HISTORY);
        assert!(store.load().is_empty());
    }

    #[test]
    fn unreadable_store_loads_empty() {
        let store = HistoryStore::new(FailingStorage, MAX_HISTORY);
        assert!(store.load().is_empty());
    }

    #[test]
    fn append_is_newest_first() {
        let store = HistoryStore::new(MemoryStorage::new(), MAX_HISTORY);

        store.append(entry(1));
        let log = store.append(entry(2));

        let prompts: Vec<_> = log.iter().map(|e| e.prompt.as_str()).collect();
        assert_eq!(prompts, ["prompt 2", "prompt 1"]);
        assert_eq!(store.current(), log);
    }

    #[test]
    fn append_past_cap_evicts_oldest() {
        let cap = 5;
        let extra = 3;
        let store = HistoryStore::new(MemoryStorage::new(), cap);

        for n in 0..cap + extra {
            store.append(entry(n));
        }

        let log = store.current();
        assert_eq!(log.len(), cap);

        let prompts: Vec<_> = log.iter().map(|e| e.prompt.clone()).collect();
        let expected: Vec<_> = (extra..cap + extra).rev().map(|n| format!("prompt {n}")).collect();
        assert_eq!(prompts, expected);
    }

    #[test]
    fn full_store_drops_exactly_the_oldest_entry() {
        let store = HistoryStore::new(MemoryStorage::new(), MAX_HISTORY);
        for n in 0..MAX_HISTORY {
            store.append(entry(n));
        }

        let log = store.append(entry(MAX_HISTORY));

        assert_eq!(log.len(), MAX_HISTORY);
        assert_eq!(log.latest().unwrap().prompt, format!("prompt {MAX_HISTORY}"));
        assert!(log.iter().all(|e| e.prompt != "prompt 0"));
        assert_eq!(log.as_slice()[MAX_HISTORY - 1].prompt, "prompt 1");
    }

    #[test]
    fn append_persists_the_whole_log() {
        let storage = SharedStorage::default();
        let store = HistoryStore::new(storage.clone(), MAX_HISTORY);

        let log = store.append(entry(1));

        let persisted: HistoryLog = serde_json::from_str(&storage.0.contents().unwrap()).unwrap();
        assert_eq!(persisted, log);
    }

    #[test]
    fn failed_persist_still_updates_memory() {
        let store = HistoryStore::new(FailingStorage, MAX_HISTORY);

        let log = store.append(entry(7));

        assert_eq!(log.len(), 1);
        assert_eq!(store.current().latest().unwrap().prompt, "prompt 7");
    }

    #[test]
    fn reopened_file_store_sees_previous_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image_history.json");

        let first = HistoryStore::open(FileStorage::new(&path), MAX_HISTORY);
        first.append(entry(1));
        first.append(entry(2));

        let second = HistoryStore::open(FileStorage::new(&path), MAX_HISTORY);
        assert_eq!(second.current(), first.current());
    }

    #[test]
    fn load_trims_to_a_smaller_cap() {
        let storage = SharedStorage::default();
        let wide = HistoryStore::new(storage.clone(), 10);
        for n in 0..10 {
            wide.append(entry(n));
        }

        let narrow = HistoryStore::open(storage, 3);
        let log = narrow.current();

        assert_eq!(log.len(), 3);
        assert_eq!(log.latest().unwrap().prompt, "prompt 9");
    }
}
