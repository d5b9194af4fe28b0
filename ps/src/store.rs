//! PreferenceStore - the soft-failing adapter the pipeline talks to

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::backend::{FileBackend, MemoryBackend, NullBackend, PreferenceBackend};
use crate::{DEFAULT_MAX_DESTINATIONS, PreferenceRecord};

/// Outcome of a save; failures are reported, never raised
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Record written
    Saved,
    /// Nothing to do (no user id)
    Skipped,
    /// Backend refused the write
    Failed(String),
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved)
    }
}

/// Keyed preference memory
///
/// Every operation tolerates an empty user id and converts backend errors
/// into "absent" / [`SaveOutcome::Failed`] with a logged warning, so a run
/// with a broken or missing store still completes.
pub struct PreferenceStore {
    backend: Box<dyn PreferenceBackend>,
    max_destinations: usize,
    key_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl PreferenceStore {
    pub fn new(backend: Box<dyn PreferenceBackend>) -> Self {
        Self {
            backend,
            max_destinations: DEFAULT_MAX_DESTINATIONS,
            key_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Store backed by one JSON file per user under `path`
    pub fn open(path: impl AsRef<std::path::Path>) -> eyre::Result<Self> {
        Ok(Self::new(Box::new(FileBackend::open(path)?)))
    }

    /// Store that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::new()))
    }

    /// Store that never remembers anything
    pub fn null() -> Self {
        Self::new(Box::new(NullBackend))
    }

    pub fn with_max_destinations(mut self, max_destinations: usize) -> Self {
        self.max_destinations = max_destinations.max(1);
        self
    }

    pub fn max_destinations(&self) -> usize {
        self.max_destinations
    }

    /// Read the record for `user_id`, if any
    pub fn load(&self, user_id: &str) -> Option<PreferenceRecord> {
        match self.try_load(user_id) {
            Ok(record) => record,
            Err(e) => {
                warn!(%user_id, error = %e, "Could not load saved preferences, continuing without them");
                None
            }
        }
    }

    /// Like [`PreferenceStore::load`], but a backend failure is returned
    /// instead of being folded into "absent"
    pub fn try_load(&self, user_id: &str) -> eyre::Result<Option<PreferenceRecord>> {
        let key = user_id.trim();
        debug!(%key, "try_load: called");
        if key.is_empty() {
            debug!("try_load: empty user id, nothing to load");
            return Ok(None);
        }

        let record = self.backend.get(key)?;
        debug!(found = record.is_some(), "try_load: backend returned");
        Ok(record)
    }

    /// Overwrite the record for `user_id`
    ///
    /// `past_destinations` is normalised first: duplicates dropped, only the
    /// most recent `max_destinations` kept.
    pub fn save(&self, user_id: &str, record: &PreferenceRecord) -> SaveOutcome {
        let key = user_id.trim();
        debug!(%key, "save: called");
        if key.is_empty() {
            debug!("save: empty user id, skipping");
            return SaveOutcome::Skipped;
        }

        let lock = self.key_lock(key);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.write(key, record.clone())
    }

    /// Fold this run into the stored record: replace preferences and hobbies,
    /// append the destination if new, evict the oldest beyond the bound.
    ///
    /// The load-merge-overwrite sequence is serialised per user id. If the
    /// existing record cannot be read the save is abandoned and the stored
    /// record is left as it was.
    pub fn remember(&self, user_id: &str, preferences: &str, hobbies: &str, destination: &str) -> SaveOutcome {
        let key = user_id.trim();
        debug!(%key, %destination, "remember: called");
        if key.is_empty() {
            debug!("remember: empty user id, skipping");
            return SaveOutcome::Skipped;
        }

        let lock = self.key_lock(key);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut record = match self.backend.get(key) {
            Ok(existing) => existing.unwrap_or_default(),
            Err(e) => {
                warn!(user_id = %key, error = %e, "Existing preferences unreadable, not saving");
                return SaveOutcome::Failed(format!("could not read existing preferences: {}", e));
            }
        };
        record.preferences = preferences.to_string();
        record.hobbies = hobbies.to_string();
        record.remember_destination(destination, self.max_destinations);

        self.write(key, record)
    }

    /// Delete the record for `user_id`
    pub fn forget(&self, user_id: &str) -> eyre::Result<bool> {
        let key = user_id.trim();
        if key.is_empty() {
            return Ok(false);
        }
        let lock = self.key_lock(key);
        let guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let removed = self.backend.remove(key);
        drop(guard);
        drop(lock);
        self.release_key_lock(key);
        removed
    }

    /// All user ids with a stored record
    pub fn users(&self) -> eyre::Result<Vec<String>> {
        self.backend.keys()
    }

    fn write(&self, key: &str, mut record: PreferenceRecord) -> SaveOutcome {
        record.normalize(self.max_destinations);
        record.updated_at = Some(chrono::Utc::now().timestamp_millis());

        match self.backend.put(key, &record) {
            Ok(()) => {
                info!(user_id = %key, destinations = record.past_destinations.len(), "Saved preferences");
                SaveOutcome::Saved
            }
            Err(e) => {
                warn!(user_id = %key, error = %e, "Could not save preferences");
                SaveOutcome::Failed(e.to_string())
            }
        }
    }

    fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.key_locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(key.to_string()).or_default().clone()
    }

    /// Drop the lock entry for `key` unless another caller still holds it
    fn release_key_lock(&self, key: &str) {
        let mut locks = self.key_locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if locks.get(key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(key);
        }
    }
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("max_destinations", &self.max_destinations)
            .finish_non_exhaustive()
    }
}
