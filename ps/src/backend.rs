//! Storage backends for preference records
//!
//! Backends are fallible and dumb: they get and put whole records under a key.
//! Merging, bounding and failure softening live in [`crate::PreferenceStore`].

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use eyre::{Context, Result, eyre};
use fs2::FileExt;
use tracing::debug;

use crate::PreferenceRecord;

/// Raw key/value access to preference records
pub trait PreferenceBackend: Send + Sync {
    /// Fetch the record stored under `key`
    fn get(&self, key: &str) -> Result<Option<PreferenceRecord>>;

    /// Overwrite the record stored under `key`
    fn put(&self, key: &str, record: &PreferenceRecord) -> Result<()>;

    /// Remove the record stored under `key`, returning whether one existed
    fn remove(&self, key: &str) -> Result<bool>;

    /// All stored keys, sorted
    fn keys(&self) -> Result<Vec<String>>;
}

/// Process-local map, for tests and memory-less runs that still want recall
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: Mutex<HashMap<String, PreferenceRecord>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<PreferenceRecord>> {
        let records = self.records.lock().map_err(|_| eyre!("memory backend lock poisoned"))?;
        Ok(records.get(key).cloned())
    }

    fn put(&self, key: &str, record: &PreferenceRecord) -> Result<()> {
        let mut records = self.records.lock().map_err(|_| eyre!("memory backend lock poisoned"))?;
        records.insert(key.to_string(), record.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let mut records = self.records.lock().map_err(|_| eyre!("memory backend lock poisoned"))?;
        Ok(records.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let records = self.records.lock().map_err(|_| eyre!("memory backend lock poisoned"))?;
        let mut keys: Vec<String> = records.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

/// Remembers nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl PreferenceBackend for NullBackend {
    fn get(&self, _key: &str) -> Result<Option<PreferenceRecord>> {
        Ok(None)
    }

    fn put(&self, _key: &str, _record: &PreferenceRecord) -> Result<()> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<bool> {
        Ok(false)
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// One JSON document per user under a directory
///
/// ```text
/// preferences/
/// ├── .lock
/// ├── alice.json
/// └── bob%40example.com.json
/// ```
#[derive(Debug)]
pub struct FileBackend {
    base_path: PathBuf,
}

impl FileBackend {
    /// Open or create a file backend rooted at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).context("Failed to create preference store directory")?;
        debug!(?base_path, "Opened preference store");
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", encode_key(key)))
    }

    /// Hold an exclusive advisory lock on the store for the duration of `f`
    fn with_lock<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock_path = self.base_path.join(".lock");
        let lock = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .context(format!("Failed to open lock file: {}", lock_path.display()))?;
        lock.lock_exclusive().context("Failed to lock preference store")?;
        let result = f();
        let _ = FileExt::unlock(&lock);
        result
    }
}

impl PreferenceBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<PreferenceRecord>> {
        let path = self.record_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).context(format!("Failed to read {}", path.display()))?;
        let record = serde_json::from_str(&content).context(format!("Malformed record in {}", path.display()))?;
        Ok(Some(record))
    }

    fn put(&self, key: &str, record: &PreferenceRecord) -> Result<()> {
        let path = self.record_path(key);
        let json = serde_json::to_string_pretty(record)?;

        self.with_lock(|| {
            // Write-then-rename so a reader never sees a half-written record
            let tmp_path = path.with_extension("json.tmp");
            let mut tmp = fs::File::create(&tmp_path).context(format!("Failed to create {}", tmp_path.display()))?;
            tmp.write_all(json.as_bytes())?;
            tmp.sync_all()?;
            fs::rename(&tmp_path, &path).context(format!("Failed to replace {}", path.display()))?;
            debug!(?path, "put: wrote record");
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let path = self.record_path(key);
        self.with_lock(|| {
            if path.exists() {
                fs::remove_file(&path).context(format!("Failed to remove {}", path.display()))?;
                Ok(true)
            } else {
                Ok(false)
            }
        })
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                match decode_key(stem) {
                    Some(key) => keys.push(key),
                    None => debug!(%stem, "keys: skipping undecodable file name"),
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// Percent-encode everything outside `[A-Za-z0-9-_.~]` so any user id maps to
/// exactly one file name inside the store directory
fn encode_key(key: &str) -> String {
    urlencoding::encode(key).into_owned()
}

/// `None` for stems that are not valid percent-encoded UTF-8
fn decode_key(encoded: &str) -> Option<String> {
    urlencoding::decode(encoded).ok().map(|key| key.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_key_encoding_roundtrip() {
        for key in ["alice", "bob@example.com", "../etc/passwd", "名前", "a b", ".."] {
            let encoded = encode_key(key);
            assert!(!encoded.contains('/'));
            assert_eq!(decode_key(&encoded).as_deref(), Some(key));
        }
        assert!(decode_key("%FF%FE").is_none());
    }

    #[test]
    fn test_file_backend_dot_keys_stay_inside_store() {
        let temp = TempDir::new().unwrap();
        let store_dir = temp.path().join("store");
        let backend = FileBackend::open(&store_dir).unwrap();

        backend.put("..", &PreferenceRecord::new("dots", "")).unwrap();
        backend.put("../escape", &PreferenceRecord::new("slash", "")).unwrap();

        assert!(store_dir.join("...json").is_file());
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
        assert_eq!(backend.get("..").unwrap().unwrap().preferences, "dots");
        assert_eq!(backend.get("../escape").unwrap().unwrap().preferences, "slash");
        assert_eq!(backend.keys().unwrap(), vec!["..", "../escape"]);
    }

    #[test]
    fn test_file_backend_skips_undecodable_names() {
        let temp = TempDir::new().unwrap();
        let backend = FileBackend::open(temp.path()).unwrap();
        backend.put("alice", &PreferenceRecord::default()).unwrap();
        fs::write(temp.path().join("%FF.json"), "{}").unwrap();

        assert_eq!(backend.keys().unwrap(), vec!["alice"]);
    }

    #[test]
    fn test_file_backend_put_get() {
        let temp = TempDir::new().unwrap();
        let backend = FileBackend::open(temp.path()).unwrap();

        let record = PreferenceRecord::new("budget", "museums").with_destinations(["Rome"]);
        backend.put("alice", &record).unwrap();

        let loaded = backend.get("alice").unwrap().unwrap();
        assert_eq!(loaded, record);
        assert!(backend.get("bob").unwrap().is_none());
    }

    #[test]
    fn test_file_backend_overwrites() {
        let temp = TempDir::new().unwrap();
        let backend = FileBackend::open(temp.path()).unwrap();

        backend.put("alice", &PreferenceRecord::new("budget", "")).unwrap();
        backend.put("alice", &PreferenceRecord::new("luxury", "")).unwrap();

        assert_eq!(backend.get("alice").unwrap().unwrap().preferences, "luxury");
        assert_eq!(backend.keys().unwrap(), vec!["alice"]);
    }

    #[test]
    fn test_file_backend_malformed_record_is_error() {
        let temp = TempDir::new().unwrap();
        let backend = FileBackend::open(temp.path()).unwrap();
        fs::write(temp.path().join("alice.json"), "{not json").unwrap();

        assert!(backend.get("alice").is_err());
    }

    #[test]
    fn test_file_backend_list_and_remove() {
        let temp = TempDir::new().unwrap();
        let backend = FileBackend::open(temp.path()).unwrap();

        backend.put("zed", &PreferenceRecord::default()).unwrap();
        backend.put("amy@example.com", &PreferenceRecord::default()).unwrap();

        assert_eq!(backend.keys().unwrap(), vec!["amy@example.com", "zed"]);
        assert!(backend.remove("zed").unwrap());
        assert!(!backend.remove("zed").unwrap());
        assert_eq!(backend.keys().unwrap(), vec!["amy@example.com"]);
    }

    #[test]
    fn test_memory_backend() {
        let backend = MemoryBackend::new();
        assert!(backend.get("alice").unwrap().is_none());
        backend.put("alice", &PreferenceRecord::new("solo", "")).unwrap();
        assert_eq!(backend.get("alice").unwrap().unwrap().preferences, "solo");
        assert!(backend.remove("alice").unwrap());
        assert!(backend.keys().unwrap().is_empty());
    }

    #[test]
    fn test_null_backend_remembers_nothing() {
        let backend = NullBackend;
        backend.put("alice", &PreferenceRecord::new("solo", "")).unwrap();
        assert!(backend.get("alice").unwrap().is_none());
    }
}
