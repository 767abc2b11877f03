use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

#[cfg(test)]
use std::collections::BTreeMap;

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{
    constants::FILE_SETTINGS,
    error::{Result, TrackerError},
};

/// String-keyed persistent store. Values are opaque serialized text.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// A typed schema for one key namespace.
pub trait StoredRecord: Serialize + DeserializeOwned {
    fn fallback() -> Self;

    /// Runs on every load, after deserialization.
    fn normalize(self) -> Self {
        self
    }
}

/// One `<key>.json` file per key inside a data directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| TrackerError::io(&root, e))?;
        debug!(root = %root.display(), "opened file store");
        Ok(FileStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if !is_valid_key(key) {
            return Err(TrackerError::InvalidKey(key.to_string()));
        }
        Ok(self
            .root
            .join(format!("{}.{}", key, FILE_SETTINGS.record_extension)))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(TrackerError::io(path, e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        atomic_write(&path, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        delete_file_if_exists(&path)
    }
}

#[cfg(test)]
#[derive(Default, Debug)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

#[cfg(test)]
impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Returns the stored value, or `default` when the key is absent, unreadable or malformed.
pub fn load<T: DeserializeOwned>(store: &dyn KvStore, key: &str, default: T) -> T {
    let content = match store.get(key) {
        Ok(Some(content)) => content,
        Ok(None) => {
            debug!(key, "no stored value, using default");
            return default;
        }
        Err(e) => {
            warn!(key, error = %e, "could not read stored value, using default");
            return default;
        }
    };

    match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "stored value is malformed, using default");
            default
        }
    }
}

pub fn save<T: Serialize + ?Sized>(store: &mut dyn KvStore, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value).map_err(|source| TrackerError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &json)?;
    debug!(key, bytes = json.len(), "saved value");
    Ok(())
}

pub fn remove(store: &mut dyn KvStore, key: &str) -> Result<()> {
    store.remove(key)?;
    debug!(key, "removed value");
    Ok(())
}

pub fn load_record<R: StoredRecord>(store: &dyn KvStore, key: &str) -> R {
    load(store, key, R::fallback()).normalize()
}

pub fn delete_file_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(TrackerError::io(path, e)),
    }
}

pub fn write_text_file(path: &Path, content: &str) -> Result<()> {
    atomic_write(path, content)
}

pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let tmp_path = path.with_extension("tmp");
    let mut tmp_file = File::create(&tmp_path).map_err(|e| TrackerError::io(&tmp_path, e))?;
    tmp_file
        .write_all(content.as_bytes())
        .map_err(|e| TrackerError::io(&tmp_path, e))?;
    tmp_file
        .sync_all()
        .map_err(|e| TrackerError::io(&tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| TrackerError::io(path, e))?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{collections::BTreeMap, fs, path::PathBuf, time::SystemTime};

    use serde::{Deserialize, Serialize};

    use super::*;

    pub(crate) fn unique_path(prefix: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        PathBuf::from(format!("/tmp/{}_{}", prefix, now))
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
    struct TestJsonValue {
        name: String,
        count: usize,
    }

    #[test]
    fn test_round_trip_in_memory() {
        let mut store = MemoryStore::new();
        let value = TestJsonValue {
            name: "sample".to_string(),
            count: 3,
        };

        save(&mut store, "sample_key", &value).unwrap();
        let loaded = load(
            &store,
            "sample_key",
            TestJsonValue {
                name: String::new(),
                count: 0,
            },
        );
        assert_eq!(loaded, value);
    }

    #[test]
    fn test_missing_key_returns_default() {
        let store = MemoryStore::new();
        let default = vec!["a".to_string(), "b".to_string()];
        let loaded: Vec<String> = load(&store, "never_saved", default.clone());
        assert_eq!(loaded, default);
    }

    #[test]
    fn test_malformed_value_returns_default() {
        let mut store = MemoryStore::new();
        store.set("broken", "{not json").unwrap();
        let loaded: BTreeMap<String, u32> = load(&store, "broken", BTreeMap::new());
        assert!(loaded.is_empty());

        store.set("wrong_shape", "[1, 2, 3]").unwrap();
        let loaded: BTreeMap<String, u32> = load(&store, "wrong_shape", BTreeMap::new());
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_remove_absent_key_is_noop() {
        let mut store = MemoryStore::new();
        remove(&mut store, "nothing_here").unwrap();
        assert!(!store.contains("nothing_here"));
    }

    #[test]
    fn test_file_store_round_trip() {
        let root = unique_path("cherry_file_store");
        let mut store = FileStore::open(&root).unwrap();
        let value = TestJsonValue {
            name: "file".to_string(),
            count: 7,
        };

        save(&mut store, "tracker_time_2024-02", &value).unwrap();
        assert!(root.join("tracker_time_2024-02.json").exists());
        assert!(!root.join("tracker_time_2024-02.tmp").exists());

        let loaded = load(
            &store,
            "tracker_time_2024-02",
            TestJsonValue {
                name: String::new(),
                count: 0,
            },
        );
        assert_eq!(loaded, value);

        remove(&mut store, "tracker_time_2024-02").unwrap();
        assert!(store.get("tracker_time_2024-02").unwrap().is_none());
        remove(&mut store, "tracker_time_2024-02").unwrap();

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn test_file_store_overwrites() {
        let root = unique_path("cherry_file_store_overwrite");
        let mut store = FileStore::open(&root).unwrap();

        save(&mut store, "k", &vec![1, 2, 3]).unwrap();
        save(&mut store, "k", &vec![4]).unwrap();
        let loaded: Vec<u32> = load(&store, "k", Vec::new());
        assert_eq!(loaded, vec![4]);

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let root = unique_path("cherry_file_store_keys");
        let mut store = FileStore::open(&root).unwrap();

        assert!(matches!(
            store.set("../escape", "1"),
            Err(TrackerError::InvalidKey(_))
        ));
        assert!(matches!(store.get(""), Err(TrackerError::InvalidKey(_))));

        fs::remove_dir_all(root).ok();
    }
}
