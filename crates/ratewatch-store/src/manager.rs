use crate::error::{Result, StoreError};
use crate::sqlite::SqliteValueStore;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Owns the data directory and hands out one [`SqliteValueStore`] per scope.
///
/// A scope is the monitored-object identity (a host, or a host+service
/// pair). Different scopes are fully independent and may be used
/// concurrently; serializing invocations *within* one scope is the
/// scheduler's job, not the store's.
///
/// The manager also owns scope lifecycle: stores are never expired by the
/// rate engine, only dropped here when the monitored object itself goes away
/// (see [`StoreManager::retain_scopes`]).
pub struct StoreManager {
    data_dir: PathBuf,
    stores: Mutex<HashMap<String, Arc<SqliteValueStore>>>,
}

impl StoreManager {
    pub fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            stores: Mutex::new(HashMap::new()),
        })
    }

    fn lock_stores(&self) -> MutexGuard<'_, HashMap<String, Arc<SqliteValueStore>>> {
        self.stores
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Maps a scope id to a filename-safe store key. Not injective for
    /// exotic scope ids; two scopes differing only in unsafe characters
    /// share a file. Scope ids are hostnames and service names in practice.
    fn store_key(scope_id: &str) -> Result<String> {
        let key: String = scope_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if key.is_empty() || key.chars().all(|c| c == '.') {
            return Err(StoreError::InvalidScope {
                scope: scope_id.to_string(),
            });
        }
        Ok(key)
    }

    fn store_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}.db"))
    }

    /// Returns the store for `scope_id`, creating an empty one on first use.
    pub fn get_store(&self, scope_id: &str) -> Result<Arc<SqliteValueStore>> {
        let key = Self::store_key(scope_id)?;
        let mut stores = self.lock_stores();
        if let Some(store) = stores.get(&key) {
            return Ok(Arc::clone(store));
        }
        let path = self.store_path(&key);
        let store = Arc::new(SqliteValueStore::open(&path, scope_id)?);
        tracing::info!(scope = scope_id, path = %path.display(), "Opened value store");
        stores.insert(key, Arc::clone(&store));
        Ok(store)
    }

    /// Store keys present on disk, whether or not they are currently open.
    pub fn list_scopes(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(stem) = name.strip_suffix(".db") {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }

    /// Drops the store for `scope_id` and deletes its backing files.
    pub fn remove_scope(&self, scope_id: &str) -> Result<()> {
        let key = Self::store_key(scope_id)?;
        self.lock_stores().remove(&key);
        self.delete_store_files(&key)?;
        tracing::info!(scope = scope_id, "Removed value store");
        Ok(())
    }

    /// Garbage collection: deletes every store whose scope is not in `live`.
    /// Returns the number of stores removed.
    pub fn retain_scopes(&self, live: &HashSet<String>) -> Result<u32> {
        let live_keys: HashSet<String> = live
            .iter()
            .filter_map(|scope| Self::store_key(scope).ok())
            .collect();
        let mut removed = 0u32;
        for key in self.list_scopes()? {
            if !live_keys.contains(&key) {
                self.lock_stores().remove(&key);
                self.delete_store_files(&key)?;
                tracing::info!(store = %key, "Garbage collected value store");
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn delete_store_files(&self, key: &str) -> Result<()> {
        // SQLite WAL leaves sidecar files next to the database.
        for suffix in ["", "-wal", "-shm"] {
            let path = self.data_dir.join(format!("{key}.db{suffix}"));
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
