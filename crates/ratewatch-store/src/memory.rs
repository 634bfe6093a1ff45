use crate::error::Result;
use crate::ValueStore;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// In-memory [`ValueStore`] with no durability.
///
/// Intended for unit tests and for embedding the rate engine in long-lived
/// processes that keep their own history; a short-lived check process should
/// use [`crate::SqliteValueStore`] instead.
#[derive(Default)]
pub struct MemoryValueStore {
    entries: Mutex<HashMap<String, serde_json::Value>>,
}

impl MemoryValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, serde_json::Value>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ValueStore for MemoryValueStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.lock_entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        self.lock_entries().insert(key.to_string(), value.clone());
        Ok(())
    }
}
