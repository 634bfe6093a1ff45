//! Durable per-scope value store for counter history.
//!
//! Checks are re-invoked as short-lived executions every monitoring cycle, so
//! the previous counter reading has to survive outside the process. Each
//! monitored object (*scope*) owns an independent store; the default
//! implementation ([`sqlite::SqliteValueStore`]) keeps one SQLite database per
//! scope under a common data directory, managed by [`manager::StoreManager`].
//!
//! Stored values are opaque JSON documents written atomically per key, so a
//! `(timestamp, value)` reference point can never be observed half-updated.

pub mod error;
pub mod manager;
pub mod memory;
pub mod sqlite;


pub use error::{Result, StoreError};
pub use manager::StoreManager;
pub use memory::MemoryValueStore;
pub use sqlite::SqliteValueStore;

/// Keyed persistence for one scope's counter history.
///
/// Implementations must be safe to share across threads (`Send + Sync`); a
/// single invocation may track many keys (one per interface counter, for
/// example), and access to one key must never corrupt another.
///
/// `set` replaces the whole document for a key in one atomic step; there is
/// no partial update. Deletion and expiry are deliberately absent here: entry
/// lifecycle belongs to the scope lifecycle (see [`StoreManager`]), never to
/// the code computing rates.
pub trait ValueStore: Send + Sync {
    /// Returns the stored document for `key`, or `None` if the key has never
    /// been written in this scope.
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>>;

    /// Durably stores `value` under `key`, replacing any previous document.
    /// Once this returns `Ok`, the write is visible to the next invocation
    /// even if the process exits immediately afterwards.
    fn set(&self, key: &str, value: &serde_json::Value) -> Result<()>;
}
