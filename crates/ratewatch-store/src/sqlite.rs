use crate::error::Result;
use crate::ValueStore;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS counters (
    key TEXT PRIMARY KEY,
    payload TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);
";

/// SQLite-backed [`ValueStore`] for one scope.
///
/// The database runs in WAL mode with `synchronous=FULL`, so a completed
/// `set` survives a crash of the check process. Each key maps to one row and
/// each write is a single upsert, which keeps entries torn-write free without
/// any locking beyond the connection itself.
pub struct SqliteValueStore {
    conn: Mutex<Connection>,
    scope: String,
}

impl SqliteValueStore {
    pub fn open(path: &Path, scope: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=FULL;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            scope: scope.to_string(),
        })
    }

    /// The scope this store belongs to.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    fn lock_conn(&self) -> MutexGuard<'_, Connection> {
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn now_millis() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

impl ValueStore for SqliteValueStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare_cached("SELECT payload FROM counters WHERE key = ?1")?;
        let payload: Option<String> = stmt
            .query_row(rusqlite::params![key], |row| row.get(0))
            .optional()?;
        match payload {
            None => Ok(None),
            Some(text) => match serde_json::from_str(&text) {
                Ok(value) => Ok(Some(value)),
                Err(e) => {
                    // A corrupt row degrades to "no history" rather than
                    // failing the whole check; the next set overwrites it.
                    tracing::warn!(
                        scope = %self.scope,
                        key,
                        error = %e,
                        "Discarding unreadable value store entry"
                    );
                    Ok(None)
                }
            },
        }
    }

    fn set(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let payload = serde_json::to_string(value)?;
        let conn = self.lock_conn();
        let mut stmt = conn.prepare_cached(
            "INSERT INTO counters (key, payload, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                 payload = excluded.payload,
                 updated_at = excluded.updated_at",
        )?;
        stmt.execute(rusqlite::params![key, payload, Self::now_millis()])?;
        Ok(())
    }
}
