//! Opaque key-value persistence for the session token, profile and session log.
//!
//! Native builds use a single-table SQLite file; the in-memory store backs
//! tests and builds without the `native` feature.

use std::collections::HashMap;

use anyhow::Result;

pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
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

#[cfg(feature = "native")]
pub use sqlite::SqliteStore;

#[cfg(feature = "native")]
mod sqlite {
    use anyhow::{Context, Result};
    use rusqlite::{params, Connection, OptionalExtension};

    use super::KeyValueStore;

    pub struct SqliteStore {
        conn: Connection,
    }

    impl SqliteStore {
        pub fn open(path: &str) -> Result<Self> {
            let conn = Connection::open(path).with_context(|| format!("opening state db {path}"))?;
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "busy_timeout", 250)?;
            Self::init(conn)
        }

        pub fn open_in_memory() -> Result<Self> {
            Self::init(Connection::open_in_memory()?)
        }

        fn init(conn: Connection) -> Result<Self> {
            conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS kv(
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );
                "#,
            )?;
            log::debug!("[storage] kv table ready");
            Ok(Self { conn })
        }
    }

    impl KeyValueStore for SqliteStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            let value = self
                .conn
                .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
                .optional()?;
            Ok(value)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            self.conn.execute(
                "INSERT INTO kv(key, value) VALUES(?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
            Ok(())
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
            Ok(())
        }
    }
}
