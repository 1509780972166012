//! SQLite-based session store.
//!
//! All entries live in one table keyed by (session, key), so several named
//! sessions can share a database file.

use super::SessionStore;
use crate::error::{Result, TunegrabError};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS session_entries (
        session TEXT NOT NULL,
        key TEXT NOT NULL,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        PRIMARY KEY (session, key)
    );
"#;

/// SQLite-based session store scoped to one session name.
pub struct SqliteSessionStore {
    conn: Mutex<Connection>,
    session: String,
}

impl SqliteSessionStore {
    /// Open (or create) the store at `path` for the given session.
    #[instrument(skip_all)]
    pub fn new(path: &Path, session: &str) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Opened session store at {:?} (session '{}')", path, session);

        Ok(Self {
            conn: Mutex::new(conn),
            session: session.to_string(),
        })
    }

    /// Create an in-memory SQLite store (useful for testing).
    pub fn in_memory(session: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
            session: session.to_string(),
        })
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| TunegrabError::SessionStore("connection lock poisoned".to_string()))
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM session_entries WHERE session = ?1 AND key = ?2",
                params![self.session, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    async fn save(&self, key: &str, document: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO session_entries (session, key, value, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(session, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![self.session, key, document, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM session_entries WHERE session = ?1 AND key = ?2",
            params![self.session, key],
        )?;
        Ok(())
    }
}
