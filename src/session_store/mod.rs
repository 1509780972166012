//! Session-scoped key/value persistence.
//!
//! Provides a trait-based interface so the job tracker never depends on a
//! particular storage mechanism. Values are opaque documents (JSON text).

mod memory;
mod sqlite;

pub use memory::MemorySessionStore;
pub use sqlite::SqliteSessionStore;

use crate::config::{SessionProvider, Settings};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for session store implementations.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the document stored under `key`, if any.
    async fn load(&self, key: &str) -> Result<Option<String>>;

    /// Replace the document stored under `key`.
    async fn save(&self, key: &str, document: &str) -> Result<()>;

    /// Delete the document stored under `key`.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Open the session store configured in `settings`.
pub fn open_store(settings: &Settings) -> Result<Arc<dyn SessionStore>> {
    match settings.session.provider {
        SessionProvider::Memory => Ok(Arc::new(MemorySessionStore::new())),
        SessionProvider::Sqlite => Ok(Arc::new(SqliteSessionStore::new(
            &settings.sqlite_path(),
            &settings.session.name,
        )?)),
    }
}
