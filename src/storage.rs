use std::{path::Path, sync::Arc};

use finanza_memory::InMemoryStorage;
use finanza_sqlite::SqliteStorage;

use crate::config::Config;

// Re-export core storage types so front ends only depend on this module
pub use finanza_core::storage::{StorageBackend, StorageError};

pub const MEMORY_PATH: &str = ":memory:";

/// Picks the backend for the configured path. `:memory:` keeps everything in process.
pub fn open(config: &Config) -> Arc<dyn StorageBackend> {
    let path = config.storage.path.as_path();
    if path == Path::new(MEMORY_PATH) {
        tracing::info!("Using in-memory storage; data is lost on exit");
        return Arc::new(InMemoryStorage::new());
    }

    tracing::info!("Using SQLite database at {}", path.display());
    Arc::new(SqliteStorage::new(path, config.busy_timeout()))
}
