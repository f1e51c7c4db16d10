use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, PoisonError,
    },
    time::Duration,
};

use finanza_core::StorageError;
use rusqlite::{Connection, Transaction};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS transacoes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        tipo TEXT NOT NULL,
        descricao TEXT NOT NULL,
        valor REAL NOT NULL,
        data TEXT NOT NULL
    );
";

pub(crate) fn sql_err(e: rusqlite::Error) -> StorageError {
    StorageError::Other(e.to_string())
}

/// Opens a fresh connection per unit of work and commits only when the work succeeds.
pub struct Gateway {
    path: PathBuf,
    busy_timeout: Duration,
    lock: Mutex<()>,
    schema_ready: AtomicBool,
}

impl Gateway {
    pub fn new(path: impl Into<PathBuf>, busy_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            busy_timeout,
            lock: Mutex::new(()),
            schema_ready: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Connection, StorageError> {
        let conn = Connection::open(&self.path).map_err(sql_err)?;
        conn.busy_timeout(self.busy_timeout).map_err(sql_err)?;
        Ok(conn)
    }

    /// Runs `work` inside a transaction.
    ///
    /// `Ok` commits, `Err` rolls back and is returned unchanged. The connection is
    /// closed before this returns on every path. The table is created on the first
    /// unit of work that commits.
    pub fn run<T, F>(&self, work: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, StorageError>,
    {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut conn = self.open()?;
        let tx = conn.transaction().map_err(sql_err)?;

        let needs_schema = !self.schema_ready.load(Ordering::Acquire);
        let result = if needs_schema {
            tx.execute_batch(SCHEMA).map_err(sql_err).and_then(|_| work(&tx))
        } else {
            work(&tx)
        };

        match result {
            Ok(value) => {
                tx.commit().map_err(sql_err)?;
                if needs_schema {
                    self.schema_ready.store(true, Ordering::Release);
                }
                tracing::debug!(path = %self.path.display(), "SQLite unit of work committed");
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback() {
                    tracing::debug!(error = %rollback_err, "SQLite rollback failed");
                }
                tracing::debug!(path = %self.path.display(), error = %e, "SQLite unit of work rolled back");
                Err(e)
            }
        }
    }
}
