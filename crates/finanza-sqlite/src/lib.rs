//! SQLite storage backend for Finanza.
//!
//! [`Gateway`] owns the connection lifecycle of one unit of work; [`SqliteStorage`]
//! implements the repository on top of it against the `transacoes` table.

mod gateway;
mod sqlite_storage;

pub use gateway::Gateway;
pub use sqlite_storage::SqliteStorage;
