use crate::models::{
    read::{KindTotals, Transaction, UpdateOutcome},
    write::{FieldUpdate, NewTransaction},
    Kind, Period, TransactionId,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
    #[error("invalid row {id}: {reason}")]
    InvalidRow { id: TransactionId, reason: String },
}

/// The repository surface shared by the console and the chat bot.
///
/// Every method is one unit of work: it either completes entirely or leaves the
/// store untouched.
pub trait StorageBackend: Send + Sync {
    fn insert(&self, txn: &NewTransaction) -> Result<TransactionId, StorageError>;
    fn list_all(&self) -> Result<Vec<Transaction>, StorageError>;
    fn list_by_kind(&self, kind: Kind) -> Result<Vec<Transaction>, StorageError>;
    fn get(&self, id: TransactionId) -> Result<Option<Transaction>, StorageError>;
    /// Returns the number of rows removed, 0 or 1.
    fn delete_by_id(&self, id: TransactionId) -> Result<usize, StorageError>;
    fn update_field(&self, id: TransactionId, update: &FieldUpdate) -> Result<UpdateOutcome, StorageError>;
    /// Removes every row and restarts id generation at 1.
    fn clear_all(&self) -> Result<(), StorageError>;
    fn kind_totals(&self, period: Option<&Period>) -> Result<KindTotals, StorageError>;
}
