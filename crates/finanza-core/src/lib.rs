//! Core types and traits for Finanza storage backends.
//!
//! This crate provides the `StorageBackend` trait, the transaction model with its
//! validation rules, and the `BalanceCalculator` shared by every front end.

pub mod balance;
pub mod models;
pub mod storage;

// Re-export key types at crate root for convenience
pub use balance::{BalanceCalculator, BalanceSummary};
pub use models::{parse_amount, parse_id, AmountPolicy, IsoDate, Kind, Period, TransactionId, ValidationError};
pub use models::write::{FieldUpdate, NewTransaction, TransactionField};
pub use models::read::{KindTotals, Transaction, UpdateOutcome};
pub use storage::{StorageBackend, StorageError};
