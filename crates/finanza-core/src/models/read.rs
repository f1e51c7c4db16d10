use std::sync::Arc;

use super::{IsoDate, Kind, TransactionId};

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub kind: Kind,
    pub description: Arc<str>,
    pub amount: f64,
    pub date: IsoDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    NotFound,
}

impl UpdateOutcome {
    pub fn from_rows(rows: usize) -> Self {
        if rows == 0 {
            UpdateOutcome::NotFound
        } else {
            UpdateOutcome::Updated
        }
    }
}

/// Raw per-kind sums as returned by a store.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KindTotals {
    pub income: f64,
    pub expense: f64,
}
