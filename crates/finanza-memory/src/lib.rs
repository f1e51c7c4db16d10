//! In-memory storage backend for Finanza.
//!
//! Behaves like the SQLite backend: ids grow monotonically, are never handed out
//! twice, and restart at 1 after `clear_all`.

use std::{
    collections::BTreeMap,
    sync::{PoisonError, RwLock},
};

use finanza_core::{
    FieldUpdate, Kind, KindTotals, NewTransaction, Period, StorageBackend, StorageError, Transaction,
    TransactionId, UpdateOutcome,
};

struct State {
    rows: BTreeMap<TransactionId, Transaction>,
    last_id: TransactionId,
}

pub struct InMemoryStorage {
    state: RwLock<State>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                rows: BTreeMap::new(),
                last_id: 0,
            }),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&State) -> T) -> T {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    fn write<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}

impl StorageBackend for InMemoryStorage {
    fn insert(&self, txn: &NewTransaction) -> Result<TransactionId, StorageError> {
        Ok(self.write(|state| {
            state.last_id += 1;
            let id = state.last_id;
            state.rows.insert(id, Transaction {
                id,
                kind: txn.kind,
                description: txn.description.clone(),
                amount: txn.amount,
                date: txn.date.clone(),
            });
            id
        }))
    }

    fn list_all(&self) -> Result<Vec<Transaction>, StorageError> {
        Ok(self.read(|state| state.rows.values().cloned().collect()))
    }

    fn list_by_kind(&self, kind: Kind) -> Result<Vec<Transaction>, StorageError> {
        Ok(self.read(|state| {
            state.rows.values()
                .filter(|t| t.kind == kind)
                .cloned()
                .collect()
        }))
    }

    fn get(&self, id: TransactionId) -> Result<Option<Transaction>, StorageError> {
        Ok(self.read(|state| state.rows.get(&id).cloned()))
    }

    fn delete_by_id(&self, id: TransactionId) -> Result<usize, StorageError> {
        Ok(self.write(|state| usize::from(state.rows.remove(&id).is_some())))
    }

    fn update_field(&self, id: TransactionId, update: &FieldUpdate) -> Result<UpdateOutcome, StorageError> {
        Ok(self.write(|state| {
            let Some(row) = state.rows.get_mut(&id) else {
                return UpdateOutcome::NotFound;
            };
            match update {
                FieldUpdate::Description(d) => row.description = d.clone(),
                FieldUpdate::Amount(a) => row.amount = *a,
                FieldUpdate::Date(d) => row.date = d.clone(),
                FieldUpdate::Kind(k) => row.kind = *k,
            }
            UpdateOutcome::Updated
        }))
    }

    fn clear_all(&self) -> Result<(), StorageError> {
        self.write(|state| {
            state.rows.clear();
            state.last_id = 0;
        });
        Ok(())
    }

    fn kind_totals(&self, period: Option<&Period>) -> Result<KindTotals, StorageError> {
        Ok(self.read(|state| {
            state.rows.values()
                .filter(|t| period.map_or(true, |p| p.contains(&t.date)))
                .fold(KindTotals::default(), |mut acc, t| {
                    match t.kind {
                        Kind::Income => acc.income += t.amount,
                        Kind::Expense => acc.expense += t.amount,
                    }
                    acc
                })
        }))
    }
}
