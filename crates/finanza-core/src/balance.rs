use std::sync::Arc;

use crate::{
    models::{read::KindTotals, Period},
    storage::{StorageBackend, StorageError},
};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BalanceSummary {
    pub income: f64,
    pub expense: f64,
    pub net: f64,
}

impl From<KindTotals> for BalanceSummary {
    fn from(totals: KindTotals) -> Self {
        Self {
            income: totals.income,
            expense: totals.expense,
            net: totals.income - totals.expense,
        }
    }
}

pub struct BalanceCalculator {
    storage: Arc<dyn StorageBackend>,
}

impl BalanceCalculator {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            storage,
        }
    }

    pub fn total_balance(&self) -> Result<BalanceSummary, StorageError> {
        let totals = self.storage.kind_totals(None)?;
        Ok(totals.into())
    }

    /// Totals for rows dated within `period`, bounds included.
    pub fn period_balance(&self, period: &Period) -> Result<BalanceSummary, StorageError> {
        let totals = self.storage.kind_totals(Some(period))?;
        Ok(totals.into())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::models::{
        read::{Transaction, UpdateOutcome},
        write::{FieldUpdate, NewTransaction},
        Kind, TransactionId,
    };

    struct FixedTotals {
        totals: KindTotals,
        seen_period: Mutex<Option<Option<Period>>>,
    }

    impl StorageBackend for FixedTotals {
        fn insert(&self, _txn: &NewTransaction) -> Result<TransactionId, StorageError> { unimplemented!() }
        fn list_all(&self) -> Result<Vec<Transaction>, StorageError> { unimplemented!() }
        fn list_by_kind(&self, _kind: Kind) -> Result<Vec<Transaction>, StorageError> { unimplemented!() }
        fn get(&self, _id: TransactionId) -> Result<Option<Transaction>, StorageError> { unimplemented!() }
        fn delete_by_id(&self, _id: TransactionId) -> Result<usize, StorageError> { unimplemented!() }
        fn update_field(&self, _id: TransactionId, _update: &FieldUpdate) -> Result<UpdateOutcome, StorageError> { unimplemented!() }
        fn clear_all(&self) -> Result<(), StorageError> { unimplemented!() }

        fn kind_totals(&self, period: Option<&Period>) -> Result<KindTotals, StorageError> {
            *self.seen_period.lock().unwrap() = Some(period.cloned());
            Ok(self.totals)
        }
    }

    struct Failing;

    impl StorageBackend for Failing {
        fn insert(&self, _txn: &NewTransaction) -> Result<TransactionId, StorageError> { unimplemented!() }
        fn list_all(&self) -> Result<Vec<Transaction>, StorageError> { unimplemented!() }
        fn list_by_kind(&self, _kind: Kind) -> Result<Vec<Transaction>, StorageError> { unimplemented!() }
        fn get(&self, _id: TransactionId) -> Result<Option<Transaction>, StorageError> { unimplemented!() }
        fn delete_by_id(&self, _id: TransactionId) -> Result<usize, StorageError> { unimplemented!() }
        fn update_field(&self, _id: TransactionId, _update: &FieldUpdate) -> Result<UpdateOutcome, StorageError> { unimplemented!() }
        fn clear_all(&self) -> Result<(), StorageError> { unimplemented!() }

        fn kind_totals(&self, _period: Option<&Period>) -> Result<KindTotals, StorageError> {
            Err(StorageError::Other("database is locked".to_string()))
        }
    }

    #[test]
    fn test_net_is_income_minus_expense() {
        let storage = Arc::new(FixedTotals {
            totals: KindTotals { income: 150.0, expense: 30.0 },
            seen_period: Mutex::new(None),
        });
        let calculator = BalanceCalculator::new(storage.clone());

        let summary = calculator.total_balance().unwrap();
        assert_eq!(summary, BalanceSummary { income: 150.0, expense: 30.0, net: 120.0 });
        assert_eq!(*storage.seen_period.lock().unwrap(), Some(None));
    }

    #[test]
    fn test_period_is_forwarded() {
        let storage = Arc::new(FixedTotals {
            totals: KindTotals { income: 10.0, expense: 25.0 },
            seen_period: Mutex::new(None),
        });
        let calculator = BalanceCalculator::new(storage.clone());
        let period = Period::parse("2024-01-01", "2024-01-31").unwrap();

        let summary = calculator.period_balance(&period).unwrap();
        assert_eq!(summary.net, -15.0);
        assert_eq!(*storage.seen_period.lock().unwrap(), Some(Some(period)));
    }

    #[test]
    fn test_empty_totals_are_zero() {
        assert_eq!(BalanceSummary::from(KindTotals::default()), BalanceSummary { income: 0.0, expense: 0.0, net: 0.0 });
    }

    #[test]
    fn test_storage_errors_propagate() {
        let calculator = BalanceCalculator::new(Arc::new(Failing));
        assert!(matches!(calculator.total_balance(), Err(StorageError::Other(_))));
    }
}
