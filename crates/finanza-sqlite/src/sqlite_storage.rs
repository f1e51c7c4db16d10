use std::{path::PathBuf, sync::Arc, time::Duration};

use finanza_core::{
    FieldUpdate, IsoDate, Kind, KindTotals, NewTransaction, Period, StorageBackend, StorageError,
    Transaction, TransactionId, UpdateOutcome,
};
use rusqlite::{params, types::Value, Row};

use crate::gateway::{sql_err, Gateway};

const SELECT_COLUMNS: &str = "SELECT id, tipo, descricao, valor, data FROM transacoes";

pub struct SqliteStorage {
    gateway: Gateway,
}

impl SqliteStorage {
    pub fn new(path: impl Into<PathBuf>, busy_timeout: Duration) -> Self {
        Self {
            gateway: Gateway::new(path, busy_timeout),
        }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    fn query_transactions(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<Transaction>, StorageError> {
        self.gateway.run(|tx| {
            let mut stmt = tx.prepare(sql).map_err(sql_err)?;
            let rows = stmt
                .query_map(params, raw_row)
                .map_err(sql_err)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(sql_err)?;
            rows.into_iter().map(RawRow::into_transaction).collect()
        })
    }
}

struct RawRow {
    id: TransactionId,
    kind: String,
    description: String,
    amount: f64,
    date: String,
}

fn raw_row(row: &Row) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        id: row.get(0)?,
        kind: row.get(1)?,
        description: row.get(2)?,
        amount: row.get(3)?,
        date: row.get(4)?,
    })
}

impl RawRow {
    fn into_transaction(self) -> Result<Transaction, StorageError> {
        let kind = self.kind.parse::<Kind>().map_err(|e| StorageError::InvalidRow {
            id: self.id,
            reason: e.to_string(),
        })?;
        Ok(Transaction {
            id: self.id,
            kind,
            description: Arc::from(self.description),
            amount: self.amount,
            date: IsoDate::from_stored(self.date),
        })
    }
}

fn update_value(update: &FieldUpdate) -> Value {
    match update {
        FieldUpdate::Description(d) => Value::Text(d.to_string()),
        FieldUpdate::Amount(a) => Value::Real(*a),
        FieldUpdate::Date(d) => Value::Text(d.to_string()),
        FieldUpdate::Kind(k) => Value::Text(k.as_db_str().to_string()),
    }
}

impl StorageBackend for SqliteStorage {
    fn insert(&self, txn: &NewTransaction) -> Result<TransactionId, StorageError> {
        self.gateway.run(|tx| {
            tx.execute(
                "INSERT INTO transacoes (tipo, descricao, valor, data) VALUES (?1, ?2, ?3, ?4)",
                params![txn.kind.as_db_str(), txn.description.as_ref(), txn.amount, txn.date.as_str()],
            )
            .map_err(sql_err)?;
            Ok(tx.last_insert_rowid())
        })
    }

    fn list_all(&self) -> Result<Vec<Transaction>, StorageError> {
        self.query_transactions(&format!("{} ORDER BY id", SELECT_COLUMNS), &[])
    }

    fn list_by_kind(&self, kind: Kind) -> Result<Vec<Transaction>, StorageError> {
        self.query_transactions(
            &format!("{} WHERE tipo = ?1 ORDER BY id", SELECT_COLUMNS),
            &[&kind.as_db_str()],
        )
    }

    fn get(&self, id: TransactionId) -> Result<Option<Transaction>, StorageError> {
        let mut rows = self.query_transactions(&format!("{} WHERE id = ?1", SELECT_COLUMNS), &[&id])?;
        Ok(rows.pop())
    }

    fn delete_by_id(&self, id: TransactionId) -> Result<usize, StorageError> {
        self.gateway.run(|tx| {
            tx.execute("DELETE FROM transacoes WHERE id = ?1", params![id])
                .map_err(sql_err)
        })
    }

    fn update_field(&self, id: TransactionId, update: &FieldUpdate) -> Result<UpdateOutcome, StorageError> {
        // column comes from a closed set, never from user text
        let sql = format!("UPDATE transacoes SET {} = ?1 WHERE id = ?2", update.field().column());
        self.gateway.run(|tx| {
            let rows = tx
                .execute(&sql, params![update_value(update), id])
                .map_err(sql_err)?;
            Ok(UpdateOutcome::from_rows(rows))
        })
    }

    fn clear_all(&self) -> Result<(), StorageError> {
        self.gateway.run(|tx| {
            tx.execute("DELETE FROM transacoes", []).map_err(sql_err)?;
            tx.execute("DELETE FROM sqlite_sequence WHERE name = 'transacoes'", [])
                .map_err(sql_err)?;
            Ok(())
        })
    }

    fn kind_totals(&self, period: Option<&Period>) -> Result<KindTotals, StorageError> {
        let (start, end) = match period {
            Some(p) => (Some(p.start.as_str()), Some(p.end.as_str())),
            None => (None, None),
        };

        self.gateway.run(|tx| {
            tx.query_row(
                "SELECT
                    COALESCE(SUM(CASE WHEN tipo = 'receita' THEN valor END), 0.0),
                    COALESCE(SUM(CASE WHEN tipo = 'despesa' THEN valor END), 0.0)
                 FROM transacoes
                 WHERE (?1 IS NULL OR data >= ?1) AND (?2 IS NULL OR data <= ?2)",
                params![start, end],
                |row| {
                    Ok(KindTotals {
                        income: row.get(0)?,
                        expense: row.get(1)?,
                    })
                },
            )
            .map_err(sql_err)
        })
    }
}
