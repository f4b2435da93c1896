//! Transaction operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{NewTransaction, Transaction};

/// Result of inserting a transaction
#[derive(Debug, Clone)]
pub enum TransactionInsertResult {
    /// Transaction was inserted successfully, contains new transaction ID
    Inserted(i64),
    /// The same capture was already persisted, contains existing ID
    Duplicate(i64),
}

impl TransactionInsertResult {
    pub fn id(&self) -> i64 {
        match self {
            Self::Inserted(id) | Self::Duplicate(id) => *id,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

impl Database {
    /// Insert a transaction for a user.
    ///
    /// When a source hash is present, a row with the same (user, hash) pair
    /// is treated as a re-submission of the same capture and returned as a
    /// duplicate instead of inserting. Rows violating the schema CHECK
    /// constraints are rejected by SQLite.
    pub fn insert_transaction(
        &self,
        user_id: &str,
        tx: &NewTransaction,
    ) -> Result<TransactionInsertResult> {
        let conn = self.conn()?;

        if let Some(hash) = &tx.source_hash {
            let existing: Option<i64> = conn
                .query_row(
                    "SELECT id FROM transactions WHERE user_id = ? AND source_hash = ?",
                    params![user_id, hash],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(existing_id) = existing {
                return Ok(TransactionInsertResult::Duplicate(existing_id));
            }
        }

        conn.execute(
            r#"
            INSERT INTO transactions (user_id, date, description, amount, tx_type, category, notes, provenance, source_hash)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                tx.date.to_string(),
                tx.description,
                tx.amount,
                tx.direction.as_str(),
                tx.category,
                tx.notes,
                tx.provenance.as_str(),
                tx.source_hash,
            ],
        )?;

        Ok(TransactionInsertResult::Inserted(conn.last_insert_rowid()))
    }

    /// Get a transaction by ID
    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, date, description, amount, tx_type, category, notes, provenance, source_hash, created_at
             FROM transactions WHERE id = ?",
        )?;

        let tx = stmt
            .query_row(params![id], row_to_transaction)
            .optional()?;

        Ok(tx)
    }

    /// List a user's transactions, most recent first
    pub fn list_transactions(&self, user_id: &str, limit: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, date, description, amount, tx_type, category, notes, provenance, source_hash, created_at
             FROM transactions WHERE user_id = ?
             ORDER BY date DESC, id DESC LIMIT ?",
        )?;

        let rows = stmt.query_map(params![user_id, limit], row_to_transaction)?;
        let mut transactions = Vec::new();
        for row in rows {
            transactions.push(row?);
        }
        Ok(transactions)
    }

    /// Total number of persisted transactions (for status output)
    pub fn transaction_count(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn row_to_transaction(row: &rusqlite::Row<'_>) -> rusqlite::Result<Transaction> {
    let date_str: String = row.get(2)?;
    let tx_type: String = row.get(5)?;
    let provenance: String = row.get(8)?;
    let created_at: String = row.get(10)?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?,
        description: row.get(3)?,
        amount: row.get(4)?,
        direction: tx_type.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, e.into())
        })?,
        category: row.get(6)?,
        notes: row.get(7)?,
        provenance: provenance.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, e.into())
        })?,
        source_hash: row.get(9)?,
        created_at: parse_datetime(&created_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::content_hash;
    use crate::models::{Direction, Provenance};

    fn sample_tx(hash: Option<String>) -> NewTransaction {
        NewTransaction {
            date: NaiveDate::from_ymd_opt(2025, 9, 19).unwrap(),
            description: "Starbucks".to_string(),
            amount: 8.75,
            direction: Direction::Debit,
            category: "Dining".to_string(),
            notes: Some("latte".to_string()),
            provenance: Provenance::Fallback,
            source_hash: hash,
        }
    }

    #[test]
    fn insert_and_get_round_trip() {
        let db = Database::in_memory().unwrap();
        let result = db.insert_transaction("alice", &sample_tx(None)).unwrap();
        assert!(!result.is_duplicate());

        let tx = db.get_transaction(result.id()).unwrap().unwrap();
        assert_eq!(tx.user_id, "alice");
        assert_eq!(tx.description, "Starbucks");
        assert_eq!(tx.amount, 8.75);
        assert_eq!(tx.direction, Direction::Debit);
        assert_eq!(tx.provenance, Provenance::Fallback);
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2025, 9, 19).unwrap());
    }

    #[test]
    fn get_missing_transaction_is_none() {
        let db = Database::in_memory().unwrap();
        assert!(db.get_transaction(42).unwrap().is_none());
    }

    #[test]
    fn same_capture_deduplicates() {
        let db = Database::in_memory().unwrap();
        let hash = content_hash("alice", "STARBUCKS\nTotal $8.75");

        let first = db
            .insert_transaction("alice", &sample_tx(Some(hash.clone())))
            .unwrap();
        let second = db
            .insert_transaction("alice", &sample_tx(Some(hash.clone())))
            .unwrap();

        assert!(second.is_duplicate());
        assert_eq!(first.id(), second.id());
        assert_eq!(db.transaction_count().unwrap(), 1);

        // A different user storing the same capture is not a duplicate
        let other = db
            .insert_transaction("bob", &sample_tx(Some(hash)))
            .unwrap();
        assert!(!other.is_duplicate());
    }

    #[test]
    fn listing_is_user_scoped_and_recent_first() {
        let db = Database::in_memory().unwrap();
        let mut older = sample_tx(None);
        older.date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        older.description = "Older".to_string();
        db.insert_transaction("alice", &older).unwrap();
        db.insert_transaction("alice", &sample_tx(None)).unwrap();
        db.insert_transaction("bob", &sample_tx(None)).unwrap();

        let listed = db.list_transactions("alice", 10).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].description, "Starbucks");
        assert_eq!(listed[1].description, "Older");
    }

    #[test]
    fn storage_rejects_negative_amounts() {
        // Second line of defense behind extraction-time validation
        let db = Database::in_memory().unwrap();
        let mut tx = sample_tx(None);
        tx.amount = -5.0;
        assert!(db.insert_transaction("alice", &tx).is_err());
    }

    #[test]
    fn storage_rejects_empty_category() {
        let db = Database::in_memory().unwrap();
        let mut tx = sample_tx(None);
        tx.category = String::new();
        assert!(db.insert_transaction("alice", &tx).is_err());
    }
}
