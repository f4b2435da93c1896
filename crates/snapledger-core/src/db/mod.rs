//! Database access layer with connection pooling and migrations
//!
//! Implements the persister boundary: canonical transactions go in with an
//! owning user identifier and an optional reference to the source capture,
//! persisted rows with generated identifiers come out. The schema carries
//! CHECK constraints on direction and amount as a second line of defense
//! behind the extraction-time validation.

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::Result;

mod transactions;

pub use transactions::TransactionInsertResult;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    date TEXT NOT NULL,
    description TEXT NOT NULL,
    amount REAL NOT NULL CHECK (amount >= 0),
    tx_type TEXT NOT NULL CHECK (tx_type IN ('debit', 'credit')),
    category TEXT NOT NULL CHECK (length(category) > 0),
    notes TEXT,
    provenance TEXT NOT NULL CHECK (provenance IN ('ai', 'fallback')),
    source_hash TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_transactions_user_date
    ON transactions(user_id, date);

CREATE UNIQUE INDEX IF NOT EXISTS idx_transactions_user_source
    ON transactions(user_id, source_hash)
    WHERE source_hash IS NOT NULL;
"#;

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Open (or create) a database file and run migrations
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::new(manager)?;
        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.migrate()?;
        Ok(db)
    }

    /// In-memory database for tests. Pool size 1 so every handle sees the
    /// same memory database.
    pub fn in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager)?;
        let db = Self {
            pool,
            db_path: ":memory:".to_string(),
        };
        db.migrate()?;
        Ok(db)
    }

    pub(crate) fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    pub fn path(&self) -> &str {
        &self.db_path
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA)?;
        info!(path = %self.db_path, "Database migrated");
        Ok(())
    }

    /// Quick liveness probe for status/health endpoints
    pub fn health_check(&self) -> bool {
        self.conn()
            .and_then(|conn| {
                conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                    .map_err(Into::into)
            })
            .is_ok()
    }
}

/// Parse a SQLite datetime string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    // SQLite stores as "YYYY-MM-DD HH:MM:SS" format
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// Content hash linking a persisted record back to its source capture.
///
/// Hashing user + raw OCR text makes re-submitting the same capture
/// idempotent without storing the text itself.
pub fn content_hash(user_id: &str, ocr_text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_id.as_bytes());
    hasher.update(b"\x00");
    hasher.update(ocr_text.as_bytes());
    hex::encode(hasher.finalize())
}
