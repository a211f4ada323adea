//! Shared `SQLite` handle and transaction helpers.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::TransactionBehavior;
use tokio_rusqlite::Connection;
use tracing::info;

use crate::journal::core::config::StorageConfig;
use crate::journal::core::errors::JournalResult;
use crate::journal::storage::schema::SCHEMA;

/// Cheaply cloneable handle to the journal database.
///
/// All statements run on the connection's worker thread, one closure at a time.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Connection>,
}

impl Database {
    /// Open (or create) the database file and apply the schema.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or migrated.
    pub async fn open(config: &StorageConfig) -> JournalResult<Self> {
        match config.sqlite_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)?,
            _ => {}
        }

        let conn = Connection::open(&config.sqlite_path).await?;
        let db = Self::init(conn, config.busy_timeout_ms).await?;
        info!("Journal database ready at {}", config.sqlite_path.display());
        Ok(db)
    }

    /// Open a private in-memory database with the schema applied.
    ///
    /// # Errors
    /// Returns an error if `SQLite` cannot be initialized.
    pub async fn open_in_memory() -> JournalResult<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::init(conn, StorageConfig::default().busy_timeout_ms).await
    }

    async fn init(conn: Connection, busy_timeout_ms: u64) -> JournalResult<Self> {
        let timeout = Duration::from_millis(busy_timeout_ms);
        conn.call(move |conn| {
            conn.busy_timeout(timeout)?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self {
            conn: Arc::new(conn),
        })
    }

    /// Run `f` inside an immediate write transaction.
    ///
    /// The transaction commits only if `f` returns `Ok`; any error, whether
    /// raised by `f` or by the commit, leaves the database untouched.
    pub(crate) async fn write<T, F>(&self, f: F) -> JournalResult<T>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> JournalResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.conn
            .call(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let out = match f(&tx) {
                    Ok(out) => out,
                    Err(err) => return Ok(Err(err)),
                };
                tx.commit()?;
                Ok(Ok(out))
            })
            .await?
    }

    /// Run `f` inside a read transaction so it sees one consistent snapshot.
    pub(crate) async fn read<T, F>(&self, f: F) -> JournalResult<T>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> JournalResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                Ok(f(&tx))
            })
            .await?
    }

    /// Execute raw SQL, for fault injection in tests.
    #[cfg(test)]
    pub(crate) async fn execute_batch(&self, sql: &'static str) -> JournalResult<()> {
        self.conn
            .call(move |conn| {
                conn.execute_batch(sql)?;
                Ok(())
            })
            .await?;
        Ok(())
    }
}

/// Timestamps are stored as milliseconds since the Unix epoch.
pub(crate) fn to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

/// Read a millisecond timestamp column.
pub(crate) fn millis_at(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let ms: i64 = row.get(idx)?;
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, ms))
}

/// Read a nullable millisecond timestamp column.
pub(crate) fn optional_millis_at(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let ms: Option<i64> = row.get(idx)?;
    ms.map(|ms| {
        Utc.timestamp_millis_opt(ms)
            .single()
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, ms))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_is_idempotent() {
        let db = Database::open_in_memory().await.unwrap();
        db.execute_batch(SCHEMA).await.unwrap();
    }

    #[tokio::test]
    async fn failed_write_rolls_back() {
        let db = Database::open_in_memory().await.unwrap();
        let result: JournalResult<()> = db
            .write(|tx| {
                tx.execute(
                    "INSERT INTO accounts (id, name, created_at) VALUES ('a', 'A', 0)",
                    [],
                )?;
                Err(crate::journal::core::errors::JournalError::not_found("anything"))
            })
            .await;
        assert!(result.is_err());

        let count: i64 = db
            .read(|tx| Ok(tx.query_row("SELECT COUNT(*) FROM accounts", [], |row| row.get(0))?))
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn millis_roundtrip_keeps_whole_seconds() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        assert_eq!(
            Utc.timestamp_millis_opt(to_millis(ts)).single(),
            Some(ts)
        );
    }
}
