//! Activity event sink.
//!
//! The journal reports creations and deletions here after its own transaction has
//! committed. Sink failures are logged and swallowed.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::journal::core::errors::JournalResult;
use crate::journal::core::ids::{AccountId, EventId};
use crate::journal::storage::database::{Database, millis_at, to_millis};

/// Boxed future type for event sink operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Kind of record an event is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubjectType {
    /// A conversation.
    Conversation,
    /// A phone call.
    Call,
}

impl SubjectType {
    /// Stored name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Conversation => "conversation",
            Self::Call => "call",
        }
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to the subject.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventAction {
    /// Record created.
    Create,
    /// Record changed.
    Update,
    /// Record removed.
    Delete,
}

impl EventAction {
    /// Stored name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// One activity entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventEntry {
    /// Account the subject belongs to.
    pub account_id: AccountId,
    /// Subject kind.
    pub subject_type: SubjectType,
    /// Subject id.
    pub subject_id: Uuid,
    /// What happened.
    pub action: EventAction,
    /// When it happened.
    pub created_at: DateTime<Utc>,
}

/// Event sink trait.
pub trait EventLog: Send + Sync {
    /// Append an entry.
    ///
    /// # Errors
    /// Returns an error if the sink cannot record the entry.
    fn log_event(&self, entry: EventEntry) -> StoreFuture<'_, JournalResult<()>>;

    /// Drop every entry about one subject, returning how many were removed.
    ///
    /// # Errors
    /// Returns an error if the sink cannot be reached.
    fn delete_for_subject(
        &self,
        account_id: AccountId,
        subject_type: SubjectType,
        subject_id: Uuid,
    ) -> StoreFuture<'_, JournalResult<usize>>;
}

/// Record `entry`, logging instead of failing.
pub async fn log_best_effort(events: &dyn EventLog, entry: EventEntry) {
    let subject = format!("{} {}", entry.subject_type, entry.subject_id);
    if let Err(err) = events.log_event(entry).await {
        warn!("Event log write failed for {subject}: {err}");
    }
}

/// Forget the history of one subject, logging instead of failing.
pub async fn forget_best_effort(
    events: &dyn EventLog,
    account_id: AccountId,
    subject_type: SubjectType,
    subject_id: Uuid,
) {
    if let Err(err) = events
        .delete_for_subject(account_id, subject_type, subject_id)
        .await
    {
        warn!("Event log cleanup failed for {subject_type} {subject_id}: {err}");
    }
}

/// Stored event row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredEvent {
    /// Event id.
    pub id: EventId,
    /// Subject kind as stored.
    pub object_type: String,
    /// Subject id.
    pub object_id: Uuid,
    /// Action as stored.
    pub action: String,
    /// When it happened.
    pub created_at: DateTime<Utc>,
}

/// `SQLite` implementation of the event sink, in the journal database.
#[derive(Clone)]
pub struct SqliteEventLog {
    db: Database,
}

impl SqliteEventLog {
    /// Event sink over `db`.
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Entries about one subject, oldest first.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    pub async fn list_for_subject(
        &self,
        account_id: AccountId,
        subject_type: SubjectType,
        subject_id: Uuid,
    ) -> JournalResult<Vec<StoredEvent>> {
        self.db
            .read(move |tx| {
                let mut stmt = tx.prepare(
                    "SELECT id, object_type, object_id, nature_of_operation, created_at
                     FROM events
                     WHERE account_id = ?1 AND object_type = ?2 AND object_id = ?3
                     ORDER BY seq",
                )?;
                let rows = stmt
                    .query_map(
                        rusqlite::params![account_id, subject_type.as_str(), subject_id.to_string()],
                        |row| {
                            let object_id: String = row.get(2)?;
                            let object_id = Uuid::parse_str(&object_id).map_err(|err| {
                                rusqlite::Error::FromSqlConversionFailure(
                                    2,
                                    rusqlite::types::Type::Text,
                                    Box::new(err),
                                )
                            })?;
                            Ok(StoredEvent {
                                id: row.get(0)?,
                                object_type: row.get(1)?,
                                object_id,
                                action: row.get(3)?,
                                created_at: millis_at(row, 4)?,
                            })
                        },
                    )?
                    .collect::<Result<Vec<_>, rusqlite::Error>>()?;
                Ok(rows)
            })
            .await
    }
}

impl EventLog for SqliteEventLog {
    fn log_event(&self, entry: EventEntry) -> StoreFuture<'_, JournalResult<()>> {
        Box::pin(async move {
            self.db
                .write(move |tx| {
                    tx.execute(
                        "INSERT INTO events
                         (id, account_id, object_type, object_id, nature_of_operation, created_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                        rusqlite::params![
                            EventId::new(),
                            entry.account_id,
                            entry.subject_type.as_str(),
                            entry.subject_id.to_string(),
                            entry.action.as_str(),
                            to_millis(entry.created_at)
                        ],
                    )?;
                    Ok(())
                })
                .await
        })
    }

    fn delete_for_subject(
        &self,
        account_id: AccountId,
        subject_type: SubjectType,
        subject_id: Uuid,
    ) -> StoreFuture<'_, JournalResult<usize>> {
        Box::pin(async move {
            self.db
                .write(move |tx| {
                    Ok(tx.execute(
                        "DELETE FROM events
                         WHERE account_id = ?1 AND object_type = ?2 AND object_id = ?3",
                        rusqlite::params![account_id, subject_type.as_str(), subject_id.to_string()],
                    )?)
                })
                .await
        })
    }
}

/// Sink that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopEventLog;

impl EventLog for NoopEventLog {
    fn log_event(&self, _entry: EventEntry) -> StoreFuture<'_, JournalResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn delete_for_subject(
        &self,
        _account_id: AccountId,
        _subject_type: SubjectType,
        _subject_id: Uuid,
    ) -> StoreFuture<'_, JournalResult<usize>> {
        Box::pin(async { Ok(0) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn entries_are_listed_and_forgotten_per_subject() {
        let db = Database::open_in_memory().await.unwrap();
        let log = SqliteEventLog::new(db);
        let account_id = AccountId::new();
        let subject = Uuid::new_v4();
        let at = Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap();

        for action in [EventAction::Create, EventAction::Update] {
            log.log_event(EventEntry {
                account_id,
                subject_type: SubjectType::Call,
                subject_id: subject,
                action,
                created_at: at,
            })
            .await
            .unwrap();
        }

        let stored = log
            .list_for_subject(account_id, SubjectType::Call, subject)
            .await
            .unwrap();
        let actions: Vec<&str> = stored.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, vec!["create", "update"]);
        assert_eq!(stored[0].created_at, at);

        let removed = log
            .delete_for_subject(account_id, SubjectType::Call, subject)
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert!(
            log.list_for_subject(account_id, SubjectType::Call, subject)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
