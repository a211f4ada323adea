//! Journal wiring: one database, one clock and one event sink shared by every
//! service.

use std::sync::Arc;

use tracing::info;

use crate::journal::core::config::JournalConfig;
use crate::journal::core::errors::JournalResult;
use crate::journal::dates::clock::{Clock, SystemClock};
use crate::journal::dates::resolver::DateResolver;
use crate::journal::query::conversation_query::ConversationQuery;
use crate::journal::services::call_service::CallService;
use crate::journal::services::conversation_service::ConversationService;
use crate::journal::storage::database::Database;
use crate::journal::storage::directory_store::DirectoryStore;
use crate::journal::storage::event_log::{EventLog, SqliteEventLog};
use crate::journal::storage::message_store::MessageStore;

/// Backend dependencies for the journal.
pub struct JournalBackends {
    /// Open, migrated database.
    pub db: Database,
    /// Wall clock.
    pub clock: Arc<dyn Clock>,
    /// Activity event sink.
    pub events: Arc<dyn EventLog>,
}

impl JournalBackends {
    /// Build the default `SQLite` backends from config.
    ///
    /// # Errors
    /// Returns an error if the clock offset is invalid or the database cannot
    /// be opened.
    pub async fn sqlite(config: &JournalConfig) -> JournalResult<Self> {
        let clock = Arc::new(SystemClock::new(config.clock.offset()?));
        let db = Database::open(&config.storage).await?;
        let events = Arc::new(SqliteEventLog::new(db.clone()));
        Ok(Self { db, clock, events })
    }
}

/// Every journal service over one set of backends.
#[derive(Clone)]
pub struct Journal {
    /// Conversation writes.
    pub conversations: ConversationService,
    /// Single-message operations.
    pub messages: MessageStore,
    /// Conversation projections.
    pub queries: ConversationQuery,
    /// Calls and `last_talked_to`.
    pub calls: CallService,
    /// Accounts, contacts and channels.
    pub directory: DirectoryStore,
    /// Form date selection.
    pub dates: DateResolver,
}

impl Journal {
    /// Open the journal described by `config`.
    ///
    /// # Errors
    /// Returns an error if the config is invalid or storage cannot be opened.
    pub async fn open(config: JournalConfig) -> JournalResult<Self> {
        config.validate()?;
        let backends = JournalBackends::sqlite(&config).await?;
        info!(
            "Journal opened at {}",
            config.storage.sqlite_path.display()
        );
        Self::with_backends(config, backends)
    }

    /// Assemble the journal over explicit backends.
    ///
    /// # Errors
    /// Returns an error if the config is invalid.
    pub fn with_backends(config: JournalConfig, backends: JournalBackends) -> JournalResult<Self> {
        config.validate()?;
        let JournalBackends { db, clock, events } = backends;

        Ok(Self {
            conversations: ConversationService::new(db.clone(), clock.clone(), events.clone()),
            messages: MessageStore::new(db.clone(), clock.clone()),
            queries: ConversationQuery::new(db.clone(), config.display),
            calls: CallService::new(db.clone(), clock.clone(), events),
            directory: DirectoryStore::new(db, clock.clone()),
            dates: DateResolver::new(clock),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::core::errors::ErrorKind;

    #[tokio::test]
    async fn open_creates_the_database_file() {
        let dir = std::env::temp_dir().join(format!("journal-{}", uuid::Uuid::new_v4()));
        let mut config = JournalConfig::default();
        config.storage.sqlite_path = dir.join("nested").join("journal.sqlite");

        let journal = Journal::open(config.clone()).await.unwrap();
        let account = journal.directory.create_account("Home").await.unwrap();
        assert!(config.storage.sqlite_path.exists());
        assert!(!account.name.is_empty());

        drop(journal);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn open_rejects_invalid_config() {
        let mut config = JournalConfig::default();
        config.clock.utc_offset_minutes = i32::MAX;
        let err = Journal::open(config).await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }
}
