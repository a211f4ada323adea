//! Shared fixtures for the journal unit tests.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use crate::journal::core::config::JournalConfig;
use crate::journal::core::context::RequestContext;
use crate::journal::core::errors::{JournalError, JournalResult};
use crate::journal::core::ids::AccountId;
use crate::journal::core::models::{
    Contact, ContactFieldType, ConversationAggregate, MessageDraft, NewConversation, NewMessage,
};
use crate::journal::dates::clock::FixedClock;
use crate::journal::engine::{Journal, JournalBackends};
use crate::journal::storage::database::Database;
use crate::journal::storage::event_log::{
    EventEntry, EventLog, SqliteEventLog, StoreFuture, SubjectType,
};

/// Event sink that refuses every write.
struct FailingEventLog;

impl EventLog for FailingEventLog {
    fn log_event(&self, _entry: EventEntry) -> StoreFuture<'_, JournalResult<()>> {
        Box::pin(async { Err(JournalError::Io(std::io::Error::other("event sink down"))) })
    }

    fn delete_for_subject(
        &self,
        _account_id: AccountId,
        _subject_type: SubjectType,
        _subject_id: Uuid,
    ) -> StoreFuture<'_, JournalResult<usize>> {
        Box::pin(async { Err(JournalError::Io(std::io::Error::other("event sink down"))) })
    }
}

pub(crate) fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub(crate) fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

pub(crate) fn message(content: &str, written_by_me: bool) -> NewMessage {
    NewMessage {
        content: content.to_string(),
        written_at: day(2024, 1, 10),
        written_by_me,
    }
}

pub(crate) fn draft(content: &str, written_by_me: bool) -> MessageDraft {
    MessageDraft {
        content: content.to_string(),
        written_by_me,
    }
}

/// In-memory journal with one account, one contact and one channel.
pub(crate) struct Fixture {
    pub journal: Journal,
    pub db: Database,
    pub events: SqliteEventLog,
    pub ctx: RequestContext,
    pub contact: Contact,
    pub field_type: ContactFieldType,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::build(false).await
    }

    pub async fn with_failing_events() -> Self {
        Self::build(true).await
    }

    async fn build(failing_events: bool) -> Self {
        let db = Database::open_in_memory().await.unwrap();
        let events = SqliteEventLog::new(db.clone());
        let sink: Arc<dyn EventLog> = if failing_events {
            Arc::new(FailingEventLog)
        } else {
            Arc::new(events.clone())
        };
        let backends = JournalBackends {
            db: db.clone(),
            clock: Arc::new(FixedClock::at(at(2024, 1, 10, 12))),
            events: sink,
        };
        let journal = Journal::with_backends(JournalConfig::default(), backends).unwrap();

        let account = journal.directory.create_account("Home").await.unwrap();
        let ctx = RequestContext::new(account.id);
        let contact = journal
            .directory
            .create_contact(&ctx, "Ada", Some("Lovelace"))
            .await
            .unwrap();
        let field_type = journal
            .directory
            .create_contact_field_type(&ctx, "SMS", Some("fa fa-mobile"), Some("sms:"))
            .await
            .unwrap();

        Self {
            journal,
            db,
            events,
            ctx,
            contact,
            field_type,
        }
    }

    /// A second, empty account.
    pub async fn other_account(&self) -> RequestContext {
        let account = self.journal.directory.create_account("Other").await.unwrap();
        RequestContext::new(account.id)
    }

    /// Conversation with the fixture contact, authors alternating from "me".
    pub async fn conversation_with(&self, contents: &[&str]) -> ConversationAggregate {
        let messages = contents
            .iter()
            .enumerate()
            .map(|(i, content)| message(content, i % 2 == 0))
            .collect();
        self.journal
            .conversations
            .create_conversation(
                &self.ctx,
                NewConversation {
                    contact_id: self.contact.id,
                    contact_field_type_id: self.field_type.id,
                    happened_at: day(2024, 1, 10),
                    messages,
                },
            )
            .await
            .unwrap()
    }
}
