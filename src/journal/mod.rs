//! Contact journal: conversations, messages and calls kept per account.
//!
//! Organized into:
//! - `core`: Configuration, errors, IDs, request context and records
//! - `dates`: Clock abstraction and form date selection
//! - `storage`: `SQLite` database, directory, messages and the event sink
//! - `services`: Conversation and call writes, form batch decoding
//! - `query`: Read projections for the contact page
//! - `engine`: Wiring of every service over shared backends

pub mod core;
pub mod dates;
pub mod engine;
pub mod query;
pub mod services;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;

pub use core::{
    Account, AccountId, Call, CallId, ClockConfig, Contact, ContactFieldType, ContactFieldTypeId,
    ContactId, Conversation, ConversationAggregate, ConversationId, DisplayConfig,
    EditConversation, ErrorKind, JournalConfig, JournalError, JournalResult, Message, MessageDraft,
    MessageId, NewConversation, NewMessage, RequestContext, StorageConfig,
};
pub use dates::{Clock, DateResolver, DateSelector, FixedClock, SystemClock};
pub use engine::{Journal, JournalBackends};
pub use query::{Author, ConversationDetail, ConversationQuery, ConversationSummary, MessageView};
pub use services::{CallService, ConversationService, decode_message_batch};
pub use storage::{
    Database, DirectoryStore, EventAction, EventEntry, EventLog, MessageStore, NoopEventLog,
    SqliteEventLog, SubjectType,
};
