//! Persistent storage for journal records.

pub(crate) mod call_rows;
pub(crate) mod conversation_rows;
pub mod database;
pub mod directory_store;
pub mod event_log;
pub mod message_store;
pub mod schema;

pub use database::Database;
pub use directory_store::DirectoryStore;
pub use event_log::{
    EventAction, EventEntry, EventLog, NoopEventLog, SqliteEventLog, StoreFuture, StoredEvent,
    SubjectType,
};
pub use message_store::MessageStore;
