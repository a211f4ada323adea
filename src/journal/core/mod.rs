//! Core journal types and identifiers.

pub mod config;
pub mod context;
pub mod errors;
pub mod ids;
pub mod models;

pub use config::{ClockConfig, DisplayConfig, JournalConfig, StorageConfig};
pub use context::RequestContext;
pub use errors::{ErrorKind, JournalError, JournalResult};
pub use ids::{AccountId, CallId, ContactFieldTypeId, ContactId, ConversationId, EventId, MessageId};
pub use models::{
    Account, Call, Contact, ContactFieldType, Conversation, ConversationAggregate,
    EditConversation, Message, MessageDraft, NewConversation, NewMessage,
};
