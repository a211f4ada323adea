//! Persisted records and write inputs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::journal::core::errors::{JournalError, JournalResult};
use crate::journal::core::ids::{
    AccountId, CallId, ContactFieldTypeId, ContactId, ConversationId, MessageId,
};

/// Tenant boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account id.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Person record owned by an account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Contact id.
    pub id: ContactId,
    /// Owning account.
    pub account_id: AccountId,
    /// First name.
    pub first_name: String,
    /// Optional last name.
    pub last_name: Option<String>,
    /// Most recent call, kept in sync by the call service.
    pub last_talked_to: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Contact {
    /// First and last name joined for display.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {last}", self.first_name),
            _ => self.first_name.clone(),
        }
    }
}

/// Tenant-defined channel a conversation happened on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFieldType {
    /// Field type id.
    pub id: ContactFieldTypeId,
    /// Owning account.
    pub account_id: AccountId,
    /// Display name ("SMS", "Email", ...).
    pub name: String,
    /// Font Awesome icon class.
    pub fontawesome_icon: Option<String>,
    /// Link protocol such as `mailto:`.
    pub protocol: Option<String>,
}

/// Dated container of messages exchanged with a contact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Conversation id.
    pub id: ConversationId,
    /// Owning account.
    pub account_id: AccountId,
    /// Contact the conversation was with.
    pub contact_id: ContactId,
    /// Channel.
    pub contact_field_type_id: ContactFieldTypeId,
    /// Day the conversation happened.
    pub happened_at: NaiveDate,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last metadata or message change.
    pub updated_at: DateTime<Utc>,
}

/// A single utterance within a conversation.
///
/// `account_id` and `contact_id` are copies of the parent conversation's and are
/// only ever written from it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message id.
    pub id: MessageId,
    /// Parent conversation.
    pub conversation_id: ConversationId,
    /// Contact of the parent conversation.
    pub contact_id: ContactId,
    /// Account of the parent conversation.
    pub account_id: AccountId,
    /// Free text.
    pub content: String,
    /// Day the message was written.
    pub written_at: NaiveDate,
    /// Whether the account owner wrote it.
    pub written_by_me: bool,
}

/// Phone call with a contact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    /// Call id.
    pub id: CallId,
    /// Owning account.
    pub account_id: AccountId,
    /// Contact called.
    pub contact_id: ContactId,
    /// When the call took place.
    pub called_at: DateTime<Utc>,
    /// Optional notes.
    pub content: Option<String>,
}

/// Message to insert, with its own date.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    /// Free text, must not be blank.
    pub content: String,
    /// Day the message was written.
    pub written_at: NaiveDate,
    /// Whether the account owner wrote it.
    pub written_by_me: bool,
}

impl NewMessage {
    /// Reject blank content.
    ///
    /// # Errors
    /// Returns [`JournalError::InvalidMessage`] when content is empty or whitespace.
    pub fn validate(&self) -> JournalResult<()> {
        if self.content.trim().is_empty() {
            return Err(JournalError::InvalidMessage(
                "content must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Message of an edit batch; the batch supplies the date.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDraft {
    /// Free text.
    pub content: String,
    /// Whether the account owner wrote it.
    pub written_by_me: bool,
}

impl MessageDraft {
    /// Stamp the draft with the batch date.
    #[must_use]
    pub fn written_on(self, written_at: NaiveDate) -> NewMessage {
        NewMessage {
            content: self.content,
            written_at,
            written_by_me: self.written_by_me,
        }
    }
}

/// Input of `create_conversation`.
#[derive(Clone, Debug)]
pub struct NewConversation {
    /// Contact the conversation was with.
    pub contact_id: ContactId,
    /// Channel.
    pub contact_field_type_id: ContactFieldTypeId,
    /// Day the conversation happened.
    pub happened_at: NaiveDate,
    /// Initial batch, persisted in this order.
    pub messages: Vec<NewMessage>,
}

/// Input of `edit_conversation`: metadata plus the replacement batch.
#[derive(Clone, Debug)]
pub struct EditConversation {
    /// Conversation being edited.
    pub conversation_id: ConversationId,
    /// New channel.
    pub contact_field_type_id: ContactFieldTypeId,
    /// New date; also stamped on every replacement message.
    pub happened_at: NaiveDate,
    /// Replacement batch.
    pub messages: Vec<MessageDraft>,
}

/// Conversation with everything it references resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConversationAggregate {
    /// The conversation row.
    pub conversation: Conversation,
    /// Contact it belongs to.
    pub contact: Contact,
    /// Channel.
    pub contact_field_type: ContactFieldType,
    /// Messages in insertion order.
    pub messages: Vec<Message>,
}
