//! Row-level access to conversations, shared by the services and the query side.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension};

use crate::journal::core::errors::{JournalError, JournalResult};
use crate::journal::core::ids::{AccountId, ContactFieldTypeId, ConversationId};
use crate::journal::core::models::{Contact, ContactFieldType, Conversation, ConversationAggregate};
use crate::journal::storage::database::{millis_at, to_millis};
use crate::journal::storage::directory_store::{require_contact, require_field_type};
use crate::journal::storage::message_store::load_messages;

const CONVERSATION_COLUMNS: &str =
    "id, account_id, contact_id, contact_field_type_id, happened_at, created_at, updated_at";

fn conversation_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        account_id: row.get(1)?,
        contact_id: row.get(2)?,
        contact_field_type_id: row.get(3)?,
        happened_at: row.get(4)?,
        created_at: millis_at(row, 5)?,
        updated_at: millis_at(row, 6)?,
    })
}

/// Insert a conversation for `contact` on `field_type`.
///
/// Both must already be resolved within the same account.
pub(crate) fn insert_conversation(
    conn: &Connection,
    contact: &Contact,
    field_type: &ContactFieldType,
    happened_at: NaiveDate,
    now: DateTime<Utc>,
) -> JournalResult<Conversation> {
    if field_type.account_id != contact.account_id {
        return Err(JournalError::OwnershipMismatch(
            "contact field type belongs to another account".to_string(),
        ));
    }

    let conversation = Conversation {
        id: ConversationId::new(),
        account_id: contact.account_id,
        contact_id: contact.id,
        contact_field_type_id: field_type.id,
        happened_at,
        created_at: now,
        updated_at: now,
    };

    conn.execute(
        &format!("INSERT INTO conversations ({CONVERSATION_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
        rusqlite::params![
            conversation.id,
            conversation.account_id,
            conversation.contact_id,
            conversation.contact_field_type_id,
            conversation.happened_at,
            to_millis(now),
            to_millis(now)
        ],
    )?;

    Ok(conversation)
}

pub(crate) fn require_conversation(
    conn: &Connection,
    account_id: AccountId,
    id: ConversationId,
) -> JournalResult<Conversation> {
    conn.query_row(
        &format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1 AND account_id = ?2"
        ),
        rusqlite::params![id, account_id],
        conversation_from_row,
    )
    .optional()?
    .ok_or_else(|| JournalError::not_found("conversation"))
}

/// Rewrite channel and date in place; messages are left alone.
pub(crate) fn update_metadata(
    conn: &Connection,
    conversation: &mut Conversation,
    contact_field_type_id: ContactFieldTypeId,
    happened_at: NaiveDate,
    now: DateTime<Utc>,
) -> JournalResult<()> {
    conn.execute(
        "UPDATE conversations
         SET contact_field_type_id = ?1, happened_at = ?2, updated_at = ?3
         WHERE id = ?4 AND account_id = ?5",
        rusqlite::params![
            contact_field_type_id,
            happened_at,
            to_millis(now),
            conversation.id,
            conversation.account_id
        ],
    )?;
    conversation.contact_field_type_id = contact_field_type_id;
    conversation.happened_at = happened_at;
    conversation.updated_at = now;
    Ok(())
}

pub(crate) fn touch(
    conn: &Connection,
    conversation: &mut Conversation,
    now: DateTime<Utc>,
) -> JournalResult<()> {
    conn.execute(
        "UPDATE conversations SET updated_at = ?1 WHERE id = ?2",
        rusqlite::params![to_millis(now), conversation.id],
    )?;
    conversation.updated_at = now;
    Ok(())
}

/// Resolve contact, channel and messages of an already loaded conversation.
pub(crate) fn load_aggregate(
    conn: &Connection,
    conversation: Conversation,
) -> JournalResult<ConversationAggregate> {
    let contact = require_contact(conn, conversation.account_id, conversation.contact_id)?;
    let contact_field_type =
        require_field_type(conn, conversation.account_id, conversation.contact_field_type_id)?;
    let messages = load_messages(conn, conversation.id)?;
    Ok(ConversationAggregate {
        conversation,
        contact,
        contact_field_type,
        messages,
    })
}
