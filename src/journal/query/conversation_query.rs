//! Read projections of conversations for the contact page.

use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::Serialize;

use crate::journal::core::config::DisplayConfig;
use crate::journal::core::context::RequestContext;
use crate::journal::core::errors::JournalResult;
use crate::journal::core::ids::{ContactId, ConversationId, MessageId};
use crate::journal::core::models::{Contact, ContactFieldType, Conversation};
use crate::journal::dates::resolver::DATE_FORMAT;
use crate::journal::storage::conversation_rows::{load_aggregate, require_conversation};
use crate::journal::storage::database::Database;
use crate::journal::storage::directory_store::require_contact;

/// One line of a contact's conversation list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConversationSummary {
    /// Conversation id.
    pub id: ConversationId,
    /// Number of messages.
    pub message_count: u32,
    /// Channel name.
    pub contact_field_type: String,
    /// Channel icon.
    pub icon: Option<String>,
    /// First message by insertion order; `None` for a conversation without messages.
    pub content: Option<String>,
    /// Date in the configured short format.
    pub happened_at: String,
    /// Date as stored.
    pub happened_on: NaiveDate,
}

/// Who wrote a message, from the account owner's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    /// The account owner.
    Me,
    /// The contact.
    Other,
}

impl From<bool> for Author {
    fn from(written_by_me: bool) -> Self {
        if written_by_me { Self::Me } else { Self::Other }
    }
}

/// Message as shown on the edit page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessageView {
    /// Message id.
    pub id: MessageId,
    /// Free text.
    pub content: String,
    /// Author.
    pub author: Author,
}

/// A conversation with everything the edit page shows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConversationDetail {
    /// Conversation metadata.
    pub conversation: Conversation,
    /// Contact it was held with.
    pub contact: Contact,
    /// Channel.
    pub contact_field_type: ContactFieldType,
    /// Messages in insertion order.
    pub messages: Vec<MessageView>,
}

/// Format `date` with `format`, falling back to ISO when the format is unusable.
fn short_date(date: NaiveDate, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(format)).is_err() {
        out.clear();
        let _ = write!(out, "{}", date.format(DATE_FORMAT));
    }
    out
}

/// Read-only conversation projections.
#[derive(Clone)]
pub struct ConversationQuery {
    db: Database,
    display: DisplayConfig,
}

impl ConversationQuery {
    /// Query over `db`, formatting dates per `display`.
    #[must_use]
    pub const fn new(db: Database, display: DisplayConfig) -> Self {
        Self { db, display }
    }

    /// Conversations with a contact, newest first.
    ///
    /// Same-day conversations are ordered by creation, latest first.
    ///
    /// # Errors
    /// `NotFound` if the contact is not in the caller's account.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        contact_id: ContactId,
    ) -> JournalResult<Vec<ConversationSummary>> {
        let account_id = ctx.account_id;
        let format = self.display.short_date_format.clone();
        self.db
            .read(move |tx| {
                let contact = require_contact(tx, account_id, contact_id)?;
                let mut stmt = tx.prepare(
                    "SELECT c.id, c.happened_at, ft.name, ft.fontawesome_icon,
                            (SELECT COUNT(*) FROM messages m WHERE m.conversation_id = c.id),
                            (SELECT m.content FROM messages m
                             WHERE m.conversation_id = c.id ORDER BY m.seq LIMIT 1)
                     FROM conversations c
                     JOIN contact_field_types ft
                       ON ft.id = c.contact_field_type_id AND ft.account_id = c.account_id
                     WHERE c.account_id = ?1 AND c.contact_id = ?2
                     ORDER BY c.happened_at DESC, c.seq DESC",
                )?;
                let rows = stmt
                    .query_map(rusqlite::params![contact.account_id, contact.id], |row| {
                        let happened_on: NaiveDate = row.get(1)?;
                        Ok(ConversationSummary {
                            id: row.get(0)?,
                            message_count: row.get(4)?,
                            contact_field_type: row.get(2)?,
                            icon: row.get(3)?,
                            content: row.get(5)?,
                            happened_at: short_date(happened_on, &format),
                            happened_on,
                        })
                    })?
                    .collect::<Result<Vec<_>, rusqlite::Error>>()?;
                Ok(rows)
            })
            .await
    }

    /// One conversation with its messages.
    ///
    /// # Errors
    /// `NotFound` if the conversation is missing or belongs to another account.
    pub async fn detail(
        &self,
        ctx: &RequestContext,
        conversation_id: ConversationId,
    ) -> JournalResult<ConversationDetail> {
        let account_id = ctx.account_id;
        let aggregate = self
            .db
            .read(move |tx| {
                let conversation = require_conversation(tx, account_id, conversation_id)?;
                load_aggregate(tx, conversation)
            })
            .await?;

        Ok(ConversationDetail {
            conversation: aggregate.conversation,
            contact: aggregate.contact,
            contact_field_type: aggregate.contact_field_type,
            messages: aggregate
                .messages
                .into_iter()
                .map(|message| MessageView {
                    id: message.id,
                    content: message.content,
                    author: message.written_by_me.into(),
                })
                .collect(),
        })
    }
}
