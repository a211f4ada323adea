//! Message records scoped to a conversation.

use std::sync::Arc;

use rusqlite::Connection;
use tracing::debug;

use crate::journal::core::context::RequestContext;
use crate::journal::core::errors::{JournalError, JournalResult};
use crate::journal::core::ids::{ConversationId, MessageId};
use crate::journal::core::models::{Conversation, Message, NewMessage};
use crate::journal::dates::clock::Clock;
use crate::journal::storage::conversation_rows::{require_conversation, touch};
use crate::journal::storage::database::Database;

/// Append `message` to `conversation`.
///
/// Account and contact are copied from the conversation, never from the caller.
pub(crate) fn insert_message(
    conn: &Connection,
    conversation: &Conversation,
    message: &NewMessage,
) -> JournalResult<Message> {
    message.validate()?;

    let stored = Message {
        id: MessageId::new(),
        conversation_id: conversation.id,
        contact_id: conversation.contact_id,
        account_id: conversation.account_id,
        content: message.content.clone(),
        written_at: message.written_at,
        written_by_me: message.written_by_me,
    };

    conn.execute(
        "INSERT INTO messages
         (id, conversation_id, contact_id, account_id, content, written_at, written_by_me)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            stored.id,
            stored.conversation_id,
            stored.contact_id,
            stored.account_id,
            stored.content,
            stored.written_at,
            stored.written_by_me
        ],
    )?;

    Ok(stored)
}

/// Delete every message of `conversation`, returning how many were removed.
pub(crate) fn delete_messages(conn: &Connection, conversation: &Conversation) -> JournalResult<usize> {
    Ok(conn.execute(
        "DELETE FROM messages WHERE conversation_id = ?1 AND account_id = ?2",
        rusqlite::params![conversation.id, conversation.account_id],
    )?)
}

/// Messages of a conversation in insertion order.
pub(crate) fn load_messages(
    conn: &Connection,
    conversation_id: ConversationId,
) -> JournalResult<Vec<Message>> {
    let mut stmt = conn.prepare(
        "SELECT id, conversation_id, contact_id, account_id, content, written_at, written_by_me
         FROM messages
         WHERE conversation_id = ?1
         ORDER BY seq",
    )?;
    let rows = stmt
        .query_map([conversation_id], |row| {
            Ok(Message {
                id: row.get(0)?,
                conversation_id: row.get(1)?,
                contact_id: row.get(2)?,
                account_id: row.get(3)?,
                content: row.get(4)?,
                written_at: row.get(5)?,
                written_by_me: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, rusqlite::Error>>()?;
    Ok(rows)
}

/// Single-message operations on a conversation.
///
/// Edits of a whole batch go through the conversation service instead, which
/// wraps delete and insert in one transaction.
#[derive(Clone)]
pub struct MessageStore {
    db: Database,
    clock: Arc<dyn Clock>,
}

impl MessageStore {
    /// Message store over `db`.
    #[must_use]
    pub fn new(db: Database, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Append one message to a conversation of the caller's account.
    ///
    /// # Errors
    /// Returns `NotFound` for a foreign or missing conversation and
    /// `InvalidMessage` for blank content.
    pub async fn add_message(
        &self,
        ctx: &RequestContext,
        conversation_id: ConversationId,
        message: NewMessage,
    ) -> JournalResult<Message> {
        message.validate()?;
        let account_id = ctx.account_id;
        let now = self.clock.now();
        let stored = self
            .db
            .write(move |tx| {
                let mut conversation = require_conversation(tx, account_id, conversation_id)?;
                let stored = insert_message(tx, &conversation, &message)?;
                touch(tx, &mut conversation, now)?;
                Ok(stored)
            })
            .await?;
        debug!("Added message {} to conversation {}", stored.id, conversation_id);
        Ok(stored)
    }

    /// Remove one message from a conversation of the caller's account.
    ///
    /// # Errors
    /// Returns `NotFound` if the message is not part of that conversation.
    pub async fn destroy_message(
        &self,
        ctx: &RequestContext,
        conversation_id: ConversationId,
        message_id: MessageId,
    ) -> JournalResult<()> {
        let account_id = ctx.account_id;
        let now = self.clock.now();
        self.db
            .write(move |tx| {
                let mut conversation = require_conversation(tx, account_id, conversation_id)?;
                let removed = tx.execute(
                    "DELETE FROM messages WHERE id = ?1 AND conversation_id = ?2 AND account_id = ?3",
                    rusqlite::params![message_id, conversation.id, conversation.account_id],
                )?;
                if removed == 0 {
                    return Err(JournalError::not_found("message"));
                }
                touch(tx, &mut conversation, now)
            })
            .await?;
        debug!("Destroyed message {message_id} of conversation {conversation_id}");
        Ok(())
    }

    /// Messages of a conversation of the caller's account, in insertion order.
    ///
    /// # Errors
    /// Returns `NotFound` for a foreign or missing conversation.
    pub async fn list_for_conversation(
        &self,
        ctx: &RequestContext,
        conversation_id: ConversationId,
    ) -> JournalResult<Vec<Message>> {
        let account_id = ctx.account_id;
        self.db
            .read(move |tx| {
                let conversation = require_conversation(tx, account_id, conversation_id)?;
                load_messages(tx, conversation.id)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::journal::core::errors::ErrorKind;
    use crate::journal::test_support::{Fixture, message};

    #[tokio::test]
    async fn add_message_copies_parent_ownership() {
        let fx = Fixture::new().await;
        let aggregate = fx.conversation_with(&["hi"]).await;

        let added = fx
            .journal
            .messages
            .add_message(&fx.ctx, aggregate.conversation.id, message("later", false))
            .await
            .unwrap();
        assert_eq!(added.account_id, fx.ctx.account_id);
        assert_eq!(added.contact_id, fx.contact.id);

        let contents: Vec<String> = fx
            .journal
            .messages
            .list_for_conversation(&fx.ctx, aggregate.conversation.id)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["hi".to_string(), "later".to_string()]);
    }

    #[tokio::test]
    async fn add_message_to_foreign_conversation_is_not_found() {
        let fx = Fixture::new().await;
        let aggregate = fx.conversation_with(&["hi"]).await;
        let other = fx.other_account().await;

        let err = fx
            .journal
            .messages
            .add_message(&other, aggregate.conversation.id, message("sneaky", true))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn destroy_message_removes_only_that_message() {
        let fx = Fixture::new().await;
        let aggregate = fx.conversation_with(&["one", "two"]).await;
        let first = aggregate.messages[0].id;

        fx.journal
            .messages
            .destroy_message(&fx.ctx, aggregate.conversation.id, first)
            .await
            .unwrap();

        let remaining = fx
            .journal
            .messages
            .list_for_conversation(&fx.ctx, aggregate.conversation.id)
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].content, "two");

        let err = fx
            .journal
            .messages
            .destroy_message(&fx.ctx, aggregate.conversation.id, first)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
