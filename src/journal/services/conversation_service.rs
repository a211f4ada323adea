//! Conversation aggregate writes.
//!
//! Every operation runs in a single transaction. Messages are never edited one by
//! one: an edit deletes the whole batch and inserts the new one, so message ids do
//! not survive edits.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::journal::core::context::RequestContext;
use crate::journal::core::errors::JournalResult;
use crate::journal::core::ids::{ContactFieldTypeId, ConversationId};
use crate::journal::core::models::{
    Conversation, ConversationAggregate, EditConversation, MessageDraft, NewConversation,
    NewMessage,
};
use crate::journal::dates::clock::Clock;
use crate::journal::storage::conversation_rows::{
    insert_conversation, load_aggregate, require_conversation, touch, update_metadata,
};
use crate::journal::storage::database::Database;
use crate::journal::storage::directory_store::{require_contact, require_field_type};
use crate::journal::storage::event_log::{
    EventAction, EventEntry, EventLog, SubjectType, log_best_effort,
};
use crate::journal::storage::message_store::{delete_messages, insert_message};

/// Delete the current batch of `conversation` and insert `messages` in order.
fn replace_batch(
    conn: &Connection,
    conversation: &mut Conversation,
    messages: &[NewMessage],
    now: DateTime<Utc>,
) -> JournalResult<usize> {
    let removed = delete_messages(conn, conversation)?;
    for message in messages {
        insert_message(conn, conversation, message)?;
    }
    touch(conn, conversation, now)?;
    Ok(removed)
}

fn validate_batch(messages: &[NewMessage]) -> JournalResult<()> {
    messages.iter().try_for_each(NewMessage::validate)
}

fn stamp(drafts: Vec<MessageDraft>, written_at: NaiveDate) -> Vec<NewMessage> {
    drafts
        .into_iter()
        .map(|draft| draft.written_on(written_at))
        .collect()
}

/// Creates and edits conversations together with their messages.
#[derive(Clone)]
pub struct ConversationService {
    db: Database,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventLog>,
}

impl ConversationService {
    /// Service over `db`, reporting creations to `events`.
    #[must_use]
    pub fn new(db: Database, clock: Arc<dyn Clock>, events: Arc<dyn EventLog>) -> Self {
        Self { db, clock, events }
    }

    /// Create a conversation and its initial messages atomically.
    ///
    /// An empty batch is the caller's mistake; it still yields a conversation
    /// without messages.
    ///
    /// # Errors
    /// `NotFound` if the contact or the field type is not in the caller's account,
    /// `InvalidMessage` for blank content, and a persistence failure if any insert
    /// fails. Nothing is written in any of these cases.
    pub async fn create_conversation(
        &self,
        ctx: &RequestContext,
        input: NewConversation,
    ) -> JournalResult<ConversationAggregate> {
        validate_batch(&input.messages)?;
        if input.messages.is_empty() {
            warn!("Creating conversation for contact {} without messages", input.contact_id);
        }

        let account_id = ctx.account_id;
        let now = self.clock.now();
        let aggregate = self
            .db
            .write(move |tx| {
                let contact = require_contact(tx, account_id, input.contact_id)?;
                let contact_field_type =
                    require_field_type(tx, account_id, input.contact_field_type_id)?;
                let conversation =
                    insert_conversation(tx, &contact, &contact_field_type, input.happened_at, now)?;
                let messages = input
                    .messages
                    .iter()
                    .map(|message| insert_message(tx, &conversation, message))
                    .collect::<JournalResult<Vec<_>>>()?;
                Ok(ConversationAggregate {
                    conversation,
                    contact,
                    contact_field_type,
                    messages,
                })
            })
            .await?;

        info!(
            "Created conversation {} with {} messages",
            aggregate.conversation.id,
            aggregate.messages.len()
        );
        log_best_effort(
            self.events.as_ref(),
            EventEntry {
                account_id,
                subject_type: SubjectType::Conversation,
                subject_id: *aggregate.conversation.id.as_uuid(),
                action: EventAction::Create,
                created_at: now,
            },
        )
        .await;

        Ok(aggregate)
    }

    /// Change the channel and date of a conversation; messages stay as they are.
    ///
    /// # Errors
    /// `NotFound` if the conversation or the field type is not in the caller's
    /// account.
    pub async fn update_conversation(
        &self,
        ctx: &RequestContext,
        conversation_id: ConversationId,
        contact_field_type_id: ContactFieldTypeId,
        happened_at: NaiveDate,
    ) -> JournalResult<ConversationAggregate> {
        let account_id = ctx.account_id;
        let now = self.clock.now();
        let aggregate = self
            .db
            .write(move |tx| {
                let mut conversation = require_conversation(tx, account_id, conversation_id)?;
                require_field_type(tx, account_id, contact_field_type_id)?;
                update_metadata(tx, &mut conversation, contact_field_type_id, happened_at, now)?;
                load_aggregate(tx, conversation)
            })
            .await?;
        debug!("Updated conversation {conversation_id}");
        Ok(aggregate)
    }

    /// Replace every message of a conversation with `drafts`, all dated
    /// `written_at`.
    ///
    /// This is a full replace: messages absent from `drafts` are gone and the
    /// kept ones get new ids.
    ///
    /// # Errors
    /// `NotFound` for a foreign or missing conversation, `InvalidMessage` for blank
    /// content, and a persistence failure if any statement fails. On error the
    /// previous messages are left untouched.
    pub async fn replace_messages(
        &self,
        ctx: &RequestContext,
        conversation_id: ConversationId,
        written_at: NaiveDate,
        drafts: Vec<MessageDraft>,
    ) -> JournalResult<ConversationAggregate> {
        let messages = stamp(drafts, written_at);
        validate_batch(&messages)?;

        let account_id = ctx.account_id;
        let now = self.clock.now();
        let (aggregate, removed) = self
            .db
            .write(move |tx| {
                let mut conversation = require_conversation(tx, account_id, conversation_id)?;
                let removed = replace_batch(tx, &mut conversation, &messages, now)?;
                Ok((load_aggregate(tx, conversation)?, removed))
            })
            .await?;

        debug!(
            "Replaced {removed} messages of conversation {conversation_id} with {}",
            aggregate.messages.len()
        );
        Ok(aggregate)
    }

    /// Apply the edit form: new channel and date plus a full message replace,
    /// in one transaction. Replacement messages are dated `happened_at`.
    ///
    /// # Errors
    /// Same as [`Self::update_conversation`] and [`Self::replace_messages`];
    /// on error neither the metadata nor the messages change.
    pub async fn edit_conversation(
        &self,
        ctx: &RequestContext,
        edit: EditConversation,
    ) -> JournalResult<ConversationAggregate> {
        let EditConversation {
            conversation_id,
            contact_field_type_id,
            happened_at,
            messages,
        } = edit;
        let messages = stamp(messages, happened_at);
        validate_batch(&messages)?;

        let account_id = ctx.account_id;
        let now = self.clock.now();
        let aggregate = self
            .db
            .write(move |tx| {
                let mut conversation = require_conversation(tx, account_id, conversation_id)?;
                require_field_type(tx, account_id, contact_field_type_id)?;
                update_metadata(tx, &mut conversation, contact_field_type_id, happened_at, now)?;
                replace_batch(tx, &mut conversation, &messages, now)?;
                load_aggregate(tx, conversation)
            })
            .await?;

        info!(
            "Edited conversation {conversation_id}, now {} messages",
            aggregate.messages.len()
        );
        Ok(aggregate)
    }
}
