//! Phone calls and the contact's `last_talked_to` field.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::journal::core::context::RequestContext;
use crate::journal::core::errors::{JournalError, JournalResult};
use crate::journal::core::ids::{CallId, ContactId};
use crate::journal::core::models::{Call, Contact};
use crate::journal::dates::clock::Clock;
use crate::journal::storage::call_rows::{
    delete_call, find_call_unscoped, insert_call, latest_call_at, list_calls,
};
use crate::journal::storage::database::Database;
use crate::journal::storage::directory_store::{require_contact, set_last_talked_to};
use crate::journal::storage::event_log::{
    EventAction, EventEntry, EventLog, SubjectType, forget_best_effort, log_best_effort,
};

/// Records calls and keeps `Contact::last_talked_to` in step with them.
#[derive(Clone)]
pub struct CallService {
    db: Database,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventLog>,
}

impl CallService {
    /// Service over `db`, reporting to `events`.
    #[must_use]
    pub fn new(db: Database, clock: Arc<dyn Clock>, events: Arc<dyn EventLog>) -> Self {
        Self { db, clock, events }
    }

    /// Record a call and move `last_talked_to` forward if the call is newer.
    ///
    /// # Errors
    /// `NotFound` if the contact is not in the caller's account.
    pub async fn create_call(
        &self,
        ctx: &RequestContext,
        contact_id: ContactId,
        called_at: DateTime<Utc>,
        content: Option<String>,
    ) -> JournalResult<Call> {
        let content = content.filter(|text| !text.trim().is_empty());
        let account_id = ctx.account_id;
        let call = self
            .db
            .write(move |tx| {
                let mut contact = require_contact(tx, account_id, contact_id)?;
                let call = insert_call(tx, &contact, called_at, content)?;
                let latest = contact.last_talked_to.map_or(called_at, |at| at.max(called_at));
                set_last_talked_to(tx, &mut contact, Some(latest))?;
                Ok(call)
            })
            .await?;

        info!("Recorded call {} with contact {contact_id}", call.id);
        log_best_effort(
            self.events.as_ref(),
            EventEntry {
                account_id,
                subject_type: SubjectType::Call,
                subject_id: *call.id.as_uuid(),
                action: EventAction::Create,
                created_at: self.clock.now(),
            },
        )
        .await;

        Ok(call)
    }

    /// Delete a call of the contact and its activity history.
    ///
    /// `last_talked_to` is recomputed from the remaining calls and cleared when
    /// none are left. Returns the contact as it now stands.
    ///
    /// # Errors
    /// `NotFound` if the contact or the call does not exist, `OwnershipMismatch`
    /// if the call belongs to another account or another contact.
    pub async fn delete_call(
        &self,
        ctx: &RequestContext,
        contact_id: ContactId,
        call_id: CallId,
    ) -> JournalResult<Contact> {
        let account_id = ctx.account_id;
        let contact = self
            .db
            .write(move |tx| {
                let mut contact = require_contact(tx, account_id, contact_id)?;
                let call =
                    find_call_unscoped(tx, call_id)?.ok_or_else(|| JournalError::not_found("call"))?;
                if call.account_id != contact.account_id {
                    return Err(JournalError::OwnershipMismatch(
                        "call belongs to another account".to_string(),
                    ));
                }
                if call.contact_id != contact.id {
                    return Err(JournalError::OwnershipMismatch(
                        "call belongs to another contact".to_string(),
                    ));
                }

                delete_call(tx, &call)?;
                let latest = latest_call_at(tx, contact.account_id, contact.id)?;
                set_last_talked_to(tx, &mut contact, latest)?;
                Ok(contact)
            })
            .await?;

        info!("Deleted call {call_id} of contact {contact_id}");
        forget_best_effort(
            self.events.as_ref(),
            account_id,
            SubjectType::Call,
            *call_id.as_uuid(),
        )
        .await;

        Ok(contact)
    }

    /// Calls with a contact of the caller's account, newest first.
    ///
    /// # Errors
    /// `NotFound` if the contact is not in the caller's account.
    pub async fn list_calls(
        &self,
        ctx: &RequestContext,
        contact_id: ContactId,
    ) -> JournalResult<Vec<Call>> {
        let account_id = ctx.account_id;
        self.db
            .read(move |tx| {
                let contact = require_contact(tx, account_id, contact_id)?;
                list_calls(tx, contact.account_id, contact.id)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::core::errors::ErrorKind;
    use crate::journal::test_support::{Fixture, at};

    #[tokio::test]
    async fn create_call_moves_last_talked_to_forward_only() {
        let fx = Fixture::new().await;
        let calls = &fx.journal.calls;

        calls
            .create_call(&fx.ctx, fx.contact.id, at(2024, 1, 10, 9), Some("catch up".to_string()))
            .await
            .unwrap();
        calls
            .create_call(&fx.ctx, fx.contact.id, at(2023, 6, 1, 9), None)
            .await
            .unwrap();

        let contact = fx.journal.directory.get_contact(&fx.ctx, fx.contact.id).await.unwrap();
        assert_eq!(contact.last_talked_to, Some(at(2024, 1, 10, 9)));
    }

    #[tokio::test]
    async fn blank_call_notes_are_dropped() {
        let fx = Fixture::new().await;
        let call = fx
            .journal
            .calls
            .create_call(&fx.ctx, fx.contact.id, at(2024, 1, 10, 9), Some("  ".to_string()))
            .await
            .unwrap();
        assert_eq!(call.content, None);
    }

    #[tokio::test]
    async fn deleting_the_only_call_clears_last_talked_to() {
        let fx = Fixture::new().await;
        let call = fx
            .journal
            .calls
            .create_call(&fx.ctx, fx.contact.id, at(2024, 1, 10, 9), None)
            .await
            .unwrap();

        let contact = fx
            .journal
            .calls
            .delete_call(&fx.ctx, fx.contact.id, call.id)
            .await
            .unwrap();
        assert_eq!(contact.last_talked_to, None);

        let stored = fx.journal.directory.get_contact(&fx.ctx, fx.contact.id).await.unwrap();
        assert_eq!(stored.last_talked_to, None);
    }

    #[tokio::test]
    async fn deleting_the_latest_call_falls_back_to_the_previous_one() {
        let fx = Fixture::new().await;
        let calls = &fx.journal.calls;
        calls
            .create_call(&fx.ctx, fx.contact.id, at(2024, 1, 1, 9), None)
            .await
            .unwrap();
        let latest = calls
            .create_call(&fx.ctx, fx.contact.id, at(2024, 2, 1, 9), None)
            .await
            .unwrap();

        let contact = calls.delete_call(&fx.ctx, fx.contact.id, latest.id).await.unwrap();
        assert_eq!(contact.last_talked_to, Some(at(2024, 1, 1, 9)));
        assert_eq!(calls.list_calls(&fx.ctx, fx.contact.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_call_removes_its_events() {
        let fx = Fixture::new().await;
        let call = fx
            .journal
            .calls
            .create_call(&fx.ctx, fx.contact.id, at(2024, 1, 10, 9), None)
            .await
            .unwrap();
        let subject = *call.id.as_uuid();
        let logged = fx
            .events
            .list_for_subject(fx.ctx.account_id, SubjectType::Call, subject)
            .await
            .unwrap();
        assert_eq!(logged.len(), 1);

        fx.journal
            .calls
            .delete_call(&fx.ctx, fx.contact.id, call.id)
            .await
            .unwrap();
        let logged = fx
            .events
            .list_for_subject(fx.ctx.account_id, SubjectType::Call, subject)
            .await
            .unwrap();
        assert!(logged.is_empty());
    }

    #[tokio::test]
    async fn delete_call_of_another_account_is_an_ownership_mismatch() {
        let fx = Fixture::new().await;
        let other = fx.other_account().await;
        let stranger = fx
            .journal
            .directory
            .create_contact(&other, "Eve", None)
            .await
            .unwrap();
        let foreign_call = fx
            .journal
            .calls
            .create_call(&other, stranger.id, at(2024, 1, 10, 9), None)
            .await
            .unwrap();

        let err = fx
            .journal
            .calls
            .delete_call(&fx.ctx, fx.contact.id, foreign_call.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OwnershipMismatch);
        assert_eq!(fx.journal.calls.list_calls(&other, stranger.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_call_of_another_contact_is_an_ownership_mismatch() {
        let fx = Fixture::new().await;
        let sibling = fx
            .journal
            .directory
            .create_contact(&fx.ctx, "Grace", Some("Hopper"))
            .await
            .unwrap();
        let call = fx
            .journal
            .calls
            .create_call(&fx.ctx, sibling.id, at(2024, 1, 10, 9), None)
            .await
            .unwrap();

        let err = fx
            .journal
            .calls
            .delete_call(&fx.ctx, fx.contact.id, call.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OwnershipMismatch);
    }

    #[tokio::test]
    async fn delete_unknown_call_is_not_found() {
        let fx = Fixture::new().await;
        let err = fx
            .journal
            .calls
            .delete_call(&fx.ctx, fx.contact.id, CallId::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
