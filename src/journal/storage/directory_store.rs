//! Accounts, contacts and contact field types.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::journal::core::context::RequestContext;
use crate::journal::core::errors::{JournalError, JournalResult};
use crate::journal::core::ids::{AccountId, ContactFieldTypeId, ContactId};
use crate::journal::core::models::{Account, Contact, ContactFieldType};
use crate::journal::dates::clock::Clock;
use crate::journal::storage::database::{Database, millis_at, optional_millis_at, to_millis};

const CONTACT_COLUMNS: &str = "id, account_id, first_name, last_name, last_talked_to, created_at";
const FIELD_TYPE_COLUMNS: &str = "id, account_id, name, fontawesome_icon, protocol";

fn contact_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: row.get(0)?,
        account_id: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        last_talked_to: optional_millis_at(row, 4)?,
        created_at: millis_at(row, 5)?,
    })
}

fn field_type_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ContactFieldType> {
    Ok(ContactFieldType {
        id: row.get(0)?,
        account_id: row.get(1)?,
        name: row.get(2)?,
        fontawesome_icon: row.get(3)?,
        protocol: row.get(4)?,
    })
}

pub(crate) fn require_account(conn: &Connection, id: AccountId) -> JournalResult<Account> {
    conn.query_row(
        "SELECT id, name, created_at FROM accounts WHERE id = ?1",
        [id],
        |row| {
            Ok(Account {
                id: row.get(0)?,
                name: row.get(1)?,
                created_at: millis_at(row, 2)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| JournalError::not_found("account"))
}

/// Contact `id` if it belongs to `account_id`.
pub(crate) fn find_contact(
    conn: &Connection,
    account_id: AccountId,
    id: ContactId,
) -> JournalResult<Option<Contact>> {
    Ok(conn
        .query_row(
            &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1 AND account_id = ?2"),
            rusqlite::params![id, account_id],
            contact_from_row,
        )
        .optional()?)
}

pub(crate) fn require_contact(
    conn: &Connection,
    account_id: AccountId,
    id: ContactId,
) -> JournalResult<Contact> {
    find_contact(conn, account_id, id)?.ok_or_else(|| JournalError::not_found("contact"))
}

pub(crate) fn require_field_type(
    conn: &Connection,
    account_id: AccountId,
    id: ContactFieldTypeId,
) -> JournalResult<ContactFieldType> {
    conn.query_row(
        &format!(
            "SELECT {FIELD_TYPE_COLUMNS} FROM contact_field_types WHERE id = ?1 AND account_id = ?2"
        ),
        rusqlite::params![id, account_id],
        field_type_from_row,
    )
    .optional()?
    .ok_or_else(|| JournalError::not_found("contact field type"))
}

pub(crate) fn set_last_talked_to(
    conn: &Connection,
    contact: &mut Contact,
    at: Option<DateTime<Utc>>,
) -> JournalResult<()> {
    conn.execute(
        "UPDATE contacts SET last_talked_to = ?1 WHERE id = ?2 AND account_id = ?3",
        rusqlite::params![at.map(to_millis), contact.id, contact.account_id],
    )?;
    contact.last_talked_to = at;
    Ok(())
}

/// Tenant directory: the records conversations and calls hang off.
#[derive(Clone)]
pub struct DirectoryStore {
    db: Database,
    clock: Arc<dyn Clock>,
}

impl DirectoryStore {
    /// Directory over `db`.
    #[must_use]
    pub fn new(db: Database, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Create a new account.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    pub async fn create_account(&self, name: &str) -> JournalResult<Account> {
        let account = Account {
            id: AccountId::new(),
            name: name.to_string(),
            created_at: self.clock.now(),
        };
        let row = account.clone();
        self.db
            .write(move |tx| {
                tx.execute(
                    "INSERT INTO accounts (id, name, created_at) VALUES (?1, ?2, ?3)",
                    rusqlite::params![row.id, row.name, to_millis(row.created_at)],
                )?;
                Ok(())
            })
            .await?;
        debug!("Created account {}", account.id);
        Ok(account)
    }

    /// Create a contact in the caller's account.
    ///
    /// # Errors
    /// Returns `NotFound` if the account does not exist.
    pub async fn create_contact(
        &self,
        ctx: &RequestContext,
        first_name: &str,
        last_name: Option<&str>,
    ) -> JournalResult<Contact> {
        let contact = Contact {
            id: ContactId::new(),
            account_id: ctx.account_id,
            first_name: first_name.to_string(),
            last_name: last_name.map(str::to_string),
            last_talked_to: None,
            created_at: self.clock.now(),
        };
        let row = contact.clone();
        self.db
            .write(move |tx| {
                require_account(tx, row.account_id)?;
                tx.execute(
                    "INSERT INTO contacts (id, account_id, first_name, last_name, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    rusqlite::params![
                        row.id,
                        row.account_id,
                        row.first_name,
                        row.last_name,
                        to_millis(row.created_at)
                    ],
                )?;
                Ok(())
            })
            .await?;
        Ok(contact)
    }

    /// Load a contact of the caller's account.
    ///
    /// # Errors
    /// Returns `NotFound` if the contact is missing or belongs to another account.
    pub async fn get_contact(&self, ctx: &RequestContext, id: ContactId) -> JournalResult<Contact> {
        let account_id = ctx.account_id;
        self.db
            .read(move |tx| require_contact(tx, account_id, id))
            .await
    }

    /// Create a channel classification in the caller's account.
    ///
    /// # Errors
    /// Returns `NotFound` if the account does not exist.
    pub async fn create_contact_field_type(
        &self,
        ctx: &RequestContext,
        name: &str,
        fontawesome_icon: Option<&str>,
        protocol: Option<&str>,
    ) -> JournalResult<ContactFieldType> {
        let field_type = ContactFieldType {
            id: ContactFieldTypeId::new(),
            account_id: ctx.account_id,
            name: name.to_string(),
            fontawesome_icon: fontawesome_icon.map(str::to_string),
            protocol: protocol.map(str::to_string),
        };
        let row = field_type.clone();
        self.db
            .write(move |tx| {
                require_account(tx, row.account_id)?;
                tx.execute(
                    &format!(
                        "INSERT INTO contact_field_types ({FIELD_TYPE_COLUMNS})
                         VALUES (?1, ?2, ?3, ?4, ?5)"
                    ),
                    rusqlite::params![
                        row.id,
                        row.account_id,
                        row.name,
                        row.fontawesome_icon,
                        row.protocol
                    ],
                )?;
                Ok(())
            })
            .await?;
        Ok(field_type)
    }

    /// Load a channel classification of the caller's account.
    ///
    /// # Errors
    /// Returns `NotFound` if it is missing or belongs to another account.
    pub async fn get_contact_field_type(
        &self,
        ctx: &RequestContext,
        id: ContactFieldTypeId,
    ) -> JournalResult<ContactFieldType> {
        let account_id = ctx.account_id;
        self.db
            .read(move |tx| require_field_type(tx, account_id, id))
            .await
    }

    /// Channel classifications offered by the conversation forms, by name.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    pub async fn list_contact_field_types(
        &self,
        ctx: &RequestContext,
    ) -> JournalResult<Vec<ContactFieldType>> {
        let account_id = ctx.account_id;
        self.db
            .read(move |tx| {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {FIELD_TYPE_COLUMNS} FROM contact_field_types
                     WHERE account_id = ?1
                     ORDER BY name"
                ))?;
                let rows = stmt
                    .query_map([account_id], field_type_from_row)?
                    .collect::<Result<Vec<_>, rusqlite::Error>>()?;
                Ok(rows)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::core::errors::ErrorKind;
    use crate::journal::dates::clock::FixedClock;
    use chrono::TimeZone;

    async fn store() -> DirectoryStore {
        let db = Database::open_in_memory().await.unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        DirectoryStore::new(db, Arc::new(FixedClock::at(now)))
    }

    #[tokio::test]
    async fn contacts_are_scoped_to_their_account() {
        let store = store().await;
        let a = RequestContext::new(store.create_account("A").await.unwrap().id);
        let b = RequestContext::new(store.create_account("B").await.unwrap().id);

        let contact = store.create_contact(&a, "Ada", Some("Lovelace")).await.unwrap();
        assert_eq!(store.get_contact(&a, contact.id).await.unwrap(), contact);

        let err = store.get_contact(&b, contact.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn contact_requires_an_existing_account() {
        let store = store().await;
        let ghost = RequestContext::new(AccountId::new());
        let err = store.create_contact(&ghost, "Nobody", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn field_types_list_by_name() {
        let store = store().await;
        let ctx = RequestContext::new(store.create_account("A").await.unwrap().id);
        store
            .create_contact_field_type(&ctx, "SMS", Some("fa fa-mobile"), None)
            .await
            .unwrap();
        store
            .create_contact_field_type(&ctx, "Email", Some("fa fa-envelope-open-o"), Some("mailto:"))
            .await
            .unwrap();

        let names: Vec<String> = store
            .list_contact_field_types(&ctx)
            .await
            .unwrap()
            .into_iter()
            .map(|ft| ft.name)
            .collect();
        assert_eq!(names, vec!["Email".to_string(), "SMS".to_string()]);
    }
}
