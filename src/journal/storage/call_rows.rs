//! Row-level access to phone calls.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};

use crate::journal::core::errors::JournalResult;
use crate::journal::core::ids::{AccountId, CallId, ContactId};
use crate::journal::core::models::{Call, Contact};
use crate::journal::storage::database::{millis_at, optional_millis_at, to_millis};

const CALL_COLUMNS: &str = "id, account_id, contact_id, called_at, content";

fn call_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Call> {
    Ok(Call {
        id: row.get(0)?,
        account_id: row.get(1)?,
        contact_id: row.get(2)?,
        called_at: millis_at(row, 3)?,
        content: row.get(4)?,
    })
}

pub(crate) fn insert_call(
    conn: &Connection,
    contact: &Contact,
    called_at: DateTime<Utc>,
    content: Option<String>,
) -> JournalResult<Call> {
    let call = Call {
        id: CallId::new(),
        account_id: contact.account_id,
        contact_id: contact.id,
        called_at,
        content,
    };
    conn.execute(
        &format!("INSERT INTO calls ({CALL_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
        rusqlite::params![
            call.id,
            call.account_id,
            call.contact_id,
            to_millis(call.called_at),
            call.content
        ],
    )?;
    Ok(call)
}

/// Look a call up by id alone, whatever account it belongs to.
///
/// Callers compare the result's ownership against the contact they act on.
pub(crate) fn find_call_unscoped(conn: &Connection, id: CallId) -> JournalResult<Option<Call>> {
    Ok(conn
        .query_row(
            &format!("SELECT {CALL_COLUMNS} FROM calls WHERE id = ?1"),
            [id],
            call_from_row,
        )
        .optional()?)
}

pub(crate) fn delete_call(conn: &Connection, call: &Call) -> JournalResult<()> {
    conn.execute(
        "DELETE FROM calls WHERE id = ?1 AND account_id = ?2",
        rusqlite::params![call.id, call.account_id],
    )?;
    Ok(())
}

/// Time of the contact's most recent call, if any remain.
pub(crate) fn latest_call_at(
    conn: &Connection,
    account_id: AccountId,
    contact_id: ContactId,
) -> JournalResult<Option<DateTime<Utc>>> {
    Ok(conn.query_row(
        "SELECT MAX(called_at) FROM calls WHERE account_id = ?1 AND contact_id = ?2",
        rusqlite::params![account_id, contact_id],
        |row| optional_millis_at(row, 0),
    )?)
}

/// Calls with a contact, newest first.
pub(crate) fn list_calls(
    conn: &Connection,
    account_id: AccountId,
    contact_id: ContactId,
) -> JournalResult<Vec<Call>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CALL_COLUMNS} FROM calls
         WHERE account_id = ?1 AND contact_id = ?2
         ORDER BY called_at DESC, seq DESC"
    ))?;
    let rows = stmt
        .query_map(rusqlite::params![account_id, contact_id], call_from_row)?
        .collect::<Result<Vec<_>, rusqlite::Error>>()?;
    Ok(rows)
}
