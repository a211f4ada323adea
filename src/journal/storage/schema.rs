//! `SQLite` schema for journal records.
//!
//! `seq` columns carry insertion order and are never exposed. Composite foreign
//! keys pin every child row to the account of its parent.

/// Schema applied on every open; idempotent.
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS accounts (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS contacts (
    id TEXT PRIMARY KEY NOT NULL,
    account_id TEXT NOT NULL,
    first_name TEXT NOT NULL,
    last_name TEXT,
    last_talked_to INTEGER,
    created_at INTEGER NOT NULL,
    UNIQUE (id, account_id),
    FOREIGN KEY (account_id) REFERENCES accounts(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_contacts_account ON contacts (account_id);

CREATE TABLE IF NOT EXISTS contact_field_types (
    id TEXT PRIMARY KEY NOT NULL,
    account_id TEXT NOT NULL,
    name TEXT NOT NULL,
    fontawesome_icon TEXT,
    protocol TEXT,
    UNIQUE (id, account_id),
    FOREIGN KEY (account_id) REFERENCES accounts(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_contact_field_types_account ON contact_field_types (account_id);

CREATE TABLE IF NOT EXISTS conversations (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    account_id TEXT NOT NULL,
    contact_id TEXT NOT NULL,
    contact_field_type_id TEXT NOT NULL,
    happened_at TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    UNIQUE (id, contact_id, account_id),
    FOREIGN KEY (contact_id, account_id)
        REFERENCES contacts(id, account_id) ON DELETE CASCADE,
    FOREIGN KEY (contact_field_type_id, account_id)
        REFERENCES contact_field_types(id, account_id)
);

CREATE INDEX IF NOT EXISTS idx_conversations_contact
    ON conversations (account_id, contact_id, happened_at DESC);

CREATE TABLE IF NOT EXISTS messages (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    conversation_id TEXT NOT NULL,
    contact_id TEXT NOT NULL,
    account_id TEXT NOT NULL,
    content TEXT NOT NULL,
    written_at TEXT NOT NULL,
    written_by_me INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY (conversation_id, contact_id, account_id)
        REFERENCES conversations(id, contact_id, account_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_messages_conversation ON messages (conversation_id, seq);
CREATE INDEX IF NOT EXISTS idx_messages_parent
    ON messages (conversation_id, contact_id, account_id);

CREATE TABLE IF NOT EXISTS calls (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    account_id TEXT NOT NULL,
    contact_id TEXT NOT NULL,
    called_at INTEGER NOT NULL,
    content TEXT,
    FOREIGN KEY (contact_id, account_id)
        REFERENCES contacts(id, account_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_calls_contact ON calls (contact_id, called_at DESC);

CREATE TABLE IF NOT EXISTS events (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    account_id TEXT NOT NULL,
    object_type TEXT NOT NULL,
    object_id TEXT NOT NULL,
    nature_of_operation TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_events_object ON events (account_id, object_type, object_id);
";
