//! SQL schema for the Roster SQLite store.
//!
//! Applied once, on the first pooled connection, when the engine starts.
//! Future migrations will be gated on `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE … IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id            TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,     -- argon2 PHC string; never selected for responses
    is_active     INTEGER NOT NULL DEFAULT 1 CHECK (is_active IN (0, 1)),
    created_at    TEXT NOT NULL,     -- RFC 3339 UTC, microsecond precision
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS entities (
    id           TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    kind         TEXT NOT NULL CHECK (kind IN ('person', 'organization', 'group')),
    owner_id     TEXT REFERENCES entities(id),
    external_ref INTEGER,            -- external-system reference; internal only
    extra        TEXT NOT NULL DEFAULT '{}',
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL,
    CHECK (owner_id IS NULL OR owner_id != id)
);

CREATE INDEX IF NOT EXISTS users_created_idx           ON users(created_at);
CREATE INDEX IF NOT EXISTS users_updated_idx           ON users(updated_at);
CREATE INDEX IF NOT EXISTS entities_created_idx        ON entities(created_at);
CREATE INDEX IF NOT EXISTS entities_updated_idx        ON entities(updated_at);
CREATE INDEX IF NOT EXISTS entities_owner_idx          ON entities(owner_id);
CREATE INDEX IF NOT EXISTS entities_external_ref_idx   ON entities(external_ref);

PRAGMA user_version = 1;
";

/// Per-connection settings for every pooled connection after the first.
/// `foreign_keys` is connection-scoped in SQLite.
pub const CONNECTION_PRAGMAS: &str = "
PRAGMA foreign_keys = ON;
";
