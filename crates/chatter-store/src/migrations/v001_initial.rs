//! v001 -- Initial schema creation.
//!
//! A single `records` table holds every collection: a record is a JSON
//! value stored under `(path, key)`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS records (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT,  -- write order
    path       TEXT NOT NULL,                      -- e.g. messages/<channel id>
    key        TEXT NOT NULL,                      -- push key
    value      TEXT NOT NULL,                      -- JSON document
    written_at TEXT NOT NULL,                      -- RFC-3339

    UNIQUE (path, key)
);

CREATE INDEX IF NOT EXISTS idx_records_path_key ON records(path, key);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
