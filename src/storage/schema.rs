//! Database schema definition

use rusqlite::Connection;

/// SQL schema, applied idempotently on every open
///
/// The `UNIQUE (book_id, date)` constraint is what makes re-crawls
/// idempotent: a page seen again for the same date updates the existing
/// record instead of inserting a second one.
pub const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    source_url TEXT,
    is_parsed INTEGER NOT NULL DEFAULT 0,
    last_parsed_at TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS inspirations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    book_id INTEGER NOT NULL REFERENCES books(id),
    date TEXT NOT NULL,
    raw_html TEXT NOT NULL,
    plain_text TEXT NOT NULL,
    translation_uk TEXT,
    translation_ru TEXT,
    translation_en TEXT,
    source_url TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE (book_id, date)
);

CREATE INDEX IF NOT EXISTS idx_inspirations_date ON inspirations (date);
CREATE INDEX IF NOT EXISTS idx_inspirations_book ON inspirations (book_id);
";

/// Applies the schema to a connection
pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}
