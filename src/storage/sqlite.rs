//! SQLite-backed storage

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row};
use std::path::Path;

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{BookRecord, InspirationRecord, Language};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite implementation of [`Storage`]
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (creating if needed) a database file and applies the schema
    pub fn new<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn row_to_inspiration(row: &Row<'_>) -> rusqlite::Result<InspirationRecord> {
        let date_text: String = row.get("date")?;
        let date = NaiveDate::parse_from_str(&date_text, DATE_FORMAT).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?;

        Ok(InspirationRecord {
            id: row.get("id")?,
            book_id: row.get("book_id")?,
            date,
            raw_html: row.get("raw_html")?,
            plain_text: row.get("plain_text")?,
            translation_uk: row.get("translation_uk")?,
            translation_ru: row.get("translation_ru")?,
            translation_en: row.get("translation_en")?,
            source_url: row.get("source_url")?,
        })
    }
}

impl Storage for SqliteStorage {
    fn insert_book(&mut self, title: &str, source_url: Option<&str>) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO books (title, source_url) VALUES (?1, ?2)",
            (title, source_url),
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_book(&self, book_id: i64) -> StorageResult<Option<BookRecord>> {
        let book = self
            .conn
            .query_row(
                "SELECT id, title, source_url, is_parsed FROM books WHERE id = ?1",
                [book_id],
                |row| {
                    Ok(BookRecord {
                        id: row.get("id")?,
                        title: row.get("title")?,
                        source_url: row.get("source_url")?,
                        is_parsed: row.get::<_, i64>("is_parsed")? != 0,
                    })
                },
            )
            .optional()?;
        Ok(book)
    }

    fn mark_book_parsed(&mut self, book_id: i64) -> StorageResult<()> {
        let updated = self
            .conn
            .execute(
                "UPDATE books SET is_parsed = 1, last_parsed_at = datetime('now') WHERE id = ?1",
                [book_id],
            )?;
        if updated == 0 {
            return Err(StorageError::BookNotFound(book_id));
        }
        Ok(())
    }

    fn upsert_inspiration(
        &mut self,
        book_id: i64,
        date: NaiveDate,
        raw_html: &str,
        plain_text: &str,
        source_url: &str,
    ) -> StorageResult<i64> {
        let id = self.conn.query_row(
            "INSERT INTO inspirations (book_id, date, raw_html, plain_text, source_url)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (book_id, date) DO UPDATE SET
                 raw_html = excluded.raw_html,
                 plain_text = excluded.plain_text,
                 source_url = excluded.source_url,
                 updated_at = datetime('now')
             RETURNING id",
            (
                book_id,
                date.format(DATE_FORMAT).to_string(),
                raw_html,
                plain_text,
                source_url,
            ),
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn get_inspiration(
        &self,
        book_id: i64,
        date: NaiveDate,
    ) -> StorageResult<Option<InspirationRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT id, book_id, date, raw_html, plain_text,
                        translation_uk, translation_ru, translation_en, source_url
                 FROM inspirations WHERE book_id = ?1 AND date = ?2",
                (book_id, date.format(DATE_FORMAT).to_string()),
                Self::row_to_inspiration,
            )
            .optional()?;
        Ok(record)
    }

    fn set_translation(
        &mut self,
        inspiration_id: i64,
        language: Language,
        text: &str,
    ) -> StorageResult<()> {
        // Column name comes from a fixed enum, not user input
        let sql = format!(
            "UPDATE inspirations SET {} = ?1, updated_at = datetime('now') WHERE id = ?2",
            language.column()
        );
        let updated = self.conn.execute(&sql, (text, inspiration_id))?;
        if updated == 0 {
            return Err(StorageError::InspirationNotFound(inspiration_id));
        }
        Ok(())
    }

    fn count_inspirations(&self, book_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM inspirations WHERE book_id = ?1",
            [book_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_insert_and_get_book() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let id = storage
            .insert_book("Ранкові читання", Some("https://site/day-1"))
            .unwrap();

        let book = storage.get_book(id).unwrap().unwrap();
        assert_eq!(book.title, "Ранкові читання");
        assert_eq!(book.source_url.as_deref(), Some("https://site/day-1"));
        assert!(!book.is_parsed);
    }

    #[test]
    fn test_get_missing_book() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        assert!(storage.get_book(42).unwrap().is_none());
    }

    #[test]
    fn test_mark_book_parsed() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let id = storage.insert_book("b", None).unwrap();

        storage.mark_book_parsed(id).unwrap();
        assert!(storage.get_book(id).unwrap().unwrap().is_parsed);
    }

    #[test]
    fn test_mark_missing_book_parsed() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        assert!(matches!(
            storage.mark_book_parsed(42),
            Err(StorageError::BookNotFound(42))
        ));
    }

    #[test]
    fn test_upsert_inserts_then_overwrites() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let book = storage.insert_book("b", None).unwrap();
        let day = date(2025, 1, 1);

        let first = storage
            .upsert_inspiration(book, day, "<p>old</p>", "old", "https://site/p1")
            .unwrap();
        let second = storage
            .upsert_inspiration(book, day, "<p>new</p>", "new", "https://site/p1b")
            .unwrap();

        // Same (book, date) means same row
        assert_eq!(first, second);
        assert_eq!(storage.count_inspirations(book).unwrap(), 1);

        let record = storage.get_inspiration(book, day).unwrap().unwrap();
        assert_eq!(record.raw_html, "<p>new</p>");
        assert_eq!(record.plain_text, "new");
        assert_eq!(record.source_url, "https://site/p1b");
    }

    #[test]
    fn test_upsert_preserves_translations() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let book = storage.insert_book("b", None).unwrap();
        let day = date(2025, 3, 3);

        let id = storage
            .upsert_inspiration(book, day, "<p>x</p>", "x", "https://site/p1")
            .unwrap();
        storage
            .set_translation(id, Language::English, "translated")
            .unwrap();
        storage
            .upsert_inspiration(book, day, "<p>y</p>", "y", "https://site/p1")
            .unwrap();

        let record = storage.get_inspiration(book, day).unwrap().unwrap();
        assert_eq!(record.translation_en.as_deref(), Some("translated"));
        assert_eq!(record.plain_text, "y");
    }

    #[test]
    fn test_set_translation_for_missing_record() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        assert!(matches!(
            storage.set_translation(9, Language::Ukrainian, "t"),
            Err(StorageError::InspirationNotFound(9))
        ));
    }

    #[test]
    fn test_distinct_dates_are_distinct_rows() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let book = storage.insert_book("b", None).unwrap();

        storage
            .upsert_inspiration(book, date(2025, 1, 1), "<p>a</p>", "a", "https://s/1")
            .unwrap();
        storage
            .upsert_inspiration(book, date(2025, 1, 2), "<p>b</p>", "b", "https://s/2")
            .unwrap();

        assert_eq!(storage.count_inspirations(book).unwrap(), 2);
    }
}
