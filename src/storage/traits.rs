//! Storage abstraction
//!
//! The crawler talks to persistence through the [`Storage`] trait so tests
//! and alternative backends can stand in for SQLite.

use chrono::NaiveDate;
use thiserror::Error;

use crate::storage::{BookRecord, InspirationRecord, Language};

/// Storage-specific errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("book not found: {0}")]
    BookNotFound(i64),

    #[error("inspiration not found: {0}")]
    InspirationNotFound(i64),
}

/// Result type alias for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Persistence operations the crawler and renderer need
pub trait Storage {
    /// Registers a book and returns its id
    fn insert_book(&mut self, title: &str, source_url: Option<&str>) -> StorageResult<i64>;

    /// Looks up a book by id
    fn get_book(&self, book_id: i64) -> StorageResult<Option<BookRecord>>;

    /// Marks a book's crawl as completed
    ///
    /// Returns [`StorageError::BookNotFound`] when the id does not exist.
    fn mark_book_parsed(&mut self, book_id: i64) -> StorageResult<()>;

    /// Inserts or updates the record for one (book, date) pair
    ///
    /// On conflict the content fields are overwritten and `updated_at`
    /// refreshed; translations are left untouched. Returns the record id.
    fn upsert_inspiration(
        &mut self,
        book_id: i64,
        date: NaiveDate,
        raw_html: &str,
        plain_text: &str,
        source_url: &str,
    ) -> StorageResult<i64>;

    /// Fetches the record for one (book, date) pair
    fn get_inspiration(
        &self,
        book_id: i64,
        date: NaiveDate,
    ) -> StorageResult<Option<InspirationRecord>>;

    /// Stores a translation of a record's text
    fn set_translation(
        &mut self,
        inspiration_id: i64,
        language: Language,
        text: &str,
    ) -> StorageResult<()>;

    /// Counts the stored records for a book
    fn count_inspirations(&self, book_id: i64) -> StorageResult<u64>;
}
