//! Persistence layer
//!
//! One SQLite database holds the registered books and their per-date
//! records. Raw HTML is stored alongside the extracted plain text so the
//! markup reducer can be re-run at render time without a re-crawl.

mod schema;
mod sqlite;
mod traits;

use chrono::NaiveDate;

pub use schema::{initialize_schema, SCHEMA_SQL};
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

/// A translation language with a dedicated column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Ukrainian,
    Russian,
    English,
}

impl Language {
    pub(crate) fn column(self) -> &'static str {
        match self {
            Language::Ukrainian => "translation_uk",
            Language::Russian => "translation_ru",
            Language::English => "translation_en",
        }
    }
}

/// A registered book
#[derive(Debug, Clone)]
pub struct BookRecord {
    pub id: i64,
    pub title: String,
    pub source_url: Option<String>,
    pub is_parsed: bool,
}

/// One stored reading, keyed by (book, date)
#[derive(Debug, Clone)]
pub struct InspirationRecord {
    pub id: i64,
    pub book_id: i64,
    pub date: NaiveDate,
    pub raw_html: String,
    pub plain_text: String,
    pub translation_uk: Option<String>,
    pub translation_ru: Option<String>,
    pub translation_en: Option<String>,
    pub source_url: String,
}

impl InspirationRecord {
    /// The text to present in a language, falling back to the original
    pub fn text_for_language(&self, language: Language) -> &str {
        let translation = match language {
            Language::Ukrainian => &self.translation_uk,
            Language::Russian => &self.translation_ru,
            Language::English => &self.translation_en,
        };
        translation.as_deref().unwrap_or(&self.plain_text)
    }
}
