//! Lectio: a daily-reading book crawler and markup reducer
//!
//! This crate crawls a paginated "daily reading" book site into one stored
//! record per calendar date, and reduces stored raw HTML into the restricted
//! inline-tag subset accepted by a constrained rich-text renderer.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod markup;
pub mod storage;

use thiserror::Error;

/// Usage errors surfaced at the command-line boundary
///
/// Run-time crawl failures never take this form; they are accumulated in
/// [`crawler::CrawlRunStats`] instead, and storage failures carry their own
/// [`storage::StorageError`].
#[derive(Debug, Error)]
pub enum LectioError {
    #[error("Book not found: {0}")]
    BookNotFound(i64),

    #[error("Book {0} has no source URL and no start URL was given")]
    MissingStartUrl(i64),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlRunStats, CrawlTarget};
pub use markup::reduce;
