//! Book crawling
//!
//! Splits into two layers: the fetchers retrieve raw HTML for one URL
//! (plain HTTP or a headless browser), and the coordinator walks a book's
//! pages, extracts each reading, and persists it.

mod coordinator;
mod fetcher;

pub use coordinator::{
    BookCrawler, CrawlFailure, CrawlRunStats, CrawlTarget, DEFAULT_DELAY, DEFAULT_MAX_PAGES,
};
pub use fetcher::{build_fetcher, BrowserFetcher, FetchError, HttpFetcher, PageFetcher};
