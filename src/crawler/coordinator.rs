//! Crawl coordination
//!
//! Walks a book site page by page from a start URL, storing one record per
//! calendar date. The walk is resumable and idempotent: records are keyed
//! by (book, date) and upserted, so re-running a crawl refreshes content
//! instead of duplicating it.
//!
//! Stop conditions, in the order they are checked:
//! - A fetch failure or missing content container (recorded as an error)
//! - A stored date of December 31 (the book year is complete)
//! - No next-page link found
//! - The page cap
//!
//! Whatever ends the walk, the book is marked parsed so a scheduler does
//! not restart a crawl that already ran to its natural end.

use chrono::{Datelike, NaiveDate};
use scraper::Html;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

use crate::crawler::fetcher::PageFetcher;
use crate::extract::{extract_content, extract_date, resolve_next};
use crate::storage::Storage;

/// Default upper bound on pages fetched in one run
pub const DEFAULT_MAX_PAGES: u32 = 400;

/// Default politeness delay between page fetches
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// One crawl run's parameters
#[derive(Debug, Clone)]
pub struct CrawlTarget {
    pub book_id: i64,
    pub start_url: Url,
    pub delay: Duration,
    pub max_pages: u32,
}

impl CrawlTarget {
    pub fn new(book_id: i64, start_url: Url) -> Self {
        Self {
            book_id,
            start_url,
            delay: DEFAULT_DELAY,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// One recorded failure during a crawl run
#[derive(Debug, Clone)]
pub struct CrawlFailure {
    pub url: String,
    pub message: String,
}

/// Counters and failures accumulated over one crawl run
#[derive(Debug, Default)]
pub struct CrawlRunStats {
    pub pages_fetched: u32,
    pub records_upserted: u32,
    pub records_skipped: u32,
    pub errors: Vec<CrawlFailure>,
}

impl CrawlRunStats {
    fn record_error(&mut self, url: &Url, message: String) {
        tracing::error!("{}: {}", url, message);
        self.errors.push(CrawlFailure {
            url: url.to_string(),
            message,
        });
    }

    /// True when the run finished without recording any failure
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// One-line human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "fetched {} pages, stored {} records, skipped {} duplicate dates, {} errors",
            self.pages_fetched,
            self.records_upserted,
            self.records_skipped,
            self.errors.len()
        )
    }
}

/// Drives one crawl run over a fetcher and a storage backend
pub struct BookCrawler<'a, S: Storage> {
    storage: &'a mut S,
    fetcher: &'a mut PageFetcher,
}

impl<'a, S: Storage> BookCrawler<'a, S> {
    pub fn new(storage: &'a mut S, fetcher: &'a mut PageFetcher) -> Self {
        Self { storage, fetcher }
    }

    /// Crawls a book from its start URL until a stop condition fires
    ///
    /// Failures never propagate out of the run; they are recorded in the
    /// returned stats. Fetch failures end the run, storage failures on a
    /// single record do not.
    pub async fn run(&mut self, target: &CrawlTarget) -> CrawlRunStats {
        let mut stats = CrawlRunStats::default();
        let mut stored_dates: HashSet<NaiveDate> = HashSet::new();
        let mut current_url = target.start_url.clone();

        loop {
            tracing::debug!("Fetching {}", current_url);
            let raw_html = match self.fetcher.fetch(current_url.as_str()).await {
                Ok(html) => html,
                Err(e) => {
                    stats.record_error(&current_url, format!("fetch failed: {}", e));
                    break;
                }
            };
            stats.pages_fetched += 1;

            let document = Html::parse_document(&raw_html);
            let region = match extract_content(&document) {
                Some(region) => region,
                None => {
                    stats.record_error(&current_url, "no content container found".to_string());
                    break;
                }
            };

            // The date must come from the content region; the next link can
            // live anywhere on the page (navigation chrome included).
            let content = Html::parse_fragment(&region.html);
            let date = extract_date(&content);
            let next_url = resolve_next(&document, &current_url);

            let mut year_complete = false;
            match date {
                Some(date) if stored_dates.contains(&date) => {
                    tracing::debug!("Duplicate date {} on {}, keeping first record", date, current_url);
                    stats.records_skipped += 1;
                }
                Some(date) => {
                    match self.storage.upsert_inspiration(
                        target.book_id,
                        date,
                        &region.html,
                        &region.text,
                        current_url.as_str(),
                    ) {
                        Ok(_) => {
                            tracing::info!("Stored reading for {} from {}", date, current_url);
                            stored_dates.insert(date);
                            stats.records_upserted += 1;
                            year_complete = date.month() == 12 && date.day() == 31;
                        }
                        Err(e) => {
                            stats.record_error(&current_url, format!("storage failed: {}", e));
                        }
                    }
                }
                None => {
                    tracing::warn!("No date found on {}, page skipped", current_url);
                }
            }

            if year_complete {
                tracing::info!("Reached December 31, book is complete");
                break;
            }

            let Some(next_url) = next_url else {
                tracing::info!("No next link on {}, crawl finished", current_url);
                break;
            };
            if stats.pages_fetched >= target.max_pages {
                tracing::warn!(
                    "Page cap of {} reached, stopping before {}",
                    target.max_pages,
                    next_url
                );
                break;
            }

            current_url = next_url;
            if !target.delay.is_zero() {
                tokio::time::sleep(target.delay).await;
            }
        }

        // Mark the book parsed even on failure so a scheduler does not spin
        // on a dead site; --force re-enables crawling.
        if let Err(e) = self.storage.mark_book_parsed(target.book_id) {
            stats.record_error(&target.start_url, format!("could not mark book parsed: {}", e));
        }

        stats
    }
}
