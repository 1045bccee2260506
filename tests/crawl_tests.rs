//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for a reading site and run the
//! full crawl cycle end-to-end against a real SQLite database.

use chrono::{Datelike, Local, NaiveDate};
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lectio::crawler::{BookCrawler, CrawlTarget, HttpFetcher, PageFetcher};
use lectio::reduce;
use lectio::storage::{SqliteStorage, Storage};

fn open_storage(dir: &TempDir) -> SqliteStorage {
    SqliteStorage::new(dir.path().join("test.db")).expect("Failed to open test database")
}

fn http_fetcher(timeout: Duration) -> PageFetcher {
    PageFetcher::Http(HttpFetcher::new("TestAgent/1.0", timeout).expect("Failed to build fetcher"))
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn target(book_id: i64, url: &str) -> CrawlTarget {
    let mut target = CrawlTarget::new(book_id, Url::parse(url).expect("Failed to parse URL"));
    target.delay = Duration::ZERO;
    target
}

#[tokio::test]
async fn test_full_crawl_two_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/day-1",
        format!(
            r#"<html><body>
            <div class="content">
                <h2>1 січня</h2>
                <p><span class="egw_content">Hello <strong>World</strong></span></p>
            </div>
            <nav><a href="{}/day-2">Next</a></nav>
            </body></html>"#,
            base_url
        ),
    )
    .await;

    mount_page(
        &mock_server,
        "/day-2",
        r#"<html><body>
        <div class="content"><p>Closing page without a dated reading.</p></div>
        </body></html>"#
            .to_string(),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut storage = open_storage(&dir);
    let book_id = storage.insert_book("Test Book", None).unwrap();

    let mut fetcher = http_fetcher(Duration::from_secs(5));
    let stats = BookCrawler::new(&mut storage, &mut fetcher)
        .run(&target(book_id, &format!("{}/day-1", base_url)))
        .await;

    assert!(stats.is_clean(), "unexpected errors: {:?}", stats.errors);
    assert_eq!(stats.pages_fetched, 2);
    assert_eq!(stats.records_upserted, 1);
    assert_eq!(stats.records_skipped, 0);

    let date = NaiveDate::from_ymd_opt(Local::now().year(), 1, 1).unwrap();
    let record = storage
        .get_inspiration(book_id, date)
        .unwrap()
        .expect("record for January 1 should exist");
    assert!(record.raw_html.contains("World"));
    assert!(record.plain_text.contains("Hello World"));
    assert!(record.source_url.ends_with("/day-1"));

    // Rendering reduces the stored raw HTML on the fly
    assert_eq!(reduce(&record.raw_html), "Hello <b>World</b>");

    assert!(storage.get_book(book_id).unwrap().unwrap().is_parsed);
}

#[tokio::test]
async fn test_duplicate_date_keeps_first_record() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/p1",
        format!(
            r#"<html><body>
            <div class="content"><h2>5 травня</h2><p>first version</p></div>
            <a href="{}/p2">Next</a>
            </body></html>"#,
            base_url
        ),
    )
    .await;

    mount_page(
        &mock_server,
        "/p2",
        r#"<html><body>
        <div class="content"><h2>5 травня</h2><p>second version</p></div>
        </body></html>"#
            .to_string(),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut storage = open_storage(&dir);
    let book_id = storage.insert_book("Test Book", None).unwrap();

    let mut fetcher = http_fetcher(Duration::from_secs(5));
    let stats = BookCrawler::new(&mut storage, &mut fetcher)
        .run(&target(book_id, &format!("{}/p1", base_url)))
        .await;

    assert!(stats.is_clean());
    assert_eq!(stats.pages_fetched, 2);
    assert_eq!(stats.records_upserted, 1);
    assert_eq!(stats.records_skipped, 1);
    assert_eq!(storage.count_inspirations(book_id).unwrap(), 1);

    let date = NaiveDate::from_ymd_opt(Local::now().year(), 5, 5).unwrap();
    let record = storage.get_inspiration(book_id, date).unwrap().unwrap();
    assert!(record.plain_text.contains("first version"));
}

#[tokio::test]
async fn test_fetch_timeout_is_fatal_but_book_is_marked_parsed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>late</body></html>")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut storage = open_storage(&dir);
    let book_id = storage.insert_book("Test Book", None).unwrap();

    let mut fetcher = http_fetcher(Duration::from_millis(300));
    let stats = BookCrawler::new(&mut storage, &mut fetcher)
        .run(&target(book_id, &format!("{}/slow", base_url)))
        .await;

    assert_eq!(stats.pages_fetched, 0);
    assert_eq!(stats.records_upserted, 0);
    assert_eq!(stats.errors.len(), 1);
    assert!(stats.errors[0].message.contains("fetch failed"));

    // A dead site must not leave the book eligible for endless re-crawls
    assert!(storage.get_book(book_id).unwrap().unwrap().is_parsed);
}

#[tokio::test]
async fn test_http_error_status_is_fatal() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut storage = open_storage(&dir);
    let book_id = storage.insert_book("Test Book", None).unwrap();

    let mut fetcher = http_fetcher(Duration::from_secs(5));
    let stats = BookCrawler::new(&mut storage, &mut fetcher)
        .run(&target(book_id, &format!("{}/gone", base_url)))
        .await;

    assert_eq!(stats.pages_fetched, 0);
    assert_eq!(stats.errors.len(), 1);
    assert!(stats.errors[0].message.contains("404"));
}

#[tokio::test]
async fn test_page_cap_stops_the_walk() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // A five-page chain with distinct dates; the cap must stop at three
    for day in 1..=5u32 {
        mount_page(
            &mock_server,
            &format!("/d{}", day),
            format!(
                r#"<html><body>
                <div class="content"><h2>{} березня</h2><p>reading {}</p></div>
                <a href="{}/d{}">Next</a>
                </body></html>"#,
                day,
                day,
                base_url,
                day + 1
            ),
        )
        .await;
    }

    let dir = TempDir::new().unwrap();
    let mut storage = open_storage(&dir);
    let book_id = storage.insert_book("Test Book", None).unwrap();

    let mut crawl_target = target(book_id, &format!("{}/d1", base_url));
    crawl_target.max_pages = 3;

    let mut fetcher = http_fetcher(Duration::from_secs(5));
    let stats = BookCrawler::new(&mut storage, &mut fetcher)
        .run(&crawl_target)
        .await;

    assert!(stats.is_clean());
    assert_eq!(stats.pages_fetched, 3);
    assert_eq!(stats.records_upserted, 3);
    assert_eq!(storage.count_inspirations(book_id).unwrap(), 3);
}

#[tokio::test]
async fn test_december_31_ends_the_book() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/last",
        format!(
            r#"<html><body>
            <div class="content"><h2>31 грудня</h2><p>final reading</p></div>
            <a href="{}/beyond">Next</a>
            </body></html>"#,
            base_url
        ),
    )
    .await;

    // The link past December 31 must never be followed
    Mock::given(method("GET"))
        .and(path("/beyond"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut storage = open_storage(&dir);
    let book_id = storage.insert_book("Test Book", None).unwrap();

    let mut fetcher = http_fetcher(Duration::from_secs(5));
    let stats = BookCrawler::new(&mut storage, &mut fetcher)
        .run(&target(book_id, &format!("{}/last", base_url)))
        .await;

    assert!(stats.is_clean());
    assert_eq!(stats.pages_fetched, 1);
    assert_eq!(stats.records_upserted, 1);
    assert!(storage.get_book(book_id).unwrap().unwrap().is_parsed);
}

#[tokio::test]
async fn test_rerun_refreshes_existing_records() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/only",
        r#"<html><body>
        <div class="content"><h2>9 липня</h2><p>corrected text</p></div>
        </body></html>"#
            .to_string(),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut storage = open_storage(&dir);
    let book_id = storage.insert_book("Test Book", None).unwrap();

    let date = NaiveDate::from_ymd_opt(Local::now().year(), 7, 9).unwrap();
    storage
        .upsert_inspiration(book_id, date, "<p>stale</p>", "stale", "https://old/only")
        .unwrap();

    let mut fetcher = http_fetcher(Duration::from_secs(5));
    let stats = BookCrawler::new(&mut storage, &mut fetcher)
        .run(&target(book_id, &format!("{}/only", base_url)))
        .await;

    assert!(stats.is_clean());
    assert_eq!(stats.records_upserted, 1);
    assert_eq!(storage.count_inspirations(book_id).unwrap(), 1);

    let record = storage.get_inspiration(book_id, date).unwrap().unwrap();
    assert!(record.plain_text.contains("corrected text"));
}
