//! Page fetching strategies
//!
//! This module retrieves raw HTML for a URL through one of two strategies:
//! - Plain HTTP via reqwest (the default)
//! - A headless browser driven over WebDriver, for sites that render
//!   their reading content with JavaScript
//!
//! The strategy is chosen once per crawl. There is no retry logic at this
//! layer; a failed fetch is reported to the caller as a typed failure.

use crate::config::Config;
use fantoccini::{ClientBuilder, Locator};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// How long the browser strategy waits for page readiness
const BROWSER_READY_TIMEOUT: Duration = Duration::from_secs(10);

/// Fixed settle delay after readiness, before reading the rendered HTML
const BROWSER_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// A failed fetch, classified by cause
///
/// Any of these is fatal to the crawl run that hit it.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("page did not become ready within {0:?}")]
    RenderTimeout(Duration),

    #[error("webdriver error: {0}")]
    Driver(String),
}

/// A page fetcher with one of the two interchangeable strategies selected
pub enum PageFetcher {
    Http(HttpFetcher),
    Browser(BrowserFetcher),
}

impl PageFetcher {
    /// Fetches raw HTML for a URL using the selected strategy
    pub async fn fetch(&mut self, url: &str) -> Result<String, FetchError> {
        match self {
            PageFetcher::Http(fetcher) => fetcher.fetch(url).await,
            PageFetcher::Browser(fetcher) => fetcher.fetch(url).await,
        }
    }

    /// Releases fetcher resources
    ///
    /// Closing the browser session is best-effort; a failure here is logged
    /// and swallowed.
    pub async fn close(self) {
        if let PageFetcher::Browser(fetcher) = self {
            fetcher.close().await;
        }
    }
}

/// Builds a fetcher for a crawl run
///
/// When `use_browser` is set, this tries to open a WebDriver session at the
/// configured endpoint. If the session cannot be established the crawl falls
/// back to plain HTTP instead of failing: the browser strategy is an optional
/// capability, not a requirement.
///
/// # Arguments
///
/// * `use_browser` - Whether the headless browser strategy was requested
/// * `config` - Fetcher and browser configuration
pub async fn build_fetcher(use_browser: bool, config: &Config) -> Result<PageFetcher, FetchError> {
    if use_browser {
        match BrowserFetcher::connect(&config.browser.webdriver_url).await {
            Ok(fetcher) => {
                tracing::info!(
                    "Using headless browser via WebDriver at {}",
                    config.browser.webdriver_url
                );
                return Ok(PageFetcher::Browser(fetcher));
            }
            Err(e) => {
                tracing::warn!(
                    "WebDriver unavailable at {}, falling back to plain HTTP: {}",
                    config.browser.webdriver_url,
                    e
                );
            }
        }
    }

    let timeout = Duration::from_secs(config.fetcher.request_timeout_secs);
    Ok(PageFetcher::Http(HttpFetcher::new(
        &config.fetcher.user_agent,
        timeout,
    )?))
}

/// Plain HTTP fetch strategy
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Creates an HTTP fetcher with a fixed user agent and request timeout
    ///
    /// Standard redirects are followed by the client.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    /// Issues a GET request and returns the response body
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The raw HTML body
    /// * `Err(FetchError)` - `Timeout`, `HttpStatus`, or `Network`
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        response.text().await.map_err(|e| self.classify(e))
    }

    fn classify(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Network(error.to_string())
        }
    }
}

/// Headless browser fetch strategy over WebDriver
pub struct BrowserFetcher {
    client: fantoccini::Client,
}

impl BrowserFetcher {
    /// Opens a WebDriver session at the given endpoint
    pub async fn connect(webdriver_url: &str) -> Result<Self, FetchError> {
        let client = ClientBuilder::native()
            .connect(webdriver_url)
            .await
            .map_err(|e| FetchError::Driver(e.to_string()))?;

        Ok(Self { client })
    }

    /// Navigates to a URL, waits for readiness, and reads the rendered HTML
    ///
    /// Readiness means a `<body>` element is present; after that a short
    /// fixed settle delay gives late scripts a chance to run.
    pub async fn fetch(&mut self, url: &str) -> Result<String, FetchError> {
        self.client
            .goto(url)
            .await
            .map_err(|e| FetchError::Driver(e.to_string()))?;

        let ready = self.client.wait().for_element(Locator::Css("body"));
        match tokio::time::timeout(BROWSER_READY_TIMEOUT, ready).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(FetchError::Driver(e.to_string())),
            Err(_) => return Err(FetchError::RenderTimeout(BROWSER_READY_TIMEOUT)),
        }

        tokio::time::sleep(BROWSER_SETTLE_DELAY).await;

        self.client
            .source()
            .await
            .map_err(|e| FetchError::Driver(e.to_string()))
    }

    /// Closes the browser session, logging but not propagating failures
    pub async fn close(self) {
        if let Err(e) = self.client.close().await {
            tracing::warn!("Failed to close browser session: {}", e);
        }
    }
}
