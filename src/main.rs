//! Lectio command-line interface
//!
//! Registers books and crawls them into the local database. Intended to be
//! run ad hoc or from a scheduler; a book already marked parsed is skipped
//! unless `--force` is given.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use url::Url;

use lectio::config::{load_config, Config};
use lectio::crawler::{build_fetcher, BookCrawler, CrawlTarget, DEFAULT_MAX_PAGES};
use lectio::storage::{SqliteStorage, Storage};
use lectio::LectioError;

#[derive(Parser, Debug)]
#[command(
    name = "lectio",
    version,
    about = "Crawl daily-reading book sites into a local database"
)]
struct Cli {
    /// Id of the book to crawl
    #[arg(required_unless_present = "register")]
    book_id: Option<i64>,

    /// Start URL, overriding the book's stored source URL
    #[arg(long)]
    start_url: Option<Url>,

    /// Delay between page fetches, in seconds
    #[arg(long, default_value_t = 1.0)]
    delay: f64,

    /// Upper bound on pages fetched in one run
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    max_pages: u32,

    /// Crawl even when the book is already marked parsed
    #[arg(long)]
    force: bool,

    /// Fetch pages through a headless browser over WebDriver
    #[arg(long)]
    browser: bool,

    /// Path to the TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Register a new book with this title instead of crawling
    #[arg(long, value_name = "TITLE")]
    register: Option<String>,

    /// Increase logging verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log errors only
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    quiet: bool,
}

fn setup_logging(verbose: u8, quiet: bool) {
    let directive = if quiet {
        "lectio=error"
    } else {
        match verbose {
            0 => "lectio=info",
            1 => "lectio=debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };

    let mut storage = SqliteStorage::new(&config.output.database_path)
        .with_context(|| format!("opening database at {}", config.output.database_path))?;

    if let Some(title) = &cli.register {
        let source_url = cli.start_url.as_ref().map(Url::as_str);
        let id = storage.insert_book(title, source_url)?;
        println!("Registered \"{}\" with id {}", title, id);
        return Ok(());
    }

    let Some(book_id) = cli.book_id else {
        anyhow::bail!("a book id is required unless --register is given");
    };

    let book = storage
        .get_book(book_id)?
        .ok_or(LectioError::BookNotFound(book_id))?;

    if book.is_parsed && !cli.force {
        println!(
            "Book {} (\"{}\") is already parsed; use --force to re-crawl",
            book.id, book.title
        );
        return Ok(());
    }

    let start_url = match cli.start_url {
        Some(url) => url,
        None => book
            .source_url
            .as_deref()
            .ok_or(LectioError::MissingStartUrl(book_id))?
            .parse::<Url>()
            .context("book's stored source URL is invalid")?,
    };

    let mut target = CrawlTarget::new(book_id, start_url);
    target.delay = Duration::from_secs_f64(cli.delay.max(0.0));
    target.max_pages = cli.max_pages;

    let mut fetcher = build_fetcher(cli.browser, &config).await?;
    let stats = BookCrawler::new(&mut storage, &mut fetcher)
        .run(&target)
        .await;
    fetcher.close().await;

    println!(
        "Crawl of book {} (\"{}\"): {}",
        book.id,
        book.title,
        stats.summary()
    );
    if !stats.is_clean() {
        for (index, failure) in stats.errors.iter().enumerate() {
            println!("  {}. {}: {}", index + 1, failure.url, failure.message);
        }
        std::process::exit(1);
    }

    Ok(())
}
