//! Bounded-concurrency, depth-limited web crawler.
//!
//! Starting from a seed URL, [`Crawler`] fetches a page, extracts the links
//! from its anchor tags and crawls those links in turn until the depth
//! budget runs out. No URL is fetched twice in one run, and no more than
//! the configured number of requests are ever in flight.
//!
//! # Usage
//!
//! ```rust,no_run
//! use depthcrawl::{CrawlConfig, Crawler};
//!
//! # async fn run() -> Result<(), depthcrawl::CrawlError> {
//! let config = CrawlConfig::default();
//! let crawler = Crawler::new(&config)?;
//!
//! // Fire this from a signal handler to stop the crawl
//! let _cancel = crawler.cancellation_token();
//!
//! let report = crawler.crawl("https://www.example.com", 2).await?;
//! println!("fetched {} page(s)", report.pages_fetched);
//! # Ok(())
//! # }
//! ```
//!
//! Per-page outcomes are delivered to an [`EventSink`]; the default
//! [`TracingSink`] logs them through `tracing`.

pub mod config;
pub mod crawl;
pub mod error;
pub mod fetch;

pub use config::CrawlConfig;
pub use crawl::{CrawlEvent, CrawlReport, Crawler, EventSink, JsonLinesSink, MemorySink, TracingSink};
pub use error::{ConfigError, CrawlError};
pub use fetch::{extract_links, FetchOutcome, Fetcher, HttpFetcher};
