// src/error.rs
// =============================================================================
// Errors that fail a whole crawl run.
//
// Per-page problems (bad status, network errors, unparseable links) never
// show up here: they are reported as crawl events and the crawl carries on.
// Only conditions that make the run impossible to start are errors.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid seed location '{seed}': {source}")]
    InvalidSeed {
        seed: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("max concurrency must be greater than 0")]
    ZeroConcurrency,

    #[error("request timeout must be greater than 0")]
    ZeroTimeout,
}
