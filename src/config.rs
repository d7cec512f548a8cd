// src/config.rs
// =============================================================================
// Library-side crawl configuration.
//
// The CLI (src/cli.rs) turns flags and environment variables into a
// CrawlConfig; anyone embedding the crawler builds one directly.
// =============================================================================

use std::time::Duration;

use crate::error::ConfigError;

/// Default maximum crawl depth (seed page plus two hops)
pub const DEFAULT_MAX_DEPTH: u16 = 2;
/// Default number of simultaneous in-flight fetches
pub const DEFAULT_MAX_CONCURRENCY: usize = 5;
/// Default per-request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    /// How many hops to follow from the seed; 0 fetches only the seed
    pub max_depth: u16,
    /// Upper bound on concurrently outstanding fetches
    pub max_concurrency: usize,
    /// Timeout applied to each request, including reading the body
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: default_user_agent(),
        }
    }
}

impl CrawlConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

pub fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
