// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things). Every tuning flag can
// also come from an environment variable, which is handy in containers.
// =============================================================================

use clap::Parser;
use std::time::Duration;

use depthcrawl::config::{
    default_user_agent, CrawlConfig, DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_DEPTH,
    DEFAULT_TIMEOUT_SECS,
};

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "depthcrawl",
    version,
    about = "Crawl a website to a fixed depth with a bounded number of concurrent requests",
    long_about = "depthcrawl fetches a starting page, follows the links in its anchor tags, \
                  and keeps going until the depth limit is reached. Each URL is fetched at \
                  most once. Press Ctrl+C to stop early."
)]
pub struct Cli {
    /// URL to start crawling from (e.g., https://www.example.com)
    pub url: String,

    /// Maximum crawl depth
    ///
    /// Depth 0 = just the starting page
    /// Depth 1 = starting page + all pages it links to
    /// etc.
    #[arg(long, env = "DEPTHCRAWL_MAX_DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: u16,

    /// Maximum number of requests in flight at once
    #[arg(
        long,
        env = "DEPTHCRAWL_MAX_CONCURRENCY",
        default_value_t = DEFAULT_MAX_CONCURRENCY,
        value_parser = parse_positive
    )]
    pub max_concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(
        long,
        env = "DEPTHCRAWL_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[arg(long, env = "DEPTHCRAWL_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Emit progress events and the final report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    // Turns parsed flags into the library's configuration
    pub fn config(&self) -> CrawlConfig {
        CrawlConfig {
            max_depth: self.max_depth,
            max_concurrency: self.max_concurrency,
            request_timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone().unwrap_or_else(default_user_agent),
        }
    }
}

fn parse_positive(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does `env = "..."` on an argument do?
//    - If the flag is missing, clap reads the named environment variable
//    - Precedence is: flag, then environment, then default_value_t
//
// 2. Why a custom value_parser for --max-concurrency?
//    - usize already rejects negative numbers
//    - 0 parses fine as a usize but would mean "never fetch anything", so
//      parse_positive turns it into a normal clap error
// -----------------------------------------------------------------------------
