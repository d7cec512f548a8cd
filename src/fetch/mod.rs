// src/fetch/mod.rs
// =============================================================================
// Everything that touches a single page: getting it, and reading its links.
//
// Submodules:
// - http: The Fetcher trait and its reqwest-backed implementation
// - links: Extracts absolute links from a fetched body
//
// Neither submodule knows about depth, deduplication or concurrency; that
// is the crawl module's job.
// =============================================================================

mod http;
mod links;

pub use http::{FetchOutcome, Fetcher, HttpFetcher};
pub use links::extract_links;
