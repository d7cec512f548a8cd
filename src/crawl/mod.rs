// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Depth-limited traversal from a seed URL
// - Fixed cap on simultaneous fetches, however wide the fan-out
// - Each URL fetched at most once per crawl
// - Cooperative cancellation that stops new work promptly
//
// Submodules:
// - engine: the traversal itself (Crawler)
// - visited: exactly-once claim registry
// - limiter: counting admission gate for fetches
// - events: progress events and the sinks that consume them
// - report: end-of-run summary
// =============================================================================

mod engine;
mod events;
mod limiter;
mod report;
mod visited;

pub use engine::Crawler;
pub use events::{CrawlEvent, EventSink, JsonLinesSink, MemorySink, TracingSink};
pub use limiter::{Cancelled, ConcurrencyLimiter, Slot};
pub use report::CrawlReport;
pub use visited::VisitedSet;
