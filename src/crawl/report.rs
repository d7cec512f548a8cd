// src/crawl/report.rs
// =============================================================================
// Run-level counters and the summary returned by Crawler::crawl.
// =============================================================================

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::events::CrawlEvent;

// Terminal-outcome counters, bumped by tasks as they finish
#[derive(Debug, Default)]
pub(crate) struct CrawlStats {
    fetched: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
    cancelled: AtomicUsize,
}

impl CrawlStats {
    pub(crate) fn record(&self, event: &CrawlEvent) {
        let counter = match event {
            CrawlEvent::Started { .. } => return,
            CrawlEvent::Fetched { .. } => &self.fetched,
            CrawlEvent::Skipped { .. } => &self.skipped,
            CrawlEvent::Errored { .. } => &self.failed,
            CrawlEvent::Cancelled { .. } => &self.cancelled,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn report(
        &self,
        locations_claimed: usize,
        cancelled: bool,
        elapsed: Duration,
    ) -> CrawlReport {
        CrawlReport {
            locations_claimed,
            pages_fetched: self.fetched.load(Ordering::Relaxed),
            pages_skipped: self.skipped.load(Ordering::Relaxed),
            pages_failed: self.failed.load(Ordering::Relaxed),
            pages_cancelled: self.cancelled.load(Ordering::Relaxed),
            cancelled,
            duration_ms: elapsed.as_millis() as u64,
        }
    }
}

/// Summary of one crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlReport {
    /// Distinct locations admitted by the visited set
    pub locations_claimed: usize,
    pub pages_fetched: usize,
    /// Non-success HTTP status
    pub pages_skipped: usize,
    /// Transport errors and failed tasks
    pub pages_failed: usize,
    pub pages_cancelled: usize,
    /// Whether cancellation fired before the crawl finished
    pub cancelled: bool,
    pub duration_ms: u64,
}

impl CrawlReport {
    /// Claimed locations that reached a terminal outcome
    pub fn pages_finished(&self) -> usize {
        self.pages_fetched + self.pages_skipped + self.pages_failed + self.pages_cancelled
    }
}
