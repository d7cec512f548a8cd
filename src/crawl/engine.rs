// src/crawl/engine.rs
// =============================================================================
// The crawl engine: depth-limited traversal with bounded concurrency.
//
// How it works, for one task (location, depth):
// 1. Bail out if depth < 0 or the crawl has been cancelled
// 2. Claim the location in the visited set (lose the race = bail out)
// 3. Wait for a concurrency slot (abortable by cancellation)
// 4. Fetch; on anything but success, report it and stop this branch
// 5. Give the slot back, then if depth > 0 extract links from the body and
//    spawn one child task per link at depth - 1
// 6. Wait for every child to finish
//
// Children are spawned onto the runtime through a JoinSet instead of being
// awaited recursively on the stack, so fan-out runs in parallel and deep
// crawls cannot overflow the stack. Dropping a JoinSet aborts what it holds,
// so dropping the crawl future tears down the whole task tree.
//
// The visited set, limiter and counters are created fresh for every crawl()
// call. Two crawls on the same Crawler never see each other's state.
//
// A claimed location gets exactly one terminal event. If a task panics after
// its fetch was already reported, the panic is logged but not counted again.
// =============================================================================

use dashmap::DashSet;
use futures::future::{BoxFuture, FutureExt};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::events::{CrawlEvent, EventSink, TracingSink};
use super::limiter::ConcurrencyLimiter;
use super::report::{CrawlReport, CrawlStats};
use super::visited::VisitedSet;
use crate::config::CrawlConfig;
use crate::error::{ConfigError, CrawlError};
use crate::fetch::{extract_links, FetchOutcome, Fetcher, HttpFetcher};

pub struct Crawler {
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<dyn EventSink>,
    cancel: CancellationToken,
    max_concurrency: usize,
}

// Everything a task needs, shared by the whole task tree of one crawl
struct CrawlContext {
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<dyn EventSink>,
    cancel: CancellationToken,
    visited: VisitedSet,
    limiter: ConcurrencyLimiter,
    stats: CrawlStats,
    // Locations that already have their terminal event
    finished: DashSet<Url>,
}

impl CrawlContext {
    fn emit(&self, event: CrawlEvent) {
        self.stats.record(&event);
        if event.is_terminal() {
            self.finished.insert(event.location().clone());
        }
        self.sink.emit(&event);
    }
}

impl Crawler {
    /// Builds a crawler that fetches over HTTP with the given configuration.
    pub fn new(config: &CrawlConfig) -> Result<Self, CrawlError> {
        config.validate()?;
        let fetcher = HttpFetcher::new(config)?;
        Self::with_fetcher(Arc::new(fetcher), config.max_concurrency)
    }

    /// Builds a crawler around any [`Fetcher`].
    pub fn with_fetcher(
        fetcher: Arc<dyn Fetcher>,
        max_concurrency: usize,
    ) -> Result<Self, CrawlError> {
        if max_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency.into());
        }
        Ok(Self {
            fetcher,
            sink: Arc::new(TracingSink),
            cancel: CancellationToken::new(),
            max_concurrency,
        })
    }

    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replaces the cancellation token. Once it fires, this crawler (and
    /// any later crawl on it) stops issuing fetches.
    pub fn cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Handle for the host to fire cancellation from elsewhere
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Crawls from `seed` down to `max_depth` hops.
    ///
    /// Only an unparseable seed fails the call. Everything that goes wrong
    /// for individual pages is reported through the event sink and counted
    /// in the returned report.
    pub async fn crawl(&self, seed: &str, max_depth: i32) -> Result<CrawlReport, CrawlError> {
        let seed = Url::parse(seed).map_err(|source| CrawlError::InvalidSeed {
            seed: seed.to_string(),
            source,
        })?;
        Ok(self.crawl_url(seed, max_depth).await)
    }

    pub async fn crawl_url(&self, seed: Url, max_depth: i32) -> CrawlReport {
        let started = Instant::now();
        let ctx = Arc::new(CrawlContext {
            fetcher: self.fetcher.clone(),
            sink: self.sink.clone(),
            cancel: self.cancel.clone(),
            visited: VisitedSet::new(),
            limiter: ConcurrencyLimiter::new(self.max_concurrency),
            stats: CrawlStats::default(),
            finished: DashSet::new(),
        });

        // The root runs as a spawned task too, so a panic in it is contained
        // exactly like one in any other branch
        join_children(&ctx, vec![seed], max_depth).await;

        ctx.stats.report(
            ctx.visited.len(),
            ctx.cancel.is_cancelled(),
            started.elapsed(),
        )
    }
}

// One unit of crawl work. Returns a boxed future because it spawns copies
// of itself.
fn crawl_task(ctx: Arc<CrawlContext>, location: Url, depth: i32) -> BoxFuture<'static, ()> {
    async move {
        if depth < 0 || ctx.cancel.is_cancelled() {
            return;
        }

        if !ctx.visited.try_claim(&location) {
            tracing::debug!("Already claimed: {}", location);
            return;
        }

        ctx.emit(CrawlEvent::Started {
            location: location.clone(),
            depth,
        });

        let Some(body) = fetch_with_slot(&ctx, &location, depth).await else {
            return;
        };

        if depth == 0 {
            return;
        }

        let links = extract_links(&body, &location);
        drop(body);
        tracing::debug!("Found {} link(s) on {}", links.len(), location);

        join_children(&ctx, links, depth - 1).await;
    }
    .boxed()
}

// Steps 3 and 4: holds a slot for exactly the duration of the fetch
//
// Returns the body on success. Every other outcome is reported here and
// ends the branch.
async fn fetch_with_slot(ctx: &CrawlContext, location: &Url, depth: i32) -> Option<String> {
    let _slot = match ctx.limiter.acquire(&ctx.cancel).await {
        Ok(slot) => slot,
        Err(_) => {
            ctx.emit(CrawlEvent::Cancelled {
                location: location.clone(),
                depth,
            });
            return None;
        }
    };

    match ctx.fetcher.fetch(location, &ctx.cancel).await {
        FetchOutcome::Success { body, status } => {
            ctx.emit(CrawlEvent::Fetched {
                location: location.clone(),
                depth,
                status,
                bytes: body.len(),
            });
            Some(body)
        }
        FetchOutcome::HttpFailure { status } => {
            ctx.emit(CrawlEvent::Skipped {
                location: location.clone(),
                depth,
                status,
            });
            None
        }
        FetchOutcome::TransportError { cause } => {
            ctx.emit(CrawlEvent::Errored {
                location: location.clone(),
                depth,
                cause,
            });
            None
        }
        FetchOutcome::Cancelled => {
            ctx.emit(CrawlEvent::Cancelled {
                location: location.clone(),
                depth,
            });
            None
        }
    }
}

// Steps 5 and 6: spawn a task per link and wait for all of them
async fn join_children(ctx: &Arc<CrawlContext>, links: Vec<Url>, depth: i32) {
    let mut children = JoinSet::new();
    let mut locations = HashMap::with_capacity(links.len());

    for link in links {
        if ctx.cancel.is_cancelled() {
            break;
        }
        let handle = children.spawn(crawl_task(ctx.clone(), link.clone(), depth));
        locations.insert(handle.id(), link);
    }

    while let Some(joined) = children.join_next_with_id().await {
        match joined {
            Ok((id, ())) => {
                locations.remove(&id);
            }
            Err(e) => {
                let location = locations.remove(&e.id());
                if !e.is_panic() {
                    continue;
                }
                let cause = format!("task panicked: {}", panic_message(e.into_panic()));
                match location {
                    Some(location) if ctx.finished.contains(&location) => {
                        tracing::error!(
                            "Crawl task for {} failed after finishing: {}",
                            location,
                            cause
                        )
                    }
                    Some(location) => ctx.emit(CrawlEvent::Errored {
                        location,
                        depth,
                        cause,
                    }),
                    None => tracing::error!("Crawl task failed: {}", cause),
                }
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why does crawl_task return BoxFuture instead of being an async fn?
//    - An async fn that (indirectly) spawns itself would have a future type
//      that mentions itself, and the compiler cannot size that
//    - Boxing gives every task the same concrete type: Pin<Box<dyn Future>>
//
// 2. What is a JoinSet?
//    - A collection of spawned tasks you can await one by one
//    - join_next_with_id() yields each task as it finishes, in any order
//    - If the JoinSet is dropped, every task still in it is aborted
//
// 3. Why Arc<CrawlContext>?
//    - Spawned tasks must own what they use ('static)
//    - Arc lets thousands of tasks share one visited set and one limiter
//    - Cloning an Arc only bumps a reference count
//
// 4. Where does the slot get released?
//    - fetch_with_slot() keeps the Slot in a local variable (_slot)
//    - When the function returns, _slot is dropped and the permit goes back
//    - So children never wait on a slot their parent is still holding
// -----------------------------------------------------------------------------
