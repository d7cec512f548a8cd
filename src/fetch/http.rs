// src/fetch/http.rs
// =============================================================================
// This module fetches pages over HTTP.
//
// Key functionality:
// - Issues exactly one GET per call (no retries, ever)
// - Classifies the result into a tagged FetchOutcome
// - Abandons the request as soon as the crawl is cancelled
//
// The crawl engine only talks to the Fetcher trait, so tests can swap in
// an instrumented double without a network.
//
// Rust concepts:
// - async-trait: async methods usable through Arc<dyn Fetcher>
// - tokio::select!: race the request against the cancellation token
// - Enums: To represent the different outcomes of a fetch
// =============================================================================

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::CrawlConfig;

// The result of fetching one location
//
// Every variant is terminal for the task that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// 2xx response, body read to completion
    Success { body: String, status: u16 },
    /// Non-2xx response
    HttpFailure { status: u16 },
    /// DNS, connect, timeout or body read failure
    TransportError { cause: String },
    /// The crawl was cancelled before or during the request
    Cancelled,
}

/// Something that can retrieve the body behind a location.
///
/// Implementations must perform at most one round trip per call and must
/// return [`FetchOutcome::Cancelled`] promptly once `cancel` fires.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, location: &Url, cancel: &CancellationToken) -> FetchOutcome;
}

// Fetcher backed by a shared reqwest client
//
// reqwest::Client is an Arc internally, so cloning an HttpFetcher is cheap
// and every task shares one connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    // Builds the underlying client from crawl configuration
    pub fn new(config: &CrawlConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.request_timeout.min(Duration::from_secs(10)))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }

    async fn get(&self, location: &Url) -> FetchOutcome {
        let response = match self.client.get(location.clone()).send().await {
            Ok(response) => response,
            Err(e) => return transport_error(e),
        };

        let status = response.status();
        if !status.is_success() {
            return http_failure(status);
        }

        match response.text().await {
            Ok(body) => FetchOutcome::Success {
                body,
                status: status.as_u16(),
            },
            Err(e) => transport_error(e),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, location: &Url, cancel: &CancellationToken) -> FetchOutcome {
        if cancel.is_cancelled() {
            return FetchOutcome::Cancelled;
        }

        // Dropping the losing branch drops the reqwest future, which closes
        // the connection instead of waiting for the response
        tokio::select! {
            biased;
            _ = cancel.cancelled() => FetchOutcome::Cancelled,
            outcome = self.get(location) => outcome,
        }
    }
}

fn http_failure(status: StatusCode) -> FetchOutcome {
    FetchOutcome::HttpFailure {
        status: status.as_u16(),
    }
}

// Categorizes reqwest errors into a readable cause
fn transport_error(error: reqwest::Error) -> FetchOutcome {
    let cause = if error.is_timeout() {
        format!("request timed out: {}", error)
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else if error.is_builder() {
        format!("invalid request: {}", error)
    } else if error.is_body() || error.is_decode() {
        format!("failed to read body: {}", error)
    } else {
        error.to_string()
    };

    FetchOutcome::TransportError { cause }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. How does select! cancel an in-flight request?
//    - Futures in Rust only make progress when polled
//    - When the cancellation branch wins, select! drops the get() future
//    - Dropping a reqwest future drops its connection, so nothing keeps
//      running in the background
//
// 2. Why check is_cancelled() before select! as well?
//    - With `biased;` an already-cancelled token would win anyway, but the
//      early return makes it obvious that no request is ever sent
//
// 3. Why return FetchOutcome instead of Result?
//    - A 404 or a refused connection is a normal crawl result, not an error
//      the caller should propagate with `?`
// -----------------------------------------------------------------------------
