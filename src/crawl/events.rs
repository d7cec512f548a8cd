// src/crawl/events.rs
// =============================================================================
// Progress events emitted by the crawl engine, and the sinks that receive
// them.
//
// Every claimed location produces one Started event followed by its terminal
// event (Fetched, Skipped, Errored or Cancelled). The engine never
// prints anything itself; the host picks a sink:
//
// - TracingSink: one human-readable log line per event
// - JsonLinesSink: one JSON object per line, for piping into other tools
// - MemorySink: keeps events in memory (tests, embedding)
// =============================================================================

use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::sync::Mutex;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CrawlEvent {
    /// A task claimed its location and is about to wait for a slot
    Started { location: Url, depth: i32 },
    /// The fetch succeeded
    Fetched {
        location: Url,
        depth: i32,
        status: u16,
        bytes: usize,
    },
    /// The server answered with a non-success status
    Skipped { location: Url, depth: i32, status: u16 },
    /// Transport failure, or the task itself failed
    Errored {
        location: Url,
        depth: i32,
        cause: String,
    },
    /// Cancellation was observed while waiting for a slot or fetching
    Cancelled { location: Url, depth: i32 },
}

impl CrawlEvent {
    pub fn location(&self) -> &Url {
        match self {
            CrawlEvent::Started { location, .. }
            | CrawlEvent::Fetched { location, .. }
            | CrawlEvent::Skipped { location, .. }
            | CrawlEvent::Errored { location, .. }
            | CrawlEvent::Cancelled { location, .. } => location,
        }
    }

    pub fn depth(&self) -> i32 {
        match self {
            CrawlEvent::Started { depth, .. }
            | CrawlEvent::Fetched { depth, .. }
            | CrawlEvent::Skipped { depth, .. }
            | CrawlEvent::Errored { depth, .. }
            | CrawlEvent::Cancelled { depth, .. } => *depth,
        }
    }

    /// True for every event except Started
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CrawlEvent::Started { .. })
    }

    /// True for Skipped and Errored
    pub fn is_failure(&self) -> bool {
        matches!(self, CrawlEvent::Skipped { .. } | CrawlEvent::Errored { .. })
    }
}

impl fmt::Display for CrawlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrawlEvent::Started { location, depth } => {
                write!(f, "[Depth {}] Fetching {}", depth, location)
            }
            CrawlEvent::Fetched {
                location,
                depth,
                bytes,
                ..
            } => write!(f, "[Depth {}] Fetched {} ({} bytes)", depth, location, bytes),
            CrawlEvent::Skipped {
                location,
                depth,
                status,
            } => write!(f, "[Depth {}] Skipped {}: HTTP {}", depth, location, status),
            CrawlEvent::Errored {
                location,
                depth,
                cause,
            } => write!(f, "[Depth {}] Error {}: {}", depth, location, cause),
            CrawlEvent::Cancelled { location, depth } => {
                write!(f, "[Depth {}] Cancelled {}", depth, location)
            }
        }
    }
}

/// Receives crawl events. Called concurrently from many tasks.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &CrawlEvent);
}

// Logs each event through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &CrawlEvent) {
        match event {
            CrawlEvent::Started { .. } | CrawlEvent::Fetched { .. } => {
                tracing::info!("{}", event)
            }
            CrawlEvent::Skipped { .. } | CrawlEvent::Cancelled { .. } => {
                tracing::warn!("{}", event)
            }
            CrawlEvent::Errored { .. } => tracing::error!("{}", event),
        }
    }
}

// Writes each event as a single JSON line
pub struct JsonLinesSink<W> {
    out: Mutex<W>,
}

impl JsonLinesSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> EventSink for JsonLinesSink<W> {
    fn emit(&self, event: &CrawlEvent) {
        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Failed to serialize crawl event: {}", e);
                return;
            }
        };

        // A poisoned lock only means another emitter panicked mid-write
        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            tracing::warn!("Failed to write crawl event: {}", e);
        }
    }
}

// Collects events in memory, in emission order
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<CrawlEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CrawlEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &CrawlEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_display_lines() {
        let fetched = CrawlEvent::Fetched {
            location: url("https://example.com/"),
            depth: 2,
            status: 200,
            bytes: 1256,
        };
        assert_eq!(
            fetched.to_string(),
            "[Depth 2] Fetched https://example.com/ (1256 bytes)"
        );

        let skipped = CrawlEvent::Skipped {
            location: url("https://example.com/gone"),
            depth: 1,
            status: 404,
        };
        assert_eq!(
            skipped.to_string(),
            "[Depth 1] Skipped https://example.com/gone: HTTP 404"
        );
    }

    #[test]
    fn test_failure_classification() {
        let location = url("https://example.com/");
        assert!(CrawlEvent::Skipped {
            location: location.clone(),
            depth: 0,
            status: 500
        }
        .is_failure());
        assert!(CrawlEvent::Errored {
            location: location.clone(),
            depth: 0,
            cause: "boom".into()
        }
        .is_failure());
        let cancelled = CrawlEvent::Cancelled { location: location.clone(), depth: 0 };
        assert!(!cancelled.is_failure());
        assert!(cancelled.is_terminal());
        assert!(!CrawlEvent::Started { location, depth: 0 }.is_terminal());
    }

    #[test]
    fn test_json_lines_sink_writes_tagged_objects() {
        let sink = JsonLinesSink::new(Vec::new());
        sink.emit(&CrawlEvent::Started {
            location: url("https://example.com/"),
            depth: 1,
        });
        sink.emit(&CrawlEvent::Cancelled {
            location: url("https://example.com/x"),
            depth: 0,
        });

        let written = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = written
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "started");
        assert_eq!(lines[0]["location"], "https://example.com/");
        assert_eq!(lines[0]["depth"], 1);
        assert_eq!(lines[1]["event"], "cancelled");
    }

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new();
        let a = CrawlEvent::Started {
            location: url("https://example.com/a"),
            depth: 1,
        };
        let b = CrawlEvent::Cancelled {
            location: url("https://example.com/a"),
            depth: 1,
        };
        sink.emit(&a);
        sink.emit(&b);
        assert_eq!(sink.events(), vec![a, b]);
    }
}
