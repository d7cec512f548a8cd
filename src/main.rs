// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging and the Ctrl+C -> cancellation wiring
// 3. Run the crawl
// 4. Print a summary and exit with a proper code
//    (0 = crawl completed, 1 = crawl was cancelled, 2 = error)
//
// All the interesting work lives in the library (src/lib.rs); this file is
// only glue.
// =============================================================================

mod cli;

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use depthcrawl::{CrawlReport, Crawler, EventSink, JsonLinesSink, TracingSink};

#[tokio::main]
async fn main() {
    init_logging();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so --json output on stdout stays machine-readable.
// RUST_LOG overrides the default "info" level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = cli.config();

    let sink: Arc<dyn EventSink> = if cli.json {
        Arc::new(JsonLinesSink::stdout())
    } else {
        Arc::new(TracingSink)
    };

    let cancel = CancellationToken::new();
    let crawler = Crawler::new(&config)?
        .event_sink(sink)
        .cancellation(cancel.clone());
    spawn_interrupt_handler(cancel);

    tracing::info!(
        "Starting crawl at {} to depth {} ({} concurrent request(s))...",
        cli.url,
        config.max_depth,
        config.max_concurrency
    );

    let report = crawler.crawl(&cli.url, i32::from(config.max_depth)).await?;

    if report.cancelled {
        tracing::warn!("Crawl cancelled.");
    } else {
        tracing::info!("Crawl complete.");
    }
    print_report(&report, cli.json)?;

    Ok(if report.cancelled { 1 } else { 0 })
}

// Translates every Ctrl+C into a cancel; the token ignores repeats
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if !cancel.is_cancelled() {
                tracing::warn!("Cancelling crawl...");
            }
            cancel.cancel();
        }
    });
}

fn print_report(report: &CrawlReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
        return Ok(());
    }

    println!();
    println!("📊 Summary:");
    println!("   ✅ Fetched: {}", report.pages_fetched);
    println!("   ⏭️  Skipped: {}", report.pages_skipped);
    println!("   ❌ Failed: {}", report.pages_failed);
    println!("   🛑 Cancelled: {}", report.pages_cancelled);
    println!("   📋 Unique URLs: {}", report.locations_claimed);
    println!("   ⏱️  Duration: {:.2}s", report.duration_ms as f64 / 1000.0);
    Ok(())
}
