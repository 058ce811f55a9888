//! # Food Safety Wire
//!
//! A multi-source aggregation pipeline for food-safety news, recalls, and
//! outbreak reports. Five adapters fetch from heterogeneous upstreams (RSS
//! feeds, the openFDA enforcement API, and scraped government listing pages),
//! normalize everything into one `MediaItem` schema, and a dedup engine
//! merges near-duplicate records describing the same real-world event.
//!
//! ## Usage
//!
//! ```sh
//! food_safety_wire --days 1            # full deduplicated digest
//! food_safety_wire fda --since 2026-08-01
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetch**: all enabled adapters run concurrently with per-source
//!    failure isolation
//! 2. **Normalize**: adapters extract pathogens, state codes, case counts,
//!    and severities through the shared normalizer
//! 3. **Dedup**: greedy clustering merges records that describe one event
//! 4. **Output**: the sorted `MediaItem[]` JSON goes to stdout, diagnostics
//!    to stderr
//!
//! Scoring, delivery, scheduling, and persistence belong to the downstream
//! agent that consumes the JSON.

use std::error::Error;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregator;
mod cli;
mod dedup;
mod http;
mod models;
mod normalize;
mod rss;
mod sources;

use cli::{Cli, SourceArg};
use models::FetchOptions;
use sources::{cdc, fda, fsis, fsm, fsn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init: diagnostics must never mix into the stdout JSON ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let opts = FetchOptions {
        days: args.days,
        since: args.since,
    };
    let client = http::client()?;

    let items = match args.source.and_then(SourceArg::source_id) {
        Some(models::SourceId::Fsn) => fsn::fetch(&client, &opts).await,
        Some(models::SourceId::Fsm) => {
            fsm::fetch_topics(&client, &opts, args.topics.as_deref()).await
        }
        Some(models::SourceId::Fda) => match args.limit {
            Some(limit) => fda::fetch_limit(&client, &opts, limit).await,
            None => fda::fetch(&client, &opts).await,
        },
        Some(models::SourceId::Fsis) => fsis::fetch(&client, &opts).await,
        Some(models::SourceId::Cdc) => cdc::fetch(&client, &opts).await,
        None => aggregator::fetch_all(&client, &opts, &args.enabled_sources()).await,
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&items)?
    } else {
        serde_json::to_string(&items)?
    };
    println!("{json}");

    let elapsed = start_time.elapsed();
    info!(
        count = items.len(),
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
