//! Owner contact enrichment CLI
//!
//! Reads property records from CSV, searches the web for each individual
//! owner and writes the discovered emails to CSV as they are found.
//! Progress is checkpointed after every record, so an interrupted run picks
//! up where it stopped and appends to the same output.

mod args;
mod csv_io;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use owner_enrichment::{
    BraveWebSearcher, Enricher, HttpPageFetcher, JsonFileCheckpoint, SearcherExt, WebSearcher,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::args::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,owner_enrichment=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let args = Args::parse();
    let config = args.enrichment_config();
    config.validate().context("Invalid run configuration")?;

    let records = csv_io::read_records_from_path(&args.input)?;
    tracing::info!(input = %args.input.display(), records = records.len(), "Loaded input records");

    let brave = BraveWebSearcher::from_env();
    if !brave.has_credentials() {
        tracing::warn!("BRAVE_API_KEY not set, every search will come back empty");
    }
    let searcher: Arc<dyn WebSearcher> = match args.search_rps {
        Some(rps) => Arc::new(brave.rate_limited(rps)?),
        None => Arc::new(brave),
    };

    let fetcher = HttpPageFetcher::new().with_delay(args.fetch_delay());
    let rows = csv_io::CsvRowSink::open(&args.output, !args.no_checkpoint)?;
    let mut enricher =
        Enricher::new(searcher, Arc::new(fetcher), config).with_sink(Arc::new(rows));
    if args.no_checkpoint {
        tracing::info!("Checkpointing disabled");
    } else {
        tracing::info!(checkpoint = %args.checkpoint.display(), "Using checkpoint");
        enricher = enricher.with_checkpoint(Arc::new(JsonFileCheckpoint::new(&args.checkpoint)));
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current record");
            on_interrupt.cancel();
        }
    });

    let summary = enricher.run_until_cancelled(records, &cancel).await?;
    tracing::info!(output = %args.output.display(), rows = summary.rows.len(), "Wrote results");

    println!(
        "Processed {} records, found {} emails in total ({} distinct).",
        summary.total_records,
        summary.total_emails_found,
        summary.distinct_emails()
    );
    if summary.cancelled {
        println!("Run was interrupted; rerun with the same checkpoint to resume.");
    }

    Ok(())
}
