//! Enrichment orchestrator - drive discovery over all input records.
//!
//! Records are visited in input order. A record ID becomes processed (and
//! is checkpointed) as soon as its owner set has been attempted, whether or
//! not any email was found. Cancellation is honoured only between records.

use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::pipeline::{
    discovery::{DiscoveryLoop, DiscoveryParams},
    owners::{resolve_owners, OwnerResolution},
};
use crate::sinks::TracingSink;
use crate::traits::{
    checkpoint::CheckpointStore, fetcher::PageFetcher, searcher::WebSearcher, sink::ProgressSink,
};
use crate::types::{
    config::EnrichmentConfig,
    events::{ProgressEvent, SkipReason},
    record::InputRecord,
    result::RunSummary,
};

/// Runs the enrichment pipeline with injected capabilities.
///
/// Each `Enricher::run` call owns its processed set, seen-URL sets and
/// result accumulator, so independent runs can execute concurrently.
///
/// # Example
///
/// ```rust,ignore
/// let enricher = Enricher::new(searcher, fetcher, EnrichmentConfig::default())
///     .with_checkpoint(Arc::new(JsonFileCheckpoint::new("data/checkpoints/processed.json")));
/// let summary = enricher.run(records).await?;
/// ```
#[derive(Clone)]
pub struct Enricher {
    searcher: Arc<dyn WebSearcher>,
    fetcher: Arc<dyn PageFetcher>,
    checkpoint: Option<Arc<dyn CheckpointStore>>,
    sink: Arc<dyn ProgressSink>,
    config: EnrichmentConfig,
}

impl Enricher {
    /// Create an enricher without checkpointing that logs progress via `tracing`.
    pub fn new(
        searcher: Arc<dyn WebSearcher>,
        fetcher: Arc<dyn PageFetcher>,
        config: EnrichmentConfig,
    ) -> Self {
        Self {
            searcher,
            fetcher,
            checkpoint: None,
            sink: Arc::new(TracingSink),
            config,
        }
    }

    /// Persist the processed set through `store` after every record.
    pub fn with_checkpoint(mut self, store: Arc<dyn CheckpointStore>) -> Self {
        self.checkpoint = Some(store);
        self
    }

    /// Deliver progress events and rows to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &EnrichmentConfig {
        &self.config
    }

    /// Run over all records to completion.
    pub async fn run<I>(&self, records: I) -> Result<RunSummary>
    where
        I: IntoIterator<Item = InputRecord>,
    {
        self.run_until_cancelled(records, &CancellationToken::new())
            .await
    }

    /// Run until the records are exhausted or `cancel` fires.
    ///
    /// Invalid configuration is rejected before any record is touched.
    /// A cancelled run returns the rows gathered so far with
    /// `cancelled = true`.
    pub async fn run_until_cancelled<I>(
        &self,
        records: I,
        cancel: &CancellationToken,
    ) -> Result<RunSummary>
    where
        I: IntoIterator<Item = InputRecord>,
    {
        self.config.validate()?;

        let fields = &self.config.fields;
        let discovery = DiscoveryLoop::new(
            self.searcher.as_ref(),
            self.fetcher.as_ref(),
            self.sink.as_ref(),
            DiscoveryParams::from(&self.config),
        );

        let mut processed = self.load_checkpoint().await;
        let mut seen_this_run: HashSet<String> = HashSet::new();
        let mut summary = RunSummary::default();

        info!(
            already_processed = processed.len(),
            scrape_pages = self.config.scrape_pages,
            max_queries = self.config.max_queries,
            max_emails_per_name = self.config.max_emails_per_name,
            "Enrichment run starting"
        );

        for record in records {
            if cancel.is_cancelled() {
                info!("Run cancelled, stopping at record boundary");
                summary.cancelled = true;
                break;
            }

            let record = record.normalize();
            let record_id = record.record_id(&fields.id_field);

            if !seen_this_run.insert(record_id.clone()) {
                debug!(record_id = %record_id, "Duplicate record ID in input, skipping");
                continue;
            }
            summary.total_records += 1;

            if processed.contains(&record_id) {
                self.sink.emit_progress(&ProgressEvent::RecordSkipped {
                    record_id,
                    reason: SkipReason::AlreadyProcessed,
                });
                continue;
            }

            let names = match resolve_owners(&record, fields) {
                OwnerResolution::Skip(reason) => {
                    self.sink.emit_progress(&ProgressEvent::RecordSkipped {
                        record_id: record_id.clone(),
                        reason,
                    });
                    self.mark_processed(&mut processed, &record_id).await;
                    continue;
                }
                OwnerResolution::Search(names) => names,
            };

            self.sink.emit_progress(&ProgressEvent::RecordStarted {
                record_id: record_id.clone(),
                names: names.clone(),
            });

            let mut record_emails = 0;
            let (discovery_ref, id_ref) = (&discovery, &record_id);
            let mut outcomes = stream::iter(names)
                .map(move |name| async move { discovery_ref.discover(id_ref, &name).await })
                .buffered(self.config.name_concurrency);

            while let Some(outcome) = outcomes.next().await {
                for email in outcome.emails {
                    let row = email.into_row(record_id.as_str());
                    self.sink.emit_row(&row);
                    summary.rows.push(row);
                    record_emails += 1;
                }
            }

            summary.total_emails_found += record_emails;
            self.sink.emit_progress(&ProgressEvent::RecordDone {
                record_id: record_id.clone(),
                emails: record_emails,
            });
            self.mark_processed(&mut processed, &record_id).await;
        }

        info!(
            total_records = summary.total_records,
            total_emails_found = summary.total_emails_found,
            cancelled = summary.cancelled,
            "Enrichment run finished"
        );
        self.sink.emit_progress(&ProgressEvent::RunFinished {
            total_records: summary.total_records,
            total_emails_found: summary.total_emails_found,
            cancelled: summary.cancelled,
        });

        Ok(summary)
    }

    async fn load_checkpoint(&self) -> HashSet<String> {
        let Some(store) = &self.checkpoint else {
            return HashSet::new();
        };
        match store.load().await {
            Ok(processed) => processed,
            Err(e) => {
                warn!(error = %e, "Failed to read checkpoint, starting with an empty processed set");
                HashSet::new()
            }
        }
    }

    /// Add `record_id` to the processed set and persist it.
    ///
    /// A save failure is reported and the run continues on in-memory state.
    async fn mark_processed(&self, processed: &mut HashSet<String>, record_id: &str) {
        processed.insert(record_id.to_string());

        let Some(store) = &self.checkpoint else {
            return;
        };
        if let Err(e) = store.save(processed).await {
            warn!(record_id = %record_id, error = %e, "Failed to save checkpoint");
            self.sink.emit_progress(&ProgressEvent::CheckpointSaveFailed {
                record_id: record_id.to_string(),
                error: e.to_string(),
            });
        }
    }
}
