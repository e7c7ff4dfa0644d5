//! Background enrichment jobs.
//!
//! A [`JobRunner`] executes each submitted batch as an isolated tokio task
//! with its own `Enricher` state. Job status, log lines and results live in
//! an injected [`JobStore`], so several runners (and stores) can coexist.
//!
//! ```text
//! JobRunner::submit
//!     ├─► JobStore::create
//!     ├─► spawn ─► Enricher::run_until_cancelled ─► ChannelSink
//!     │                                                │
//!     │              forwarder task ◄──────────────────┘
//!     │                  └─► JobStore::append_log
//!     └─► JobStore::finish / JobStore::fail
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{EnrichError, Result, StoreResult};
use crate::pipeline::Enricher;
use crate::sinks::{ChannelSink, SinkMessage};
use crate::traits::{checkpoint::CheckpointStore, fetcher::PageFetcher, searcher::WebSearcher};
use crate::types::{config::EnrichmentConfig, record::InputRecord, result::RunSummary};

/// Most recent jobs kept in history.
pub const HISTORY_LIMIT: usize = 50;

/// Buffered progress messages per job before new ones are dropped.
const LOG_CHANNEL_CAPACITY: usize = 1024;

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Running,
    Done,
    Error,
}

/// Full state of one job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: String,
    pub status: JobStatus,
    pub started: DateTime<Utc>,
    pub finished: Option<DateTime<Utc>>,
    pub config: EnrichmentConfig,
    pub logs: Vec<String>,
    pub result: Option<RunSummary>,
    pub error: Option<String>,
}

impl JobRecord {
    /// A freshly started job.
    pub fn new(config: EnrichmentConfig) -> Self {
        Self {
            job_id: new_job_id(),
            status: JobStatus::Running,
            started: Utc::now(),
            finished: None,
            config,
            logs: Vec::new(),
            result: None,
            error: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status != JobStatus::Running
    }

    pub fn summary(&self) -> JobSummary {
        JobSummary {
            job_id: self.job_id.clone(),
            status: self.status,
            started: self.started,
            finished: self.finished,
            total_records: self.result.as_ref().map_or(0, |r| r.total_records),
            total_emails_found: self.result.as_ref().map_or(0, |r| r.total_emails_found),
        }
    }
}

/// One line of job history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub job_id: String,
    pub status: JobStatus,
    pub started: DateTime<Utc>,
    pub finished: Option<DateTime<Utc>>,
    pub total_records: usize,
    pub total_emails_found: usize,
}

/// Short hex job identifier.
pub fn new_job_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(12);
    id
}

/// Storage for job state, keyed by job ID.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Register a running job.
    async fn create(&self, config: &EnrichmentConfig) -> StoreResult<JobRecord>;

    /// Append a log line to a job.
    async fn append_log(&self, job_id: &str, line: &str) -> StoreResult<()>;

    /// Mark a job done with its result.
    async fn finish(&self, job_id: &str, result: RunSummary) -> StoreResult<()>;

    /// Mark a job failed.
    async fn fail(&self, job_id: &str, error: &str) -> StoreResult<()>;

    /// Look up a job.
    async fn get(&self, job_id: &str) -> StoreResult<Option<JobRecord>>;

    /// Finished jobs, most recent first.
    async fn history(&self) -> StoreResult<Vec<JobSummary>>;
}

/// Handle to a submitted job.
pub struct JobHandle {
    pub job_id: String,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl JobHandle {
    /// Ask the job to stop at the next record boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the job task to complete.
    pub async fn wait(self) -> Result<()> {
        self.task
            .await
            .map_err(|e| EnrichError::Job(format!("job {} panicked: {e}", self.job_id)))
    }
}

/// Spawns enrichment runs and records their outcome in a [`JobStore`].
#[derive(Clone)]
pub struct JobRunner {
    store: Arc<dyn JobStore>,
    searcher: Arc<dyn WebSearcher>,
    fetcher: Arc<dyn PageFetcher>,
    checkpoint: Option<Arc<dyn CheckpointStore>>,
}

impl JobRunner {
    pub fn new(
        store: Arc<dyn JobStore>,
        searcher: Arc<dyn WebSearcher>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        Self {
            store,
            searcher,
            fetcher,
            checkpoint: None,
        }
    }

    /// Share a checkpoint across jobs. Without one each job starts fresh.
    pub fn with_checkpoint(mut self, store: Arc<dyn CheckpointStore>) -> Self {
        self.checkpoint = Some(store);
        self
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    /// Validate `config`, register a job and start it in the background.
    pub async fn submit(
        &self,
        records: Vec<InputRecord>,
        config: EnrichmentConfig,
    ) -> Result<JobHandle> {
        config.validate()?;

        let job = self
            .store
            .create(&config)
            .await
            .map_err(|e| EnrichError::Job(format!("failed to create job: {e}")))?;
        let job_id = job.job_id.clone();
        info!(job_id = %job_id, records = records.len(), "Job submitted");

        let (sink, mut rx) = ChannelSink::new(LOG_CHANNEL_CAPACITY);
        let mut enricher = Enricher::new(self.searcher.clone(), self.fetcher.clone(), config)
            .with_sink(Arc::new(sink));
        if let Some(checkpoint) = &self.checkpoint {
            enricher = enricher.with_checkpoint(checkpoint.clone());
        }

        let store = self.store.clone();
        let forward_id = job_id.clone();
        let forwarder = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                if let SinkMessage::Progress(event) = message {
                    if let Err(e) = store.append_log(&forward_id, &event.to_string()).await {
                        warn!(job_id = %forward_id, error = %e, "Failed to append job log");
                    }
                }
            }
        });

        let cancel = CancellationToken::new();
        let run_cancel = cancel.clone();
        let store = self.store.clone();
        let run_id = job_id.clone();
        let task = tokio::spawn(async move {
            let outcome = enricher.run_until_cancelled(records, &run_cancel).await;
            // Closing the sink lets the forwarder drain and exit.
            drop(enricher);
            if let Err(e) = forwarder.await {
                warn!(job_id = %run_id, error = %e, "Log forwarder stopped abnormally");
            }

            let stored = match outcome {
                Ok(summary) => {
                    info!(
                        job_id = %run_id,
                        total_records = summary.total_records,
                        total_emails_found = summary.total_emails_found,
                        "Job finished"
                    );
                    store.finish(&run_id, summary).await
                }
                Err(e) => {
                    error!(job_id = %run_id, error = %e, "Job failed");
                    store.fail(&run_id, &e.to_string()).await
                }
            };
            if let Err(e) = stored {
                error!(job_id = %run_id, error = %e, "Failed to record job outcome");
            }
        });

        Ok(JobHandle {
            job_id,
            cancel,
            task,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryJobStore;
    use crate::testing::{MockPageFetcher, MockWebSearcher};
    use crate::traits::searcher::SearchHit;
    use std::time::Duration;

    fn runner(store: Arc<MemoryJobStore>) -> JobRunner {
        let searcher = MockWebSearcher::new().with_hits(
            "Jane Doe",
            vec![SearchHit::new("https://doe.org").with_snippet("jane@doe.org")],
        );
        JobRunner::new(store, Arc::new(searcher), Arc::new(MockPageFetcher::new()))
    }

    fn config() -> EnrichmentConfig {
        EnrichmentConfig::default()
            .with_scrape_pages(false)
            .with_query_delay(Duration::ZERO)
    }

    fn records() -> Vec<InputRecord> {
        vec![InputRecord::new(0)
            .with_field("ID", "7")
            .with_field("Owner 1", "Jane Doe")]
    }

    #[test]
    fn test_job_id_shape() {
        let id = new_job_id();
        assert_eq!(id.len(), 12);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_job_completes_with_result_and_logs() {
        let store = Arc::new(MemoryJobStore::new());
        let handle = runner(store.clone())
            .submit(records(), config())
            .await
            .unwrap();
        let job_id = handle.job_id.clone();
        handle.wait().await.unwrap();

        let job = store.get(&job_id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Done);
        assert!(job.finished.is_some());
        let result = job.result.unwrap();
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].input_id, "7");
        assert!(job
            .logs
            .iter()
            .any(|l| l.contains("found email: jane@doe.org")));
        assert!(job.logs.last().unwrap().starts_with("Processed 1 records"));

        let history = store.history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].total_emails_found, 1);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_at_submit() {
        let store = Arc::new(MemoryJobStore::new());
        let result = runner(store.clone())
            .submit(records(), config().with_max_emails_per_name(0))
            .await;

        assert!(result.is_err());
        assert!(store.history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_independent_runners_do_not_share_state() {
        let first = Arc::new(MemoryJobStore::new());
        let second = Arc::new(MemoryJobStore::new());

        let a = runner(first.clone()).submit(records(), config()).await.unwrap();
        let b = runner(second.clone()).submit(records(), config()).await.unwrap();
        let (a_id, b_id) = (a.job_id.clone(), b.job_id.clone());
        a.wait().await.unwrap();
        b.wait().await.unwrap();

        // Each job found the email; no processed set leaked between them.
        for (store, id) in [(&first, &a_id), (&second, &b_id)] {
            let job = store.get(id).await.unwrap().unwrap();
            assert_eq!(job.result.unwrap().total_emails_found, 1);
        }
        assert!(first.get(&b_id).await.unwrap().is_none());
    }
}
