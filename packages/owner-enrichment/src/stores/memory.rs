//! In-memory storage implementations for testing and development.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::jobs::{JobRecord, JobStatus, JobStore, JobSummary, HISTORY_LIMIT};
use crate::traits::checkpoint::CheckpointStore;
use crate::types::{config::EnrichmentConfig, result::RunSummary};

/// In-memory processed set.
///
/// Useful for testing and for runs that do not need to survive a restart.
#[derive(Debug, Default)]
pub struct MemoryCheckpoint {
    processed: RwLock<HashSet<String>>,
    saves: AtomicUsize,
}

impl MemoryCheckpoint {
    /// Create an empty checkpoint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a checkpoint that already contains `ids`.
    pub fn with_processed<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            processed: RwLock::new(ids.into_iter().map(Into::into).collect()),
            saves: AtomicUsize::new(0),
        }
    }

    /// Current persisted set.
    pub fn snapshot(&self) -> HashSet<String> {
        self.processed.read().unwrap().clone()
    }

    /// Number of saves performed.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpoint {
    async fn load(&self) -> StoreResult<HashSet<String>> {
        Ok(self.snapshot())
    }

    async fn save(&self, processed: &HashSet<String>) -> StoreResult<()> {
        *self.processed.write().unwrap() = processed.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// In-memory job store.
///
/// History holds the most recent [`HISTORY_LIMIT`] finished jobs. A finished
/// job that falls out of history is forgotten entirely; running jobs are
/// always kept.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<String, JobRecord>>,
    history: RwLock<VecDeque<JobSummary>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jobs known to the store.
    pub fn job_count(&self) -> usize {
        self.jobs.read().unwrap().len()
    }

    fn update<F>(&self, job_id: &str, f: F) -> StoreResult<()>
    where
        F: FnOnce(&mut JobRecord),
    {
        let mut jobs = self.jobs.write().unwrap();
        let job = jobs.get_mut(job_id).ok_or_else(|| StoreError::JobNotFound {
            job_id: job_id.to_string(),
        })?;
        f(job);
        Ok(())
    }

    fn complete(&self, job_id: &str, status: JobStatus, f: impl FnOnce(&mut JobRecord)) -> StoreResult<()> {
        let mut summary = None;
        self.update(job_id, |job| {
            f(job);
            job.status = status;
            job.finished = Some(Utc::now());
            summary = Some(job.summary());
        })?;

        if let Some(summary) = summary {
            let mut history = self.history.write().unwrap();
            history.push_front(summary);
            let keep = HISTORY_LIMIT.min(history.len());
            let evicted: Vec<JobSummary> = history.drain(keep..).collect();
            drop(history);

            if !evicted.is_empty() {
                let mut jobs = self.jobs.write().unwrap();
                for old in evicted {
                    jobs.remove(&old.job_id);
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create(&self, config: &EnrichmentConfig) -> StoreResult<JobRecord> {
        let job = JobRecord::new(config.clone());
        self.jobs
            .write()
            .unwrap()
            .insert(job.job_id.clone(), job.clone());
        Ok(job)
    }

    async fn append_log(&self, job_id: &str, line: &str) -> StoreResult<()> {
        self.update(job_id, |job| {
            job.logs.extend(line.lines().map(str::to_string));
        })
    }

    async fn finish(&self, job_id: &str, result: RunSummary) -> StoreResult<()> {
        self.complete(job_id, JobStatus::Done, |job| job.result = Some(result))
    }

    async fn fail(&self, job_id: &str, error: &str) -> StoreResult<()> {
        self.complete(job_id, JobStatus::Error, |job| {
            job.logs.push(format!("ERROR: {error}"));
            job.error = Some(error.to_string());
        })
    }

    async fn get(&self, job_id: &str) -> StoreResult<Option<JobRecord>> {
        Ok(self.jobs.read().unwrap().get(job_id).cloned())
    }

    async fn history(&self) -> StoreResult<Vec<JobSummary>> {
        Ok(self.history.read().unwrap().iter().cloned().collect())
    }
}
