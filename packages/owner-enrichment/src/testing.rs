//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the enrichment library
//! without making real search or network calls.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use crate::error::{FetchError, FetchResult, SearchError, SearchResult, StoreResult};
use crate::traits::{
    checkpoint::CheckpointStore,
    fetcher::PageFetcher,
    searcher::{SearchHit, WebSearcher},
};

/// A mock searcher with scripted responses per query.
///
/// Each query has a list of attempt responses. Call `n` returns response
/// `n`, and once the list is exhausted the last response repeats. Unknown
/// queries return no hits.
#[derive(Default)]
pub struct MockWebSearcher {
    responses: RwLock<HashMap<String, Vec<Vec<SearchHit>>>>,
    fail: bool,
    delay: Option<Duration>,

    /// Call tracking for assertions: (query, count)
    calls: RwLock<Vec<(String, usize)>>,
}

impl MockWebSearcher {
    /// Create a new mock searcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// A searcher whose every call fails, as when the provider is down.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// Return the same hits on every call for `query`.
    pub fn with_hits(self, query: &str, hits: Vec<SearchHit>) -> Self {
        self.with_attempts(query, vec![hits])
    }

    /// Return a different hit list per attempt for `query`.
    pub fn with_attempts(self, query: &str, attempts: Vec<Vec<SearchHit>>) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(query.to_string(), attempts);
        self
    }

    /// Sleep before answering, to exercise the search timeout.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Calls made so far.
    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls.read().unwrap().clone()
    }

    /// Number of calls made for one query.
    pub fn calls_for(&self, query: &str) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|(q, _)| q == query)
            .count()
    }
}

#[async_trait]
impl WebSearcher for MockWebSearcher {
    async fn search(&self, query: &str, count: usize) -> SearchResult<Vec<SearchHit>> {
        let attempt = self.calls_for(query);
        self.calls
            .write()
            .unwrap()
            .push((query.to_string(), count));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail {
            return Err(SearchError::Status {
                status: 503,
                body: "mock provider unavailable".to_string(),
            });
        }

        let responses = self.responses.read().unwrap();
        let hits = responses
            .get(query)
            .and_then(|attempts| attempts.get(attempt).or_else(|| attempts.last()))
            .cloned()
            .unwrap_or_default();

        Ok(hits.into_iter().take(count).collect())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A mock page fetcher with canned page text.
///
/// Unknown URLs return an empty page.
#[derive(Default)]
pub struct MockPageFetcher {
    pages: RwLock<HashMap<String, String>>,
    failing: RwLock<HashSet<String>>,
    delay: Option<Duration>,
    calls: RwLock<Vec<String>>,
}

impl MockPageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `text` for `url`.
    pub fn with_page(self, url: &str, text: &str) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(url.to_string(), text.to_string());
        self
    }

    /// Fail every fetch of `url`.
    pub fn failing_for(self, url: &str) -> Self {
        self.failing.write().unwrap().insert(url.to_string());
        self
    }

    /// Sleep before answering, to exercise timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// URLs fetched so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for MockPageFetcher {
    async fn fetch_text(&self, url: &str, _timeout: Duration) -> FetchResult<String> {
        self.calls.write().unwrap().push(url.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.read().unwrap().contains(url) {
            return Err(FetchError::Status {
                status: 500,
                url: url.to_string(),
            });
        }

        Ok(self
            .pages
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A checkpoint store that loads a fixed set and fails every save.
///
/// With [`FailingCheckpoint::failing_load`] the load fails as well, as with
/// an unreadable checkpoint file.
#[derive(Default)]
pub struct FailingCheckpoint {
    initial: HashSet<String>,
    fail_load: bool,
    save_attempts: AtomicUsize,
}

impl FailingCheckpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the processed set returned by `load`.
    pub fn with_processed(mut self, ids: &[&str]) -> Self {
        self.initial = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Make `load` fail too.
    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    /// Number of saves attempted.
    pub fn save_attempts(&self) -> usize {
        self.save_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CheckpointStore for FailingCheckpoint {
    async fn load(&self) -> StoreResult<HashSet<String>> {
        if self.fail_load {
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "corrupt checkpoint").into());
        }
        Ok(self.initial.clone())
    }

    async fn save(&self, _processed: &HashSet<String>) -> StoreResult<()> {
        self.save_attempts.fetch_add(1, Ordering::SeqCst);
        Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only checkpoint").into())
    }
}
