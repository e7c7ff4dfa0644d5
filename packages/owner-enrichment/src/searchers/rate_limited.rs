//! Rate-limited searcher wrapper.
//!
//! Wraps any WebSearcher with a shared quota using the governor crate.
//! Search providers bill and throttle per key, so every task using the
//! same wrapper draws from one bucket.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::error::{EnrichError, Result, SearchResult};
use crate::traits::searcher::{SearchHit, WebSearcher};

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// A searcher wrapper that enforces a request rate.
pub struct RateLimitedSearcher<S: WebSearcher> {
    inner: S,
    limiter: Arc<DefaultRateLimiter>,
}

impl<S: WebSearcher> RateLimitedSearcher<S> {
    /// Wrap `searcher` with a limit of `requests_per_second`.
    pub fn new(searcher: S, requests_per_second: u32) -> Result<Self> {
        let rps = NonZeroU32::new(requests_per_second)
            .ok_or_else(|| EnrichError::invalid_config("search rate must be > 0"))?;
        Ok(Self::with_quota(searcher, Quota::per_second(rps)))
    }

    /// Wrap with a sustained rate and a burst allowance.
    pub fn with_burst(searcher: S, requests_per_second: u32, burst: u32) -> Result<Self> {
        let rps = NonZeroU32::new(requests_per_second)
            .ok_or_else(|| EnrichError::invalid_config("search rate must be > 0"))?;
        let burst = NonZeroU32::new(burst)
            .ok_or_else(|| EnrichError::invalid_config("search burst must be > 0"))?;
        Ok(Self::with_quota(searcher, Quota::per_second(rps).allow_burst(burst)))
    }

    /// Wrap with a custom quota.
    pub fn with_quota(searcher: S, quota: Quota) -> Self {
        Self {
            inner: searcher,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: WebSearcher> WebSearcher for RateLimitedSearcher<S> {
    async fn search(&self, query: &str, count: usize) -> SearchResult<Vec<SearchHit>> {
        self.limiter.until_ready().await;
        self.inner.search(query, count).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Extension trait for easy rate limiting.
pub trait SearcherExt: WebSearcher + Sized {
    /// Wrap this searcher with rate limiting.
    fn rate_limited(self, requests_per_second: u32) -> Result<RateLimitedSearcher<Self>> {
        RateLimitedSearcher::new(self, requests_per_second)
    }
}

impl<S: WebSearcher + Sized> SearcherExt for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockWebSearcher;
    use std::time::Instant;

    #[tokio::test]
    async fn test_rate_limiting() {
        let searcher = MockWebSearcher::new().rate_limited(2).unwrap();

        let start = Instant::now();
        for _ in 0..3 {
            searcher.search("Jane Doe", 10).await.unwrap();
        }
        let elapsed = start.elapsed();

        assert_eq!(searcher.inner().calls_for("Jane Doe"), 3);
        // First is immediate, 2nd and 3rd wait on a 2/sec quota
        assert!(elapsed.as_millis() >= 500, "Rate limiting not working: {:?}", elapsed);
    }

    #[test]
    fn test_zero_rate_rejected() {
        assert!(RateLimitedSearcher::new(MockWebSearcher::new(), 0).is_err());
        assert!(RateLimitedSearcher::with_burst(MockWebSearcher::new(), 1, 0).is_err());
    }

    #[test]
    fn test_name_passes_through() {
        let searcher = MockWebSearcher::new().rate_limited(5).unwrap();
        assert_eq!(searcher.name(), "mock");
    }
}
