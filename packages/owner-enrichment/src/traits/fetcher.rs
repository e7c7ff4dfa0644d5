//! Page fetcher trait.
//!
//! Fetches the single top-level page behind a search hit and returns its
//! plain-text content. Links are never followed.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::FetchResult;

/// Page fetch capability.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return its text content.
    ///
    /// HTML is converted to whitespace-collapsed plain text; other content
    /// types are passed through as raw text.
    async fn fetch_text(&self, url: &str, timeout: Duration) -> FetchResult<String>;

    /// Fetcher name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Arc<T> {
    async fn fetch_text(&self, url: &str, timeout: Duration) -> FetchResult<String> {
        (**self).fetch_text(url, timeout).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
