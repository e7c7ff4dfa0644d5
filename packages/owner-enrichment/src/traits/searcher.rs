//! Web searcher trait for owner discovery.
//!
//! The discovery loop only needs "give me hits for this query". Provider
//! transport (auth headers, status handling, payload shape) lives behind
//! this trait. Implementations return `Err` on failure; the loop absorbs
//! the error and treats the attempt as zero hits.
//!
//! # Implementations
//!
//! - `BraveWebSearcher` - Brave Search API
//! - `RateLimitedSearcher` - wraps any searcher with a shared quota
//! - `MockWebSearcher` - For testing

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::SearchResult;

/// One result returned by a search provider.
///
/// The URL is kept as a plain string: providers occasionally return hits
/// without a URL or with scheme-less hosts, and those still take part in
/// per-name URL de-duplication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// URL of the hit (may be empty).
    pub url: String,

    /// Title of the page (if available from search results).
    pub title: Option<String>,

    /// Snippet/description from search results.
    pub snippet: Option<String>,
}

impl SearchHit {
    /// Create a new hit from a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            snippet: None,
        }
    }

    /// Add a title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a snippet.
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    /// Snippet text, empty when absent.
    pub fn snippet_text(&self) -> &str {
        self.snippet.as_deref().unwrap_or("")
    }

    /// Title, snippet and URL joined for email extraction.
    pub fn combined_text(&self) -> String {
        format!(
            "{} {} {}",
            self.title.as_deref().unwrap_or(""),
            self.snippet_text(),
            self.url
        )
    }
}

/// Web search capability.
#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Search the web, requesting up to `count` hits.
    async fn search(&self, query: &str, count: usize) -> SearchResult<Vec<SearchHit>>;

    /// Searcher name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}

#[async_trait]
impl<T: WebSearcher + ?Sized> WebSearcher for Arc<T> {
    async fn search(&self, query: &str, count: usize) -> SearchResult<Vec<SearchHit>> {
        (**self).search(query, count).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockWebSearcher;

    #[test]
    fn test_combined_text_includes_all_parts() {
        let hit = SearchHit::new("https://example.com/team")
            .with_title("Our Team")
            .with_snippet("Reach jane@example.com");
        let text = hit.combined_text();
        assert!(text.starts_with("Our Team "));
        assert!(text.contains("Reach jane@example.com"));
        assert!(text.ends_with("https://example.com/team"));
    }

    #[test]
    fn test_missing_parts_render_empty() {
        let hit = SearchHit::default();
        assert_eq!(hit.snippet_text(), "");
        assert_eq!(hit.combined_text(), "  ");
    }

    #[tokio::test]
    async fn test_arc_searcher_delegates() {
        let searcher = Arc::new(
            MockWebSearcher::new().with_hits("query", vec![SearchHit::new("https://a.com")]),
        );
        let hits = searcher.search("query", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(searcher.calls().len(), 1);
    }
}
