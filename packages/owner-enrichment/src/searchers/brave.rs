//! Brave Search web searcher.
//!
//! Calls the Brave web search API and maps `web.results` into
//! [`SearchHit`]s. Some responses put results at the top level instead,
//! so both shapes are accepted.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::{SearchError, SearchResult};
use crate::security::{secret_from_env, ExposeSecret, SecretString, BRAVE_API_KEY_ENV};
use crate::traits::searcher::{SearchHit, WebSearcher};

/// Brave web search endpoint.
pub const BRAVE_SEARCH_URL: &str = "https://api.search.brave.com/res/v1/web/search";

/// Largest `count` the web search API accepts.
pub const BRAVE_MAX_COUNT: usize = 20;

/// Per-request timeout for the search API.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Default, Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: Option<BraveWeb>,
    #[serde(default)]
    results: Option<Vec<BraveResult>>,
}

#[derive(Debug, Default, Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

impl BraveResponse {
    fn into_hits(self) -> Vec<SearchHit> {
        let results = match (self.web, self.results) {
            (Some(web), _) if !web.results.is_empty() => web.results,
            (_, Some(results)) => results,
            _ => Vec::new(),
        };

        results
            .into_iter()
            .map(|r| SearchHit {
                url: r.url.unwrap_or_default(),
                title: r.title.filter(|t| !t.is_empty()),
                snippet: r.description.or(r.snippet).filter(|s| !s.is_empty()),
            })
            .collect()
    }
}

/// Parse a Brave search response body.
pub fn parse_response(body: &str) -> SearchResult<Vec<SearchHit>> {
    let response: BraveResponse =
        serde_json::from_str(body).map_err(|e| SearchError::Decode(e.to_string()))?;
    Ok(response.into_hits())
}

/// Searcher backed by the Brave Search API.
///
/// A searcher built without a key fails every call with
/// [`SearchError::MissingCredentials`], which the discovery loop treats as
/// an empty result.
#[derive(Clone)]
pub struct BraveWebSearcher {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    endpoint: String,
}

impl BraveWebSearcher {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_optional_key(Some(SecretString::from(api_key.into())))
    }

    /// Read the key from `BRAVE_API_KEY`.
    pub fn from_env() -> Self {
        Self::with_optional_key(secret_from_env(BRAVE_API_KEY_ENV))
    }

    fn with_optional_key(api_key: Option<SecretString>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_key,
            endpoint: BRAVE_SEARCH_URL.to_string(),
        }
    }

    /// Point at a different endpoint, e.g. a local stub server.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    /// `count` above [`BRAVE_MAX_COUNT`] is clamped.
    fn build_request(
        &self,
        api_key: &SecretString,
        query: &str,
        count: usize,
    ) -> reqwest::RequestBuilder {
        let count = count.min(BRAVE_MAX_COUNT).to_string();
        self.client
            .get(&self.endpoint)
            .header("X-Subscription-Token", api_key.expose_secret())
            .header("Accept", "application/json")
            .query(&[("q", query), ("count", count.as_str()), ("result_filter", "web")])
    }
}

impl std::fmt::Debug for BraveWebSearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BraveWebSearcher")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[async_trait]
impl WebSearcher for BraveWebSearcher {
    async fn search(&self, query: &str, count: usize) -> SearchResult<Vec<SearchHit>> {
        let api_key = self.api_key.as_ref().ok_or(SearchError::MissingCredentials)?;

        let response = self
            .build_request(api_key, query, count)
            .send()
            .await
            .map_err(|e| SearchError::Http(Box::new(e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Http(Box::new(e)))?;

        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let hits = parse_response(&body)?;
        debug!(query = %query, hits = hits.len(), "Brave search completed");
        Ok(hits)
    }

    fn name(&self) -> &str {
        "brave"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_web_results() {
        let body = r#"{
            "web": {"results": [
                {"url": "https://doe.org", "title": "Jane Doe", "description": "Contact jane@doe.org"},
                {"url": "https://other.org", "title": "Other"}
            ]}
        }"#;

        let hits = parse_response(body).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url, "https://doe.org");
        assert_eq!(hits[0].snippet.as_deref(), Some("Contact jane@doe.org"));
        assert_eq!(hits[1].snippet, None);
    }

    #[test]
    fn test_parse_top_level_results_with_snippet_field() {
        let body = r#"{"results": [{"url": "x.com/a", "snippet": "mail a@x.com"}]}"#;

        let hits = parse_response(body).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, None);
        assert_eq!(hits[0].snippet.as_deref(), Some("mail a@x.com"));
    }

    #[test]
    fn test_parse_empty_and_missing_sections() {
        assert!(parse_response("{}").unwrap().is_empty());
        assert!(parse_response(r#"{"web": {}}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_garbage_is_decode_error() {
        assert!(matches!(parse_response("<html>"), Err(SearchError::Decode(_))));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network() {
        let searcher = BraveWebSearcher::with_optional_key(None);
        assert!(!searcher.has_credentials());
        assert!(matches!(
            searcher.search("Jane Doe", 10).await,
            Err(SearchError::MissingCredentials)
        ));
    }

    #[test]
    fn test_request_clamps_count() {
        let searcher = BraveWebSearcher::new("secret-token");
        let key = searcher.api_key.clone().unwrap();
        let request = searcher
            .build_request(&key, "Jane Doe", 30)
            .build()
            .unwrap();

        let query: Vec<(String, String)> = request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            query,
            [
                ("q".to_string(), "Jane Doe".to_string()),
                ("count".to_string(), "20".to_string()),
                ("result_filter".to_string(), "web".to_string()),
            ]
        );
        assert_eq!(request.headers()["X-Subscription-Token"], "secret-token");
    }

    #[test]
    fn test_request_keeps_small_count() {
        let searcher = BraveWebSearcher::new("k");
        let key = searcher.api_key.clone().unwrap();
        let request = searcher.build_request(&key, "Al Ng", 10).build().unwrap();
        assert!(request.url().query_pairs().any(|(k, v)| k == "count" && v == "10"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let searcher = BraveWebSearcher::new("secret-token");
        assert!(!format!("{searcher:?}").contains("secret-token"));
    }
}
