//! Discovery loop - search, inspect hits, scrape, collect emails for one name.
//!
//! State is scoped to a single candidate name: the set of hit URLs already
//! inspected and the set of emails already collected. Provider failures are
//! absorbed here and count as an attempt that returned nothing.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::pipeline::{confidence::score_email, emails::extract_emails};
use crate::traits::{
    fetcher::PageFetcher,
    searcher::{SearchHit, WebSearcher},
    sink::ProgressSink,
};
use crate::types::{config::EnrichmentConfig, events::ProgressEvent, result::DiscoveredEmail};

/// Default upper bound on a single search call, regardless of provider settings.
pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

static RE_DOMAIN_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[a-z]{2,}(/|$)").unwrap());

/// Budgets for one name's discovery loop.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryParams {
    pub max_queries: usize,
    pub max_emails_per_name: usize,
    pub results_per_query: usize,
    pub scrape_pages: bool,
    pub fetch_timeout: Duration,
    pub query_delay: Duration,
    /// Upper bound on each search call.
    pub search_timeout: Duration,
}

impl From<&EnrichmentConfig> for DiscoveryParams {
    fn from(config: &EnrichmentConfig) -> Self {
        Self {
            max_queries: config.max_queries,
            max_emails_per_name: config.max_emails_per_name,
            results_per_query: config.results_per_query,
            scrape_pages: config.scrape_pages,
            fetch_timeout: config.fetch_timeout,
            query_delay: config.query_delay,
            search_timeout: SEARCH_TIMEOUT,
        }
    }
}

impl Default for DiscoveryParams {
    fn default() -> Self {
        Self::from(&EnrichmentConfig::default())
    }
}

/// Emails found for one name plus the search attempts spent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameOutcome {
    pub emails: Vec<DiscoveredEmail>,
    pub attempts: usize,
}

/// Runs discovery for candidate names against injected capabilities.
pub struct DiscoveryLoop<'a> {
    searcher: &'a dyn WebSearcher,
    fetcher: &'a dyn PageFetcher,
    sink: &'a dyn ProgressSink,
    params: DiscoveryParams,
}

impl<'a> DiscoveryLoop<'a> {
    pub fn new(
        searcher: &'a dyn WebSearcher,
        fetcher: &'a dyn PageFetcher,
        sink: &'a dyn ProgressSink,
        params: DiscoveryParams,
    ) -> Self {
        Self {
            searcher,
            fetcher,
            sink,
            params,
        }
    }

    /// Discover up to `max_emails_per_name` emails for `name`.
    ///
    /// Stops early once the cap is reached; otherwise spends the full
    /// `max_queries` budget. Never fails.
    pub async fn discover(&self, record_id: &str, name: &str) -> NameOutcome {
        let cap = self.params.max_emails_per_name;
        let mut seen_urls: HashSet<String> = HashSet::new();
        let mut collected: HashSet<String> = HashSet::new();
        let mut outcome = NameOutcome::default();

        info!(record_id = %record_id, name = %name, "Searching for owner");

        for attempt in 1..=self.params.max_queries {
            outcome.attempts = attempt;
            self.sink.emit_progress(&ProgressEvent::NameSearching {
                record_id: record_id.to_string(),
                name: name.to_string(),
                attempt,
            });

            let hits = self.search(name, attempt).await;

            for hit in hits {
                if collected.len() >= cap {
                    break;
                }
                if !seen_urls.insert(hit.url.clone()) {
                    continue;
                }

                let candidates = self.inspect_hit(name, &hit, &collected).await;

                for email in candidates {
                    if collected.len() >= cap {
                        break;
                    }
                    if collected.contains(&email) {
                        continue;
                    }

                    let found = DiscoveredEmail {
                        name: name.to_string(),
                        confidence: score_email(&email, name),
                        email: email.clone(),
                        source: hit.url.clone(),
                        snippet: hit.snippet_text().to_string(),
                    };
                    debug!(name = %name, email = %email, source = %hit.url, "Email found");
                    self.sink.emit_progress(&ProgressEvent::EmailFound {
                        record_id: record_id.to_string(),
                        name: name.to_string(),
                        email: email.clone(),
                        source: hit.url.clone(),
                    });

                    collected.insert(email);
                    outcome.emails.push(found);
                }
            }

            if collected.len() >= cap {
                debug!(name = %name, attempt, "Email cap reached, stopping early");
                break;
            }

            if attempt < self.params.max_queries && !self.params.query_delay.is_zero() {
                tokio::time::sleep(self.params.query_delay).await;
            }
        }

        info!(
            record_id = %record_id,
            name = %name,
            emails = outcome.emails.len(),
            attempts = outcome.attempts,
            "Collected emails for owner"
        );
        self.sink.emit_progress(&ProgressEvent::NameSummary {
            record_id: record_id.to_string(),
            name: name.to_string(),
            emails: outcome.emails.len(),
            attempts: outcome.attempts,
        });

        outcome
    }

    /// One search attempt; failures and timeouts yield no hits.
    async fn search(&self, name: &str, attempt: usize) -> Vec<SearchHit> {
        let result = tokio::time::timeout(
            self.params.search_timeout,
            self.searcher.search(name, self.params.results_per_query),
        )
        .await;

        let error = match result {
            Ok(Ok(hits)) => {
                debug!(name = %name, attempt, hits = hits.len(), searcher = self.searcher.name(), "Search returned");
                return hits;
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {:?}", self.params.search_timeout),
        };

        warn!(name = %name, attempt, error = %error, "Search failed");
        self.sink.emit_progress(&ProgressEvent::SearchFailed {
            name: name.to_string(),
            attempt,
            error,
        });
        Vec::new()
    }

    /// Snippet emails followed by any new emails scraped from the page.
    async fn inspect_hit(
        &self,
        name: &str,
        hit: &SearchHit,
        collected: &HashSet<String>,
    ) -> Vec<String> {
        let mut emails = extract_emails(&hit.combined_text());
        let snippet_emails = emails.len();
        let mut page_emails = 0;

        if self.params.scrape_pages && collected.len() < self.params.max_emails_per_name {
            let page_text = self.fetch_page(&hit.url).await;
            if !page_text.is_empty() {
                let new_page_emails: Vec<String> = extract_emails(&page_text)
                    .into_iter()
                    .filter(|e| !emails.contains(e) && !collected.contains(e))
                    .collect();
                page_emails = new_page_emails.len();
                emails.extend(new_page_emails);
            }
        }

        debug!(
            url = %hit.url,
            snippet_emails,
            page_emails,
            "Inspected hit"
        );
        self.sink.emit_progress(&ProgressEvent::HitInspected {
            name: name.to_string(),
            url: hit.url.clone(),
            snippet_emails,
            page_emails,
        });

        emails
    }

    /// Fetch page text; any failure is an empty page.
    async fn fetch_page(&self, raw_url: &str) -> String {
        let Some(url) = normalize_url(raw_url) else {
            debug!(url = %raw_url, "Skipping fetch, invalid URL");
            return String::new();
        };

        let timeout = self.params.fetch_timeout;
        match tokio::time::timeout(timeout, self.fetcher.fetch_text(&url, timeout)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!(url = %url, error = %e, "Failed to fetch page");
                String::new()
            }
            Err(_) => {
                warn!(url = %url, "Page fetch timed out");
                String::new()
            }
        }
    }
}

/// Turn a hit URL into something fetchable.
///
/// `//host/path` gains `https:`, explicit `http(s)://` is kept, bare
/// `host.tld/path` gains `https://`. Anything else is not fetchable.
pub fn normalize_url(raw: &str) -> Option<String> {
    let url = raw.trim();
    if url.is_empty() {
        return None;
    }
    if url.starts_with("//") {
        return Some(format!("https:{url}"));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        return Some(url.to_string());
    }
    if RE_DOMAIN_LIKE.is_match(url) {
        return Some(format!("https://{url}"));
    }
    None
}
