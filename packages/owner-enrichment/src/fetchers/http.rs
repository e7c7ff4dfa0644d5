//! HTTP page fetcher.
//!
//! Fetches one page per hit and flattens HTML to plain text so the email
//! pattern can run over visible content. Links are never followed.

use async_trait::async_trait;
use scraper::{Html, Node};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::PageFetcher;

/// User agent sent with every page fetch.
pub const DEFAULT_USER_AGENT: &str = "openweb_enricher/1.0";

/// Elements whose text is never visible.
const HIDDEN_ELEMENTS: [&str; 3] = ["script", "style", "noscript"];

/// Fetcher that downloads pages over HTTP(S).
///
/// # Example
///
/// ```rust,ignore
/// let fetcher = HttpPageFetcher::new().with_delay(Duration::from_millis(200));
/// let text = fetcher.fetch_text("https://example.com", Duration::from_secs(15)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: reqwest::Client,
    user_agent: String,
    delay: Duration,
}

impl Default for HttpPageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpPageFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            delay: Duration::ZERO,
        }
    }

    /// Set a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Pause after each successful fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn map_error(url: &str, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Http(Box::new(e))
        }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_text(&self, url: &str, timeout: Duration) -> FetchResult<String> {
        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
            });
        }

        debug!(url = %url, "Page fetch starting");
        let response = self
            .client
            .get(parsed)
            .header("User-Agent", &self.user_agent)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "Page request failed");
                Self::map_error(url, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("html"));

        let body = response
            .text()
            .await
            .map_err(|e| Self::map_error(url, e))?;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        Ok(if is_html { html_to_text(&body) } else { body })
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Visible text of an HTML document, whitespace collapsed to single spaces.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut words: Vec<&str> = Vec::new();

    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()))
        });
        if !hidden {
            words.extend(text.split_whitespace());
        }
    }

    words.join(" ")
}
