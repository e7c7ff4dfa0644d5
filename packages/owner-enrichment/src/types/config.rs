//! Configuration types for enrichment runs.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{EnrichError, Result};

/// Column names the owner resolver reads.
///
/// Lookups are case- and whitespace-insensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Explicit record identifier column.
    pub id_field: String,

    /// Column flagging corporate owners; truthy rows are skipped.
    pub corporate_field: String,

    /// Owner name slots, read in order.
    pub owner_fields: Vec<String>,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            id_field: "ID".to_string(),
            corporate_field: "Is corp?".to_string(),
            owner_fields: vec!["Owner 1".to_string(), "Owner 2".to_string()],
        }
    }
}

/// Configuration for an enrichment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Fetch each result page and scrape it for additional emails.
    ///
    /// Default: true.
    pub scrape_pages: bool,

    /// Search attempts per candidate name.
    ///
    /// Default: 5.
    pub max_queries: usize,

    /// Confirmed emails kept per candidate name.
    ///
    /// Default: 2.
    pub max_emails_per_name: usize,

    /// Hits requested per search.
    ///
    /// Default: 10.
    pub results_per_query: usize,

    /// Timeout for each page fetch.
    ///
    /// Default: 15s.
    pub fetch_timeout: Duration,

    /// Courtesy delay between search attempts for one name.
    ///
    /// Default: 500ms.
    pub query_delay: Duration,

    /// Candidate names of one record searched concurrently.
    ///
    /// Default: 1 (sequential).
    pub name_concurrency: usize,

    /// Input column names.
    #[serde(default)]
    pub fields: FieldMapping,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            scrape_pages: true,
            max_queries: 5,
            max_emails_per_name: 2,
            results_per_query: 10,
            fetch_timeout: Duration::from_secs(15),
            query_delay: Duration::from_millis(500),
            name_concurrency: 1,
            fields: FieldMapping::default(),
        }
    }
}

impl EnrichmentConfig {
    pub const MAX_QUERIES_LIMIT: usize = 10;
    pub const MAX_EMAILS_LIMIT: usize = 5;
    pub const RESULTS_PER_QUERY_LIMIT: usize = 50;
    pub const FETCH_TIMEOUT_LIMIT: Duration = Duration::from_secs(60);
    pub const NAME_CONCURRENCY_LIMIT: usize = 16;

    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable page scraping.
    pub fn with_scrape_pages(mut self, scrape: bool) -> Self {
        self.scrape_pages = scrape;
        self
    }

    /// Set the per-name search budget.
    pub fn with_max_queries(mut self, max: usize) -> Self {
        self.max_queries = max;
        self
    }

    /// Set the per-name email cap.
    pub fn with_max_emails_per_name(mut self, max: usize) -> Self {
        self.max_emails_per_name = max;
        self
    }

    /// Set hits requested per search.
    pub fn with_results_per_query(mut self, count: usize) -> Self {
        self.results_per_query = count;
        self
    }

    /// Set the page fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the delay between search attempts.
    pub fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = delay;
        self
    }

    /// Search a record's names on a bounded pool of this size.
    pub fn with_name_concurrency(mut self, concurrency: usize) -> Self {
        self.name_concurrency = concurrency;
        self
    }

    /// Override the input column names.
    pub fn with_fields(mut self, fields: FieldMapping) -> Self {
        self.fields = fields;
        self
    }

    /// Reject budgets outside the supported ranges.
    pub fn validate(&self) -> Result<()> {
        check_range("max_queries", self.max_queries, Self::MAX_QUERIES_LIMIT)?;
        check_range(
            "max_emails_per_name",
            self.max_emails_per_name,
            Self::MAX_EMAILS_LIMIT,
        )?;
        check_range(
            "results_per_query",
            self.results_per_query,
            Self::RESULTS_PER_QUERY_LIMIT,
        )?;
        check_range(
            "name_concurrency",
            self.name_concurrency,
            Self::NAME_CONCURRENCY_LIMIT,
        )?;

        if self.fetch_timeout < Duration::from_secs(1) || self.fetch_timeout > Self::FETCH_TIMEOUT_LIMIT {
            return Err(EnrichError::invalid_config(format!(
                "fetch_timeout must be between 1s and {}s, got {:?}",
                Self::FETCH_TIMEOUT_LIMIT.as_secs(),
                self.fetch_timeout
            )));
        }

        if self.fields.owner_fields.iter().all(|f| f.trim().is_empty()) {
            return Err(EnrichError::invalid_config(
                "at least one owner field is required",
            ));
        }

        Ok(())
    }
}

fn check_range(name: &str, value: usize, max: usize) -> Result<()> {
    if value == 0 || value > max {
        return Err(EnrichError::invalid_config(format!(
            "{name} must be between 1 and {max}, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EnrichmentConfig::default();
        assert!(config.scrape_pages);
        assert_eq!(config.max_queries, 5);
        assert_eq!(config.max_emails_per_name, 2);
        assert_eq!(config.results_per_query, 10);
        assert_eq!(config.fetch_timeout, Duration::from_secs(15));
        assert_eq!(config.fields.owner_fields, vec!["Owner 1", "Owner 2"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_budgets() {
        assert!(EnrichmentConfig::new().with_max_queries(0).validate().is_err());
        assert!(EnrichmentConfig::new()
            .with_max_emails_per_name(0)
            .validate()
            .is_err());
        assert!(EnrichmentConfig::new()
            .with_results_per_query(0)
            .validate()
            .is_err());
        assert!(EnrichmentConfig::new()
            .with_name_concurrency(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_rejects_out_of_range() {
        let err = EnrichmentConfig::new()
            .with_max_queries(11)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("max_queries"));

        assert!(EnrichmentConfig::new()
            .with_fetch_timeout(Duration::from_millis(200))
            .validate()
            .is_err());
        assert!(EnrichmentConfig::new()
            .with_fetch_timeout(Duration::from_secs(61))
            .validate()
            .is_err());
    }

    #[test]
    fn test_rejects_missing_owner_fields() {
        let fields = FieldMapping {
            owner_fields: vec![" ".to_string()],
            ..Default::default()
        };
        assert!(EnrichmentConfig::new().with_fields(fields).validate().is_err());
    }
}
