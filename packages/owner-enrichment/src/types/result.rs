//! Output rows and run summaries.

use serde::{Deserialize, Serialize};

/// Column order when result rows are materialized as a table.
pub const OUTPUT_COLUMNS: [&str; 6] = ["input_id", "name", "email", "confidence", "source", "snippet"];

/// An email discovered for a candidate name, before the record ID is attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredEmail {
    pub name: String,
    pub email: String,
    /// Plausibility in `[0.0, 1.0]`.
    pub confidence: f64,
    /// URL of the search hit the email was attributed to.
    pub source: String,
    /// Snippet of the search hit.
    pub snippet: String,
}

impl DiscoveredEmail {
    /// Attach the owning record ID.
    pub fn into_row(self, input_id: impl Into<String>) -> ResultRow {
        ResultRow {
            input_id: input_id.into(),
            name: self.name,
            email: self.email,
            confidence: self.confidence,
            source: self.source,
            snippet: self.snippet,
        }
    }
}

/// One confirmed (record, name, email) triple.
///
/// Field order matches [`OUTPUT_COLUMNS`], so serializing with `csv` or
/// `serde_json` yields the stable output schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub input_id: String,
    pub name: String,
    pub email: String,
    pub confidence: f64,
    pub source: String,
    pub snippet: String,
}

/// Aggregate outcome of one enrichment run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub rows: Vec<ResultRow>,
    pub total_records: usize,
    pub total_emails_found: usize,
    /// The run stopped at a record boundary because it was cancelled.
    #[serde(default)]
    pub cancelled: bool,
}

impl RunSummary {
    /// Distinct emails across all rows.
    pub fn distinct_emails(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.email.as_str())
            .collect::<std::collections::HashSet<_>>()
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_serializes_in_column_order() {
        let row = DiscoveredEmail {
            name: "John Smith".into(),
            email: "john@example.com".into(),
            confidence: 0.7,
            source: "https://example.com".into(),
            snippet: "Contact john@example.com".into(),
        }
        .into_row("1");

        let json = serde_json::to_string(&row).unwrap();
        let positions: Vec<usize> = OUTPUT_COLUMNS
            .iter()
            .map(|c| json.find(&format!("\"{c}\"")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_distinct_emails() {
        let row = |email: &str| ResultRow {
            input_id: "1".into(),
            name: "A".into(),
            email: email.into(),
            confidence: 0.5,
            source: String::new(),
            snippet: String::new(),
        };
        let summary = RunSummary {
            rows: vec![row("a@x.com"), row("b@x.com"), row("a@x.com")],
            total_records: 1,
            total_emails_found: 3,
            cancelled: false,
        };
        assert_eq!(summary.distinct_emails(), 2);
    }
}
