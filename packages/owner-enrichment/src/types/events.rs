//! Progress events emitted while a run is in flight.
//!
//! Events are advisory. Sinks may drop them; the pipeline never waits on them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a record produced no searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Checkpointed by a previous run.
    AlreadyProcessed,
    /// Corporate flag was truthy.
    Corporate,
    /// No person names after splitting and trust filtering.
    NoOwners,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyProcessed => f.write_str("already processed"),
            Self::Corporate => f.write_str("corporate owner"),
            Self::NoOwners => f.write_str("no owners"),
        }
    }
}

/// A progress notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    RecordStarted {
        record_id: String,
        names: Vec<String>,
    },
    RecordSkipped {
        record_id: String,
        reason: SkipReason,
    },
    NameSearching {
        record_id: String,
        name: String,
        attempt: usize,
    },
    SearchFailed {
        name: String,
        attempt: usize,
        error: String,
    },
    HitInspected {
        name: String,
        url: String,
        snippet_emails: usize,
        page_emails: usize,
    },
    EmailFound {
        record_id: String,
        name: String,
        email: String,
        source: String,
    },
    NameSummary {
        record_id: String,
        name: String,
        emails: usize,
        attempts: usize,
    },
    RecordDone {
        record_id: String,
        emails: usize,
    },
    CheckpointSaveFailed {
        record_id: String,
        error: String,
    },
    RunFinished {
        total_records: usize,
        total_emails_found: usize,
        cancelled: bool,
    },
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RecordStarted { record_id, names } => {
                write!(f, "Parsed owners for record {record_id}: {names:?}")
            }
            Self::RecordSkipped { record_id, reason } => {
                write!(f, "Skipping record {record_id} ({reason})")
            }
            Self::NameSearching {
                record_id,
                name,
                attempt,
            } => write!(f, "Searching for {name} (record {record_id}, attempt {attempt})"),
            Self::SearchFailed {
                name,
                attempt,
                error,
            } => write!(f, "  search failed for {name} (attempt {attempt}): {error}"),
            Self::HitInspected {
                url,
                snippet_emails,
                page_emails,
                ..
            } => write!(
                f,
                "  - result: {url} ({snippet_emails} in snippet, {page_emails} new on page)"
            ),
            Self::EmailFound { email, source, .. } => {
                write!(f, "    found email: {email} ({source})")
            }
            Self::NameSummary { name, emails, .. } => {
                write!(f, "  -> Collected {emails} emails for {name}")
            }
            Self::RecordDone { record_id, emails } => {
                write!(f, "Record {record_id} done, {emails} emails")
            }
            Self::CheckpointSaveFailed { record_id, error } => {
                write!(f, "WARNING: checkpoint save failed after {record_id}: {error}")
            }
            Self::RunFinished {
                total_records,
                total_emails_found,
                cancelled,
            } => {
                write!(
                    f,
                    "Processed {total_records} records, found {total_emails_found} emails in total."
                )?;
                if *cancelled {
                    f.write_str(" (cancelled)")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_tag() {
        let event = ProgressEvent::RecordSkipped {
            record_id: "1".into(),
            reason: SkipReason::Corporate,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "record_skipped");
        assert_eq!(json["reason"], "corporate");
    }

    #[test]
    fn test_run_finished_display() {
        let event = ProgressEvent::RunFinished {
            total_records: 3,
            total_emails_found: 2,
            cancelled: true,
        };
        assert_eq!(
            event.to_string(),
            "Processed 3 records, found 2 emails in total. (cancelled)"
        );
    }
}
