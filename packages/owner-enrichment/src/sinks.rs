//! Progress sink implementations.

use std::sync::RwLock;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::traits::sink::ProgressSink;
use crate::types::{events::ProgressEvent, result::ResultRow};

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit_progress(&self, _event: &ProgressEvent) {}
}

/// Renders events as structured log lines.
///
/// Per-hit chatter goes to `debug`, record and name milestones to `info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn emit_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::RecordStarted { record_id, names } => {
                info!(record_id = %record_id, names = ?names, "Record started");
            }
            ProgressEvent::RecordSkipped { record_id, reason } => {
                info!(record_id = %record_id, reason = %reason, "Record skipped");
            }
            ProgressEvent::NameSearching {
                record_id,
                name,
                attempt,
            } => {
                debug!(record_id = %record_id, name = %name, attempt, "Searching");
            }
            ProgressEvent::SearchFailed { .. } | ProgressEvent::HitInspected { .. } => {
                debug!("{event}");
            }
            ProgressEvent::EmailFound {
                record_id,
                name,
                email,
                source,
            } => {
                info!(record_id = %record_id, name = %name, email = %email, source = %source, "Email found");
            }
            ProgressEvent::NameSummary {
                name,
                emails,
                attempts,
                ..
            } => {
                info!(name = %name, emails, attempts, "Name done");
            }
            ProgressEvent::RecordDone { record_id, emails } => {
                info!(record_id = %record_id, emails, "Record done");
            }
            ProgressEvent::CheckpointSaveFailed { record_id, error } => {
                warn!(record_id = %record_id, error = %error, "Checkpoint save failed, continuing with in-memory state");
            }
            ProgressEvent::RunFinished {
                total_records,
                total_emails_found,
                cancelled,
            } => {
                info!(total_records, total_emails_found, cancelled, "Run finished");
            }
        }
    }
}

/// Records everything it receives. Useful in tests.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: RwLock<Vec<ProgressEvent>>,
    rows: RwLock<Vec<ResultRow>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far.
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.read().unwrap().clone()
    }

    /// Rows received so far.
    pub fn rows(&self) -> Vec<ResultRow> {
        self.rows.read().unwrap().clone()
    }
}

impl ProgressSink for CollectingSink {
    fn emit_progress(&self, event: &ProgressEvent) {
        self.events.write().unwrap().push(event.clone());
    }

    fn emit_row(&self, row: &ResultRow) {
        self.rows.write().unwrap().push(row.clone());
    }
}

/// A message delivered by [`ChannelSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum SinkMessage {
    Progress(ProgressEvent),
    Row(ResultRow),
}

/// Forwards events over a bounded channel.
///
/// Uses `try_send`: when the consumer falls behind, messages are dropped
/// rather than stalling the run.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<SinkMessage>,
}

impl ChannelSink {
    /// Create a sink and its receiving end.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<SinkMessage>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    fn send(&self, message: SinkMessage) {
        if let Err(e) = self.tx.try_send(message) {
            debug!(error = %e, "Progress consumer lagging, dropping message");
        }
    }
}

impl ProgressSink for ChannelSink {
    fn emit_progress(&self, event: &ProgressEvent) {
        self.send(SinkMessage::Progress(event.clone()));
    }

    fn emit_row(&self, row: &ResultRow) {
        self.send(SinkMessage::Row(row.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn done(id: &str) -> ProgressEvent {
        ProgressEvent::RecordDone {
            record_id: id.to_string(),
            emails: 0,
        }
    }

    #[test]
    fn test_collecting_sink_records_in_order() {
        let sink = CollectingSink::new();
        sink.emit_progress(&done("1"));
        sink.emit_progress(&done("2"));
        assert_eq!(sink.events(), vec![done("1"), done("2")]);
        assert!(sink.rows().is_empty());
    }

    #[tokio::test]
    async fn test_channel_sink_drops_when_full() {
        let (sink, mut rx) = ChannelSink::new(1);
        sink.emit_progress(&done("1"));
        sink.emit_progress(&done("2"));

        assert_eq!(rx.recv().await, Some(SinkMessage::Progress(done("1"))));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_channel_sink_survives_closed_receiver() {
        let (sink, rx) = ChannelSink::new(4);
        drop(rx);
        sink.emit_progress(&done("1"));
    }
}
