//! Streaming sinks for result rows and progress events.
//!
//! Both methods are synchronous and must not block: a sink that cannot keep
//! up drops or buffers, it never stalls the run.

use std::sync::Arc;

use crate::types::{events::ProgressEvent, result::ResultRow};

/// Observer of an enrichment run.
pub trait ProgressSink: Send + Sync {
    /// Receive a progress notification.
    fn emit_progress(&self, event: &ProgressEvent);

    /// Receive a result row as soon as it is confirmed.
    fn emit_row(&self, _row: &ResultRow) {}
}

impl<T: ProgressSink + ?Sized> ProgressSink for Arc<T> {
    fn emit_progress(&self, event: &ProgressEvent) {
        (**self).emit_progress(event)
    }

    fn emit_row(&self, row: &ResultRow) {
        (**self).emit_row(row)
    }
}
