//! Checkpoint persistence trait.
//!
//! A checkpoint is the set of record IDs already handled. Once an ID is in
//! the set it is never processed again, including records that produced no
//! owners or no emails.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::StoreResult;

/// Load/save capability for the processed-ID set.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Load the processed set. A missing checkpoint is an empty set.
    async fn load(&self) -> StoreResult<HashSet<String>>;

    /// Persist the full processed set.
    async fn save(&self, processed: &HashSet<String>) -> StoreResult<()>;
}

#[async_trait]
impl<T: CheckpointStore + ?Sized> CheckpointStore for Arc<T> {
    async fn load(&self) -> StoreResult<HashSet<String>> {
        (**self).load().await
    }

    async fn save(&self, processed: &HashSet<String>) -> StoreResult<()> {
        (**self).save(processed).await
    }
}
