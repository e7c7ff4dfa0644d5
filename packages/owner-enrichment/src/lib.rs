//! Owner Contact Enrichment Library
//!
//! Takes tabular property-owner records, works out which owners are real
//! people, searches the open web for each person and collects the contact
//! emails found in search snippets and on the linked pages.
//!
//! # Pipeline
//!
//! ```text
//! InputRecord ─► normalize ─► resolve owners ─┬─► skip (corporate / no owners)
//!                                             └─► per name: DiscoveryLoop
//!                                                    search ─► inspect hit ─► fetch page
//!                                                    extract emails ─► score ─► ResultRow
//! ```
//!
//! Every record ID is checkpointed once attempted, so an interrupted run
//! resumes where it stopped.
//!
//! # Usage
//!
//! ```rust,ignore
//! use owner_enrichment::{BraveWebSearcher, Enricher, EnrichmentConfig, HttpPageFetcher, JsonFileCheckpoint};
//!
//! let enricher = Enricher::new(
//!     Arc::new(BraveWebSearcher::from_env()),
//!     Arc::new(HttpPageFetcher::new()),
//!     EnrichmentConfig::default(),
//! )
//! .with_checkpoint(Arc::new(JsonFileCheckpoint::default()));
//!
//! let summary = enricher.run(records).await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Capability traits (WebSearcher, PageFetcher, CheckpointStore, ProgressSink)
//! - [`types`] - Records, configuration, results and progress events
//! - [`pipeline`] - Owner resolution, email extraction, scoring, discovery and orchestration
//! - [`searchers`] - Brave search client and rate limiting
//! - [`fetchers`] - HTTP page fetcher
//! - [`stores`] - Checkpoint and job stores
//! - [`sinks`] - Progress sinks
//! - [`jobs`] - Background job runner
//! - [`security`] - API key handling
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod fetchers;
pub mod jobs;
pub mod pipeline;
pub mod searchers;
pub mod security;
pub mod sinks;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{EnrichError, FetchError, SearchError, StoreError};
pub use traits::{
    checkpoint::CheckpointStore,
    fetcher::PageFetcher,
    searcher::{SearchHit, WebSearcher},
    sink::ProgressSink,
};
pub use types::{
    config::{EnrichmentConfig, FieldMapping},
    events::{ProgressEvent, SkipReason},
    record::{FieldValue, InputRecord, NormalizedRecord},
    result::{DiscoveredEmail, ResultRow, RunSummary, OUTPUT_COLUMNS},
};

// Re-export pipeline components
pub use pipeline::{
    extract_emails, normalize_url, resolve_owners, score_email, split_owner_names, DiscoveryLoop,
    DiscoveryParams, Enricher, NameOutcome, OwnerResolution,
};

pub use fetchers::HttpPageFetcher;
pub use jobs::{JobHandle, JobRecord, JobRunner, JobStatus, JobStore, JobSummary};
pub use searchers::{BraveWebSearcher, RateLimitedSearcher, SearcherExt};
pub use security::{secret_from_env, SecretString};
pub use sinks::{ChannelSink, CollectingSink, NullSink, SinkMessage, TracingSink};
pub use stores::{JsonFileCheckpoint, MemoryCheckpoint, MemoryJobStore};
