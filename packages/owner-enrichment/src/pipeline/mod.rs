//! Enrichment pipeline - the core of the library.
//!
//! The pipeline orchestrates:
//! - Owner resolution (record → candidate person names)
//! - Discovery (search → inspect hit → scrape page → collect emails)
//! - Email extraction and confidence scoring
//! - Checkpointed iteration over all records

pub mod confidence;
pub mod discovery;
pub mod emails;
pub mod enrich;
pub mod owners;

pub use confidence::{score_email, BASELINE_CONFIDENCE, TOKEN_MATCH_BONUS};
pub use discovery::{normalize_url, DiscoveryLoop, DiscoveryParams, NameOutcome, SEARCH_TIMEOUT};
pub use emails::extract_emails;
pub use enrich::Enricher;
pub use owners::{is_trust, resolve_owners, split_owner_names, OwnerResolution};
