//! Web searcher implementations.

pub mod brave;
pub mod rate_limited;

pub use brave::BraveWebSearcher;
pub use rate_limited::{RateLimitedSearcher, SearcherExt};
