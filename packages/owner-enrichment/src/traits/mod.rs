//! Core trait abstractions for the enrichment library.
//!
//! These traits define the capabilities the pipeline consumes: web search,
//! page fetching, checkpoint persistence and progress reporting.

pub mod checkpoint;
pub mod fetcher;
pub mod searcher;
pub mod sink;
