//! Storage implementations for checkpoints and jobs.
//!
//! Available backends:
//! - `MemoryCheckpoint` - In-memory processed set
//! - `JsonFileCheckpoint` - JSON file on disk, survives restarts
//! - `MemoryJobStore` - In-memory job state and history

pub mod file;
pub mod memory;

pub use file::JsonFileCheckpoint;
pub use memory::{MemoryCheckpoint, MemoryJobStore};
