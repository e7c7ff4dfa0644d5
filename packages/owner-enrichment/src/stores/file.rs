//! JSON file checkpoint.
//!
//! The file holds a flat JSON array of processed record IDs. Numeric IDs
//! written by other tools are accepted and read back as strings.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::StoreResult;
use crate::traits::checkpoint::CheckpointStore;

/// Default checkpoint location relative to the working directory.
pub const DEFAULT_CHECKPOINT_PATH: &str = "data/checkpoints/processed.json";

/// Processed set persisted as a JSON array.
///
/// Saves write a sibling temp file and rename it over the target, so a
/// crash mid-save leaves the previous checkpoint intact.
#[derive(Debug, Clone)]
pub struct JsonFileCheckpoint {
    path: PathBuf,
}

impl JsonFileCheckpoint {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Default for JsonFileCheckpoint {
    fn default() -> Self {
        Self::new(DEFAULT_CHECKPOINT_PATH)
    }
}

/// Stringify one checkpoint entry.
fn id_from_value(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[async_trait]
impl CheckpointStore for JsonFileCheckpoint {
    async fn load(&self) -> StoreResult<HashSet<String>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No checkpoint file yet");
                return Ok(HashSet::new());
            }
            Err(e) => return Err(e.into()),
        };

        let values: Vec<Value> = serde_json::from_slice(&bytes)?;
        let processed: HashSet<String> = values.into_iter().filter_map(id_from_value).collect();
        debug!(path = %self.path.display(), count = processed.len(), "Checkpoint loaded");
        Ok(processed)
    }

    async fn save(&self, processed: &HashSet<String>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut ids: Vec<&String> = processed.iter().collect();
        ids.sort();
        let json = serde_json::to_vec(&ids)?;

        let temp = self.temp_path();
        tokio::fs::write(&temp, json).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileCheckpoint::new(dir.path().join("processed.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_creates_parents_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/checkpoints/processed.json");
        let store = JsonFileCheckpoint::new(&path);

        let processed: HashSet<String> = ["b", "a"].into_iter().map(String::from).collect();
        store.save(&processed).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"["a","b"]"#);
        assert_eq!(store.load().await.unwrap(), processed);
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn test_numeric_ids_read_as_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed.json");
        std::fs::write(&path, r#"[12, "13", 14.5, null]"#).unwrap();

        let loaded = JsonFileCheckpoint::new(&path).load().await.unwrap();
        assert_eq!(loaded.len(), 3);
        assert!(loaded.contains("12"));
        assert!(loaded.contains("13"));
        assert!(loaded.contains("14.5"));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed.json");
        std::fs::write(&path, "not json").unwrap();

        let err = JsonFileCheckpoint::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StoreError::Json(_)));
    }
}
