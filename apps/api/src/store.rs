//! Aggregation store: the flat JSON file of canonical jobs.
//!
//! Each ingest run replaces the whole file. Writes go to a temp file in the
//! same directory and are renamed into place, so readers see either the old
//! collection or the new one.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::info;

use crate::models::job::Job;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("file not found at {}", .0.display())]
    Missing(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file does not hold the expected JSON: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("failed to encode JSON: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to move temp file into place: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Normalized jobs from one source, ready for merging.
#[derive(Debug, Clone)]
pub struct SourceBatch {
    pub source: String,
    pub jobs: Vec<Job>,
}

/// Concatenates batches in the given order. No cross-source dedup.
pub fn merge(batches: Vec<SourceBatch>) -> Vec<Job> {
    batches.into_iter().flat_map(|b| b.jobs).collect()
}

#[derive(Debug, Clone)]
pub struct JobStore {
    path: PathBuf,
}

impl JobStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the full collection. A missing or unparseable file is an error,
    /// never an empty list.
    pub async fn load(&self) -> Result<Vec<Job>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::Missing(self.path.clone()))
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes).map_err(StoreError::Corrupt)
    }

    /// Atomically replaces the collection with `jobs`.
    pub fn replace(&self, jobs: &[Job]) -> Result<(), StoreError> {
        write_json_atomic(&self.path, jobs)?;

        info!(
            path = %self.path.display(),
            count = jobs.len(),
            "job collection replaced"
        );
        Ok(())
    }
}

/// Writes `value` as pretty JSON to a sibling temp file, then renames it over
/// `path`. Parent directories are created as needed.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, value).map_err(StoreError::Encode)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use chrono::NaiveDate;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 15).unwrap()
    }

    fn batch(source: &str, raw: serde_json::Value) -> SourceBatch {
        SourceBatch {
            source: source.to_string(),
            jobs: normalize(&raw, source, today()).unwrap(),
        }
    }

    #[test]
    fn test_merge_concatenates_in_source_order() {
        let a = batch(
            "civic",
            json!([{ "title": "A0" }, { "title": "A1" }, { "title": "A2" }]),
        );
        let b = batch("remotive", json!([{ "title": "B0" }, { "title": "B1" }]));

        let merged = merge(vec![a, b]);
        let ids: Vec<&str> = merged.iter().map(|j| j.id.as_str()).collect();
        let titles: Vec<&str> = merged.iter().map(|j| j.title.as_str()).collect();

        assert_eq!(merged.len(), 5);
        assert_eq!(
            ids,
            vec!["civic-0", "civic-1", "civic-2", "remotive-0", "remotive-1"]
        );
        assert_eq!(titles, vec!["A0", "A1", "A2", "B0", "B1"]);
    }

    #[test]
    fn test_merge_keeps_cross_source_duplicates() {
        let a = batch("civic", json!([{ "title": "Planner", "company": "City" }]));
        let b = batch("remotive", json!([{ "title": "Planner", "company": "City" }]));
        assert_eq!(merge(vec![a, b]).len(), 2);
    }

    #[tokio::test]
    async fn test_replace_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::new(dir.path().join("nested/data/allJobs.json"));
        let jobs = batch("civic", json!([{ "title": "A" }, { "title": "B" }])).jobs;

        store.replace(&jobs).unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, jobs);
    }

    #[tokio::test]
    async fn test_replace_overwrites_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::new(dir.path().join("allJobs.json"));

        store
            .replace(&batch("civic", json!([{}, {}, {}])).jobs)
            .unwrap();
        store.replace(&batch("civic", json!([{}])).jobs).unwrap();

        assert_eq!(store.load().await.unwrap().len(), 1);
        // Only the collection remains; no temp files are left behind.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::new(dir.path().join("absent.json"));
        assert!(matches!(store.load().await, Err(StoreError::Missing(_))));
    }

    #[tokio::test]
    async fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("allJobs.json");
        std::fs::write(&path, "[{\"id\": ").unwrap();
        let store = JobStore::new(&path);
        assert!(matches!(store.load().await, Err(StoreError::Corrupt(_))));

        std::fs::write(&path, "{\"jobs\": []}").unwrap();
        assert!(matches!(store.load().await, Err(StoreError::Corrupt(_))));
    }
}
