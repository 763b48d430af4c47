//! Ingest run: raw extractor files → normalized, merged, persisted collection.
//!
//! All sources are read and normalized before anything is written. One bad
//! source aborts the run and the previous collection stays in place.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, info_span};
use uuid::Uuid;

use crate::config::SourceConfig;
use crate::normalize::{normalize, NormalizeError};
use crate::store::{merge, JobStore, SourceBatch, StoreError};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("no raw sources configured")]
    NoSources,

    #[error("failed to read raw records for '{name}' from {}: {err}", .path.display())]
    Read {
        name: String,
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    #[error("raw records for '{name}' are not valid JSON: {err}")]
    Parse {
        name: String,
        #[source]
        err: serde_json::Error,
    },

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceCount {
    pub source: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub run_id: Uuid,
    pub sources: Vec<SourceCount>,
    pub total: usize,
    pub output: PathBuf,
}

pub fn run_ingest(
    sources: &[SourceConfig],
    store: &JobStore,
    today: NaiveDate,
) -> Result<IngestReport, IngestError> {
    if sources.is_empty() {
        return Err(IngestError::NoSources);
    }

    let run_id = Uuid::new_v4();
    let _span = info_span!("ingest", %run_id).entered();

    let batches = sources
        .iter()
        .map(|source| load_batch(source, today))
        .collect::<Result<Vec<_>, _>>()?;

    let counts: Vec<SourceCount> = batches
        .iter()
        .map(|b| SourceCount {
            source: b.source.clone(),
            count: b.jobs.len(),
        })
        .collect();

    let jobs = merge(batches);
    store.replace(&jobs)?;

    info!(total = jobs.len(), "ingest run complete");

    Ok(IngestReport {
        run_id,
        sources: counts,
        total: jobs.len(),
        output: store.path().to_path_buf(),
    })
}

fn load_batch(source: &SourceConfig, today: NaiveDate) -> Result<SourceBatch, IngestError> {
    let text = std::fs::read_to_string(&source.path).map_err(|err| IngestError::Read {
        name: source.name.clone(),
        path: source.path.clone(),
        err,
    })?;

    let raw: serde_json::Value =
        serde_json::from_str(&text).map_err(|err| IngestError::Parse {
            name: source.name.clone(),
            err,
        })?;

    let jobs = normalize(&raw, &source.name, today)?;
    info!(source = %source.name, count = jobs.len(), "normalized source");

    Ok(SourceBatch {
        source: source.name.clone(),
        jobs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 15).unwrap()
    }

    fn write_source(dir: &Path, name: &str, body: &str) -> SourceConfig {
        let path = dir.join(format!("{name}.json"));
        std::fs::write(&path, body).unwrap();
        SourceConfig {
            name: name.to_string(),
            path,
        }
    }

    #[tokio::test]
    async fn test_ingest_merges_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let sources = vec![
            write_source(
                dir.path(),
                "civic",
                r#"[{"position": "Planner", "postedDate": "yesterday"}, {"position": "Clerk"}]"#,
            ),
            write_source(dir.path(), "remotive", r#"[{"title": "Rust Developer"}]"#),
        ];
        let store = JobStore::new(dir.path().join("out/allJobs.json"));

        let report = run_ingest(&sources, &store, today()).unwrap();
        assert_eq!(report.total, 3);
        assert_eq!(report.sources[0].source, "civic");
        assert_eq!(report.sources[0].count, 2);
        assert_eq!(report.sources[1].count, 1);

        let jobs = store.load().await.unwrap();
        let ids: Vec<&str> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["civic-0", "civic-1", "remotive-0"]);
        assert_eq!(jobs[0].days_ago, 1);
        assert_eq!(jobs[2].tags, vec!["Development"]);
    }

    #[tokio::test]
    async fn test_bad_source_aborts_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::new(dir.path().join("allJobs.json"));
        store.replace(&[]).unwrap();

        let sources = vec![
            write_source(dir.path(), "civic", r#"[{"title": "Planner"}]"#),
            write_source(dir.path(), "remotive", r#"{"not": "an array"}"#),
        ];
        let err = run_ingest(&sources, &store, today()).unwrap_err();
        assert!(matches!(err, IngestError::Normalize(_)));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[test]
    fn test_missing_source_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::new(dir.path().join("allJobs.json"));
        let sources = vec![SourceConfig {
            name: "civic".to_string(),
            path: dir.path().join("nope.json"),
        }];
        assert!(matches!(
            run_ingest(&sources, &store, today()),
            Err(IngestError::Read { .. })
        ));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_invalid_json_source() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::new(dir.path().join("allJobs.json"));
        let sources = vec![write_source(dir.path(), "civic", "[{")];
        assert!(matches!(
            run_ingest(&sources, &store, today()),
            Err(IngestError::Parse { .. })
        ));
    }

    #[test]
    fn test_no_sources() {
        let store = JobStore::new("unused.json");
        assert!(matches!(
            run_ingest(&[], &store, today()),
            Err(IngestError::NoSources)
        ));
    }
}
