//! Saved / applied tracking keyed by job id.
//!
//! State lives in its own JSON file and never touches the job collection.
//! Consumers subscribe explicitly and get a typed event after every change
//! that has been persisted.

use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::store::{write_json_atomic, StoreError};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("failed to read tracker state: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to persist tracker state: {0}")]
    Persist(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppStatus {
    #[default]
    Applied,
    Interview,
    Offer,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationMeta {
    pub status: AppStatus,
    pub date_applied: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default)]
    pub notes: String,
}

/// Fields a caller may set when marking a job applied. Unset fields take
/// defaults: status `applied`, date now, no notes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApplicationUpdate {
    pub status: Option<AppStatus>,
    pub date_applied: Option<DateTime<Utc>>,
    pub source_url: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerState {
    #[serde(default)]
    pub saved: BTreeSet<String>,
    #[serde(default)]
    pub applied: BTreeMap<String, ApplicationMeta>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackerEvent {
    SavedChanged { job_id: String, saved: bool },
    ApplicationChanged { job_id: String, status: AppStatus },
    ApplicationRemoved { job_id: String },
}

pub trait TrackerListener: Send + Sync {
    fn on_change(&self, event: &TrackerEvent);
}

/// Writes every tracker change to the log.
pub struct LogListener;

impl TrackerListener for LogListener {
    fn on_change(&self, event: &TrackerEvent) {
        info!(?event, "tracker state changed");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

pub struct Tracker {
    path: PathBuf,
    state: TrackerState,
    listeners: Vec<(ListenerId, Arc<dyn TrackerListener>)>,
    next_listener: u64,
}

impl Tracker {
    /// Opens the state file. A missing file starts empty; so does a corrupt
    /// one, which is logged and overwritten on the next change.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, TrackerError> {
        let path = path.into();
        let state = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(path = %path.display(), "ignoring unreadable tracker state: {e}");
                TrackerState::default()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => TrackerState::default(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            state,
            listeners: Vec::new(),
            next_listener: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn subscribe(&mut self, listener: Arc<dyn TrackerListener>) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Returns false if `id` was not subscribed.
    #[allow(dead_code)]
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn is_saved(&self, job_id: &str) -> bool {
        self.state.saved.contains(job_id)
    }

    /// Flips the saved flag and returns the new value.
    pub fn toggle_saved(&mut self, job_id: &str) -> Result<bool, TrackerError> {
        let mut next = self.state.clone();
        let saved = if next.saved.remove(job_id) {
            false
        } else {
            next.saved.insert(job_id.to_string())
        };

        self.commit(
            next,
            TrackerEvent::SavedChanged {
                job_id: job_id.to_string(),
                saved,
            },
        )?;
        Ok(saved)
    }

    pub fn application(&self, job_id: &str) -> Option<&ApplicationMeta> {
        self.state.applied.get(job_id)
    }

    pub fn is_applied(&self, job_id: &str) -> bool {
        self.state.applied.contains_key(job_id)
    }

    /// Records (or overwrites) the application for `job_id`.
    pub fn mark_applied(
        &mut self,
        job_id: &str,
        update: ApplicationUpdate,
    ) -> Result<ApplicationMeta, TrackerError> {
        let meta = ApplicationMeta {
            status: update.status.unwrap_or_default(),
            date_applied: update.date_applied.unwrap_or_else(Utc::now),
            source_url: update.source_url,
            notes: update.notes.unwrap_or_default(),
        };

        let mut next = self.state.clone();
        next.applied.insert(job_id.to_string(), meta.clone());

        self.commit(
            next,
            TrackerEvent::ApplicationChanged {
                job_id: job_id.to_string(),
                status: meta.status,
            },
        )?;
        Ok(meta)
    }

    /// Removes the application. Unknown ids are a no-op and notify no one.
    pub fn unapply(&mut self, job_id: &str) -> Result<bool, TrackerError> {
        if !self.is_applied(job_id) {
            return Ok(false);
        }

        let mut next = self.state.clone();
        next.applied.remove(job_id);

        self.commit(
            next,
            TrackerEvent::ApplicationRemoved {
                job_id: job_id.to_string(),
            },
        )?;
        Ok(true)
    }

    // State is swapped in only after the write succeeds.
    fn commit(&mut self, next: TrackerState, event: TrackerEvent) -> Result<(), TrackerError> {
        write_json_atomic(&self.path, &next)?;
        self.state = next;

        for (_, listener) in &self.listeners {
            listener.on_change(&event);
        }
        Ok(())
    }
}
