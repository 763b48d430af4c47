//! Normalizer: turns raw extractor output into canonical `Job`s.
//!
//! Pure and deterministic for a given "today". A malformed record degrades to
//! defaults; only a batch that is not a sequence at all is an error.

pub mod dates;
pub mod tags;

use std::collections::HashSet;

use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::job::{
    Job, DEFAULT_COMPANY, DEFAULT_DESCRIPTION, DEFAULT_LOCATION, DEFAULT_POSTED_DATE,
    DEFAULT_TITLE, NO_LINK,
};
use crate::models::raw::RawRecord;
use crate::normalize::dates::days_ago;
use crate::normalize::tags::{infer_employment_type, infer_tags};

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("raw records from '{source_name}' must be a JSON array, found {found}")]
    NotASequence {
        source_name: String,
        found: &'static str,
    },
}

/// Normalizes one source's raw JSON batch. `today` anchors `daysAgo` for
/// absolute dates; callers pass the current UTC date.
pub fn normalize(raw: &Value, source: &str, today: NaiveDate) -> Result<Vec<Job>, NormalizeError> {
    let items = raw.as_array().ok_or_else(|| NormalizeError::NotASequence {
        source_name: source.to_string(),
        found: json_kind(raw),
    })?;

    let records: Vec<RawRecord> = items.iter().map(RawRecord::from_value).collect();
    Ok(normalize_records(&records, source, today))
}

/// One `Job` per record, in input order.
pub fn normalize_records(records: &[RawRecord], source: &str, today: NaiveDate) -> Vec<Job> {
    let mut ids = IdAllocator::new(source);

    records
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let id = ids.assign(raw.id.as_deref(), index);
            build_job(id, raw, source, today)
        })
        .collect()
}

fn build_job(id: String, raw: &RawRecord, source: &str, today: NaiveDate) -> Job {
    if raw.is_empty() {
        debug!(%source, %id, "raw record carried no usable fields; using defaults");
    }

    let title = raw.title.as_deref().unwrap_or_default();
    let description = raw.description.as_deref().unwrap_or_default();

    Job {
        title: value_or(&raw.title, DEFAULT_TITLE),
        company: value_or(&raw.company, DEFAULT_COMPANY),
        location: value_or(&raw.location, DEFAULT_LOCATION),
        employment_type: infer_employment_type(description),
        posted_date: value_or(&raw.posted_date, DEFAULT_POSTED_DATE),
        days_ago: raw
            .posted_date
            .as_deref()
            .map(|label| days_ago(label, today))
            .unwrap_or(0),
        description: value_or(&raw.description, DEFAULT_DESCRIPTION),
        tags: infer_tags(title, description),
        source: source.to_string(),
        source_url: source_url(raw.url.as_deref(), &id),
        is_bookmarked: false,
        id,
    }
}

fn value_or(field: &Option<String>, default: &str) -> String {
    field.clone().unwrap_or_else(|| default.to_string())
}

fn source_url(url: Option<&str>, id: &str) -> String {
    match url {
        Some(u) if u.starts_with("https://") || u.starts_with("http://") => u.to_string(),
        Some(u) => {
            debug!(%id, url = u, "discarding non-absolute posting url");
            NO_LINK.to_string()
        }
        None => NO_LINK.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Hands out batch-unique ids.
///
/// A supplied id is used verbatim the first time it is seen. A later record
/// repeating it is rejected and gets the positional `source-index` id instead,
/// suffixed until it no longer clashes.
struct IdAllocator<'a> {
    source: &'a str,
    taken: HashSet<String>,
}

impl<'a> IdAllocator<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            taken: HashSet::new(),
        }
    }

    fn assign(&mut self, supplied: Option<&str>, index: usize) -> String {
        if let Some(id) = supplied {
            if self.taken.insert(id.to_string()) {
                return id.to_string();
            }
            warn!(
                source = self.source,
                id, index, "duplicate job id rejected; falling back to positional id"
            );
        }

        let base = format!("{}-{}", self.source, index);
        let mut candidate = base.clone();
        let mut suffix = 1;
        while !self.taken.insert(candidate.clone()) {
            candidate = format!("{base}-{suffix}");
            suffix += 1;
        }
        candidate
    }
}
