use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "Unknown Title";
pub const DEFAULT_COMPANY: &str = "Unknown Company";
pub const DEFAULT_LOCATION: &str = "Unknown Location";
pub const DEFAULT_DESCRIPTION: &str = "No description available";
pub const DEFAULT_POSTED_DATE: &str = "Recently";
/// Marker stored in `source_url` when the posting has no link.
pub const NO_LINK: &str = "#";
pub const GENERAL_TAG: &str = "General";

/// Employment type inferred from a posting's description.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmploymentType {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    Contract,
    Temporary,
    Permanent,
    #[default]
    Unknown,
}

/// Canonical job posting produced by the normalizer.
///
/// Jobs are immutable once written to the collection. Saved/applied state
/// lives in the tracker, keyed by `id`, never in this record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type")]
    pub employment_type: EmploymentType,
    pub posted_date: String,
    pub days_ago: u32,
    pub description: String,
    pub tags: Vec<String>,
    pub source: String,
    pub source_url: String,
    pub is_bookmarked: bool,
}
