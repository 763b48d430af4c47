//! Raw, source-specific posting data as handed over by an extractor.
//!
//! Every field is optional. Building a `RawRecord` from JSON never fails:
//! wrong-typed or blank fields are treated as absent.

use serde_json::{Map, Value};

const ID_KEYS: &[&str] = &["id"];
const TITLE_KEYS: &[&str] = &["title", "position", "jobTitle"];
const COMPANY_KEYS: &[&str] = &["company"];
const LOCATION_KEYS: &[&str] = &["location"];
const POSTED_DATE_KEYS: &[&str] = &["postedDate", "posted_date", "date"];
const DESCRIPTION_KEYS: &[&str] = &["description"];
const URL_KEYS: &[&str] = &["url", "sourceUrl", "link"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub id: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub posted_date: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

impl RawRecord {
    /// Reads whatever usable fields `value` carries. A non-object yields an
    /// all-absent record.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        Self {
            id: first_id(obj),
            title: first_text(obj, TITLE_KEYS),
            company: first_text(obj, COMPANY_KEYS),
            location: first_text(obj, LOCATION_KEYS),
            posted_date: first_text(obj, POSTED_DATE_KEYS),
            description: first_text(obj, DESCRIPTION_KEYS),
            url: first_text(obj, URL_KEYS),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

// Ids may arrive as numbers from some boards.
fn first_id(obj: &Map<String, Value>) -> Option<String> {
    ID_KEYS.iter().filter_map(|k| obj.get(*k)).find_map(|v| match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
