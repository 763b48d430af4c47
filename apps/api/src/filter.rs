//! Dashboard filter predicate and summary counts over the job collection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::job::Job;

/// Filter set as sent by the dashboard. Empty fields impose no restriction.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobFilters {
    pub keywords: String,
    pub location: String,
    pub source: String,
    /// Maximum `daysAgo`, as entered. Non-numeric values are ignored.
    pub date_range: String,
}

impl JobFilters {
    /// All four conditions must hold.
    pub fn matches(&self, job: &Job) -> bool {
        self.matches_keywords(job)
            && (self.location.is_empty() || job.location.contains(&self.location))
            && (self.source.is_empty() || job.source == self.source)
            && self.max_days().map_or(true, |max| job.days_ago <= max)
    }

    pub fn apply<'a>(&self, jobs: &'a [Job]) -> Vec<&'a Job> {
        jobs.iter().filter(|job| self.matches(job)).collect()
    }

    fn matches_keywords(&self, job: &Job) -> bool {
        if self.keywords.is_empty() {
            return true;
        }
        let haystack = format!(
            "{} {} {} {}",
            job.title,
            job.company,
            job.description,
            job.tags.join(" ")
        )
        .to_lowercase();
        haystack.contains(&self.keywords.to_lowercase())
    }

    fn max_days(&self) -> Option<u32> {
        let range = self.date_range.trim();
        if range.is_empty() {
            return None;
        }
        range.parse().ok()
    }
}

/// Counts shown above the job list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStats {
    pub total: usize,
    pub new_today: usize,
    pub saved: usize,
    pub applied: usize,
    pub by_source: BTreeMap<String, usize>,
}

impl JobStats {
    pub fn compute(jobs: &[Job], saved: usize, applied: usize) -> Self {
        let mut by_source = BTreeMap::new();
        for job in jobs {
            *by_source.entry(job.source.clone()).or_insert(0) += 1;
        }

        Self {
            total: jobs.len(),
            new_today: jobs.iter().filter(|j| j.days_ago == 0).count(),
            saved,
            applied,
            by_source,
        }
    }
}
