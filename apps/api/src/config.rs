use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

/// A raw extractor output file and the source name its jobs are filed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub name: String,
    pub path: PathBuf,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub jobs_file: PathBuf,
    pub tracker_file: PathBuf,
    /// Merge order of the persisted collection.
    pub sources: Vec<SourceConfig>,
    /// Optional. Without it the AI endpoints answer with a failure result.
    pub anthropic_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            jobs_file: env_or("JOBS_FILE", "public/data/allJobs.json").into(),
            tracker_file: env_or("TRACKER_FILE", "data/tracker.json").into(),
            sources: parse_sources(&std::env::var("RAW_SOURCES").unwrap_or_default())
                .context("RAW_SOURCES must be ';'-separated Name=path pairs")?,
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parses `Name=path;Name2=path2`. Order is preserved; names must be unique.
pub fn parse_sources(raw: &str) -> Result<Vec<SourceConfig>> {
    let mut seen = HashSet::new();
    let mut sources = Vec::new();

    for pair in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((name, path)) = pair.split_once('=') else {
            bail!("'{pair}' is missing '='");
        };
        let (name, path) = (name.trim(), path.trim());
        if name.is_empty() || path.is_empty() {
            bail!("'{pair}' needs both a source name and a path");
        }
        if !seen.insert(name.to_string()) {
            bail!("source '{name}' is listed more than once");
        }
        sources.push(SourceConfig {
            name: name.to_string(),
            path: PathBuf::from(path),
        });
    }

    Ok(sources)
}
