//! Data models for scraping-run reports.
//!
//! A [`Report`] is produced by the scraping pipeline once per run and handed
//! to the notifier. The notifier only reads it; how the counts were derived
//! is not its concern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use tracing::{info, instrument};

/// Saved-article count for one news source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceResult {
    /// Display name of the source (e.g. `"oxu.az"`).
    pub name: String,
    /// Articles saved to the database during this run.
    pub saved: u64,
}

/// Statistics of a single scraping run.
///
/// # JSON shape
///
/// ```json
/// {
///   "start_time": "2026-10-19T06:00:00Z",
///   "end_time": "2026-10-19T06:02:05Z",
///   "sources": [{ "name": "oxu.az", "saved": 12 }],
///   "total_saved": 12,
///   "narrative": "<b>Rates</b> held steady…",
///   "errors": ["report.az: timeout"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Report {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub sources: Vec<SourceResult>,
    pub total_saved: u64,
    /// Session summary written by the summarizer; may contain HTML markup.
    #[serde(default, alias = "session_summary")]
    pub narrative: Option<String>,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
    /// Articles discovered across all sources.
    #[serde(default)]
    pub total_found: Option<u64>,
    /// Articles successfully scraped, excluding duplicates.
    #[serde(default)]
    pub total_scraped: Option<u64>,
    /// Duplicates skipped.
    #[serde(default)]
    pub total_skipped: Option<u64>,
}

impl Report {
    /// Narrative text, if present and not just whitespace.
    pub fn narrative(&self) -> Option<&str> {
        self.narrative
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }

    pub fn errors(&self) -> &[String] {
        self.errors.as_deref().unwrap_or_default()
    }

    /// Run length in seconds; negative if the timestamps are swapped.
    pub fn duration_secs(&self) -> f64 {
        (self.end_time - self.start_time).num_milliseconds() as f64 / 1000.0
    }
}

/// Load a report from a JSON or YAML file, picked by extension.
///
/// Files ending in `.yaml` or `.yml` are parsed as YAML; anything else as JSON.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub async fn load_report(path: impl AsRef<Path>) -> Result<Report, Box<dyn Error>> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path).await?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let report: Report = if is_yaml {
        serde_yaml::from_str(&raw)?
    } else {
        serde_json::from_str(&raw)?
    };

    info!(
        sources = report.sources.len(),
        total_saved = report.total_saved,
        errors = report.errors().len(),
        "Loaded report"
    );
    Ok(report)
}
