//! Crawl report types
//!
//! The report is produced once per job and handed to the caller; it is
//! never mutated afterwards.

use crate::crawler::BrokenReason;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlStatus {
    /// The work queue drained or the check cap stopped expansion
    Completed,

    /// The run was cancelled; results are partial
    Cancelled,
}

impl fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A URL classified as broken
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenLink {
    /// The broken URL
    pub url: String,

    /// Why it is broken
    pub reason: BrokenReason,
}

/// Final result of a crawl job
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    /// The normalized seed URL
    pub seed: String,

    /// Broken URLs sorted by URL
    pub broken: Vec<BrokenLink>,

    /// Number of fetches performed
    pub checked: usize,

    /// Number of distinct URLs claimed, including the seed
    pub discovered: usize,

    /// Claimed URLs discarded because the check cap was reached
    pub skipped: usize,

    /// How the run ended
    pub status: CrawlStatus,

    /// Wall-clock duration of the run
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Response payload: `{"broken_links": [...]}` plus run details
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    broken_links: Vec<&'a str>,
    #[serde(flatten)]
    report: &'a CrawlReport,
}

impl CrawlReport {
    /// Returns the broken URLs, sorted
    pub fn broken_urls(&self) -> Vec<String> {
        self.broken.iter().map(|b| b.url.clone()).collect()
    }

    /// Returns true if the run was cut short by cancellation
    pub fn is_partial(&self) -> bool {
        self.status == CrawlStatus::Cancelled
    }

    /// Serializes the report as JSON with a top-level `broken_links` list
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let payload = JsonReport {
            broken_links: self.broken.iter().map(|b| b.url.as_str()).collect(),
            report: self,
        };
        serde_json::to_string_pretty(&payload)
    }
}
