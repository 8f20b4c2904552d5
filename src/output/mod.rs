//! Output module for crawl results
//!
//! This module handles:
//! - Collecting broken links while a crawl runs
//! - The final report handed back to the caller
//! - Rendering reports as text or JSON

mod aggregator;
mod report;

pub use aggregator::BrokenLinks;
pub use report::{BrokenLink, CrawlReport, CrawlStatus};

use std::io::Write;

/// Report rendering formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,

    /// JSON payload with a top-level `broken_links` list
    Json,
}

/// Writes a report in the requested format
///
/// # Arguments
///
/// * `report` - The report to render
/// * `format` - Text or JSON
/// * `out` - Destination, usually stdout
pub fn write_report<W: Write>(
    report: &CrawlReport,
    format: OutputFormat,
    out: &mut W,
) -> std::io::Result<()> {
    match format {
        OutputFormat::Json => {
            let json = report.to_json().map_err(std::io::Error::other)?;
            writeln!(out, "{}", json)
        }
        OutputFormat::Text => write_text(report, out),
    }
}

fn write_text<W: Write>(report: &CrawlReport, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "=== Link Sweep: {} ===\n", report.seed)?;

    writeln!(out, "Overview:")?;
    writeln!(out, "  Status: {}", report.status)?;
    writeln!(out, "  URLs discovered: {}", report.discovered)?;
    writeln!(out, "  URLs checked: {}", report.checked)?;
    if report.skipped > 0 {
        writeln!(out, "  Skipped (check cap reached): {}", report.skipped)?;
    }
    writeln!(out, "  Elapsed: {:.2}s", report.elapsed.as_secs_f64())?;
    writeln!(out)?;

    if report.broken.is_empty() {
        writeln!(out, "No broken links found")?;
        return Ok(());
    }

    writeln!(out, "Broken links ({}):", report.broken.len())?;
    for link in &report.broken {
        writeln!(out, "  {} ({})", link.url, link.reason)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::BrokenReason;
    use std::time::Duration;

    fn report(broken: Vec<BrokenLink>) -> CrawlReport {
        CrawlReport {
            seed: "https://example.com/".to_string(),
            broken,
            checked: 3,
            discovered: 3,
            skipped: 0,
            status: CrawlStatus::Completed,
            elapsed: Duration::from_millis(500),
        }
    }

    #[test]
    fn test_text_lists_broken_links() {
        let report = report(vec![BrokenLink {
            url: "https://example.com/b".to_string(),
            reason: BrokenReason::BadStatus { status: 404 },
        }]);

        let mut out = Vec::new();
        write_report(&report, OutputFormat::Text, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Broken links (1):"));
        assert!(text.contains("https://example.com/b (HTTP 404)"));
        assert!(text.contains("URLs checked: 3"));
    }

    #[test]
    fn test_text_without_broken_links() {
        let mut out = Vec::new();
        write_report(&report(vec![]), OutputFormat::Text, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("No broken links found"));
    }

    #[test]
    fn test_json_output_parses() {
        let mut out = Vec::new();
        write_report(&report(vec![]), OutputFormat::Json, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["broken_links"], serde_json::json!([]));
    }
}
