//! Link-Sweep: a concurrent broken-link finder
//!
//! This crate crawls a website from a seed URL, checks every link it discovers
//! with a bounded pool of workers, and reports the links that are unreachable
//! or answer with a non-success status.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for crawl jobs
///
/// Only job-level failures surface here. A link that cannot be fetched is not
/// an error; it is recorded in the report as a broken link.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Invalid seed URL '{url}': {source}")]
    InvalidSeed { url: String, source: UrlError },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Crawler has already been started")]
    AlreadyStarted,

    #[error("Crawl worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl CrawlError {
    /// Returns true if the job was rejected because of caller input
    ///
    /// Callers exposing the crawler over a request/response transport map
    /// these to a client error and everything else to a server error.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidSeed { .. } | Self::Config(_))
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(#[from] ::url::ParseError),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

// Re-export commonly used types
pub use config::{CrawlJob, CrawlerConfig};
pub use crawler::{find_broken_links, run_crawl, run_crawl_with_cancellation, Crawler};
pub use output::{BrokenLink, CrawlReport, CrawlStatus};
pub use state::{VisitState, VisitedSet};
pub use self::url::{extract_domain, normalize_url, DomainFilter};
