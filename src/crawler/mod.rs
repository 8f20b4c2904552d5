//! Crawler module for link discovery and checking
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and broken-link classification
//! - HTML parsing and link extraction
//! - The shared work queue
//! - The worker pool that coordinates a run

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{
    find_broken_links, run_crawl, run_crawl_with_cancellation, Crawler, RunState,
};
pub use fetcher::{
    build_http_client, classify_error, classify_status, is_html, BrokenReason, FetchOutcome,
    FetchedPage, HttpFetcher, PageFetcher,
};
pub use parser::extract_links;
pub use scheduler::{Lease, QueuedUrl, Scheduler};

// Re-exported so callers can cancel a run without depending on tokio-util directly
pub use tokio_util::sync::CancellationToken;
