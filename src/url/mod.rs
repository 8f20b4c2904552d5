//! URL handling module for Link-Sweep
//!
//! This module provides URL normalization, host extraction and the domain
//! filter used to keep a restricted crawl on the seed's host.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, DomainFilter};
pub use normalize::{normalize_url, resolve_href};
