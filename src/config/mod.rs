//! Configuration module for Link-Sweep
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and turning a configuration plus a seed URL into a `CrawlJob`.
//!
//! # Example
//!
//! ```no_run
//! use link_sweep::config::{load_config, CrawlJob};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("link-sweep.toml")).unwrap();
//! let job = CrawlJob::from_config("https://example.com/", &config).unwrap();
//! println!("Crawl will use {} workers", job.workers);
//! ```

mod job;
mod parser;
mod types;
mod validation;

// Re-export types
pub use job::{parse_seed, CrawlJob};
pub use types::{Config, CrawlerConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
