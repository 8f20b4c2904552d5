use crate::config::types::{Config, CrawlerConfig, UserAgentConfig};
use crate::config::validation::{validate, validate_fetch_timeout_ms, validate_workers};
use crate::url::normalize_url;
use crate::CrawlError;
use std::time::Duration;
use url::Url;

/// Everything one crawl run needs to know
///
/// A job is built once, validated, and then shared read-only by every worker
/// for the lifetime of the run.
#[derive(Debug, Clone)]
pub struct CrawlJob {
    /// Normalized seed URL
    pub seed: Url,

    /// Number of concurrent workers
    pub workers: usize,

    /// Maximum number of fetches; `None` means unbounded
    pub max_checked: Option<usize>,

    /// Maximum depth that is still expanded; `None` means unbounded
    pub max_depth: Option<u32>,

    /// Keep discovery on the seed's host
    pub domain_restricted: bool,

    /// Timeout applied to each fetch
    pub fetch_timeout: Duration,

    /// Timeout applied to the whole run
    pub job_timeout: Option<Duration>,

    /// User-Agent header value
    pub user_agent: String,
}

impl CrawlJob {
    /// Creates a job for the seed with default settings
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlJob)` - The seed is a valid absolute HTTP(S) URL
    /// * `Err(CrawlError::InvalidSeed)` - The seed cannot be crawled
    pub fn new(seed: &str) -> Result<Self, CrawlError> {
        Self::from_config(seed, &Config::default())
    }

    /// Creates a job for the seed from a loaded configuration
    pub fn from_config(seed: &str, config: &Config) -> Result<Self, CrawlError> {
        let seed = parse_seed(seed)?;
        validate(config)?;

        Ok(Self::assemble(seed, &config.crawler, &config.user_agent))
    }

    fn assemble(seed: Url, crawler: &CrawlerConfig, user_agent: &UserAgentConfig) -> Self {
        Self {
            seed,
            workers: crawler.workers,
            max_checked: crawler.max_checked,
            max_depth: crawler.max_depth,
            domain_restricted: crawler.domain_restricted,
            fetch_timeout: Duration::from_millis(crawler.fetch_timeout_ms),
            job_timeout: crawler.job_timeout_secs.map(Duration::from_secs),
            user_agent: user_agent.header_value(),
        }
    }

    /// Sets the number of workers
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the fetch cap
    pub fn with_max_checked(mut self, max_checked: Option<usize>) -> Self {
        self.max_checked = max_checked;
        self
    }

    /// Sets the expansion depth limit
    pub fn with_max_depth(mut self, max_depth: Option<u32>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Enables or disables domain restriction
    pub fn with_domain_restricted(mut self, restricted: bool) -> Self {
        self.domain_restricted = restricted;
        self
    }

    /// Sets the per-fetch timeout
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Sets the whole-run timeout
    pub fn with_job_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.job_timeout = timeout;
        self
    }

    /// Re-checks settings that may have been changed through the builders
    pub fn validate(&self) -> Result<(), CrawlError> {
        validate_workers(self.workers)?;
        let timeout_ms = u64::try_from(self.fetch_timeout.as_millis()).unwrap_or(u64::MAX);
        validate_fetch_timeout_ms(timeout_ms)?;

        if self.max_checked == Some(0) {
            return Err(crate::ConfigError::Validation(
                "max_checked must be >= 1 when set".to_string(),
            )
            .into());
        }

        Ok(())
    }

    /// Returns true if the cap allows another fetch after `checked` fetches
    pub fn allows_another_fetch(&self, checked: usize) -> bool {
        self.max_checked.map_or(true, |max| checked < max)
    }

    /// Returns true if links found on a page at `depth` should be followed
    pub fn expands_depth(&self, depth: u32) -> bool {
        self.max_depth.map_or(true, |max| depth < max)
    }
}

/// Validates and normalizes a seed URL
///
/// The seed must be an absolute HTTP(S) URL with a host. Fragments are
/// dropped like for every other crawled URL.
pub fn parse_seed(seed: &str) -> Result<Url, CrawlError> {
    normalize_url(seed).map_err(|source| CrawlError::InvalidSeed {
        url: seed.to_string(),
        source,
    })
}
