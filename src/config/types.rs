use serde::Deserialize;

/// Main configuration structure for Link-Sweep
///
/// Every section is optional; missing values fall back to the defaults of a
/// small, polite crawl.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of concurrent fetch workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Timeout for a single fetch (milliseconds)
    #[serde(rename = "fetch-timeout-ms", default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Maximum number of URLs fetched in one run
    #[serde(rename = "max-checked", default = "default_max_checked")]
    pub max_checked: Option<usize>,

    /// Maximum link distance from the seed that is still expanded
    #[serde(rename = "max-depth", default)]
    pub max_depth: Option<u32>,

    /// Only follow links whose host matches the seed's host
    #[serde(rename = "domain-restricted", default)]
    pub domain_restricted: bool,

    /// Cancel the whole run after this many seconds
    #[serde(rename = "job-timeout-secs", default)]
    pub job_timeout_secs: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            max_checked: default_max_checked(),
            max_depth: None,
            domain_restricted: false,
            job_timeout_secs: None,
        }
    }
}

fn default_workers() -> usize {
    10
}

fn default_fetch_timeout_ms() -> u64 {
    5_000
}

fn default_max_checked() -> Option<usize> {
    Some(100)
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `CrawlerName/Version`
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
        }
    }
}

fn default_crawler_name() -> String {
    "link-sweep".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
