//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests used both as health check and to fetch page content
//! - Error classification into healthy and broken outcomes

use async_trait::async_trait;
use reqwest::{header, redirect::Policy, Client, StatusCode};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed before a link counts as broken
pub const MAX_REDIRECTS: usize = 10;

/// Why a URL was classified as broken
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BrokenReason {
    /// The server answered with a non-success status
    BadStatus { status: u16 },

    /// Connection refused, DNS failure, TLS failure, redirect loop, ...
    Network { message: String },

    /// The fetch did not finish within its timeout
    Timeout,
}

impl fmt::Display for BrokenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadStatus { status } => write!(f, "HTTP {}", status),
            Self::Network { message } => write!(f, "network error: {}", message),
            Self::Timeout => write!(f, "timed out"),
        }
    }
}

/// Health classification of a single fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Success status (2xx, or a 3xx that was not followed further)
    Healthy { status: u16 },

    /// The URL is broken
    Broken(BrokenReason),
}

impl FetchOutcome {
    /// Returns true if the URL is healthy
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy { .. })
    }

    /// Returns the broken reason, if any
    pub fn broken_reason(&self) -> Option<&BrokenReason> {
        match self {
            Self::Broken(reason) => Some(reason),
            Self::Healthy { .. } => None,
        }
    }
}

/// Result of a fetch operation
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Health classification
    pub outcome: FetchOutcome,

    /// Final URL after redirects
    pub final_url: Option<Url>,

    /// HTML body, present only for healthy HTML responses
    pub body: Option<String>,
}

impl FetchedPage {
    /// A healthy response with an optional HTML body
    pub fn healthy(status: u16, final_url: Url, body: Option<String>) -> Self {
        Self {
            outcome: FetchOutcome::Healthy { status },
            final_url: Some(final_url),
            body,
        }
    }

    /// A broken URL
    pub fn broken(reason: BrokenReason) -> Self {
        Self {
            outcome: FetchOutcome::Broken(reason),
            final_url: None,
            body: None,
        }
    }
}

/// Anything that can check a URL
///
/// Implementations must never panic on network failures: every failure is
/// reported as a broken outcome.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches a URL, giving up after `timeout`
    async fn fetch(&self, url: &Url, timeout: Duration) -> FetchedPage;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - Value of the User-Agent header
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// `PageFetcher` backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with its own client
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        Ok(Self::from_client(build_http_client(user_agent)?))
    }

    /// Wraps an existing client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    /// Fetches a URL with a GET request
    ///
    /// # Classification
    ///
    /// | Condition | Outcome |
    /// |-----------|---------|
    /// | 2xx | Healthy |
    /// | 3xx left unfollowed | Healthy |
    /// | 4xx / 5xx | Broken(BadStatus) |
    /// | Timeout | Broken(Timeout) |
    /// | Connection refused, DNS, TLS | Broken(Network) |
    /// | Redirect chain > 10 | Broken(Network) |
    /// | Body read failure | Broken(Network) |
    async fn fetch(&self, url: &Url, timeout: Duration) -> FetchedPage {
        let response = match self.client.get(url.clone()).timeout(timeout).send().await {
            Ok(response) => response,
            Err(e) => return FetchedPage::broken(classify_error(&e)),
        };

        let status = response.status();
        let final_url = response.url().clone();

        if let FetchOutcome::Broken(reason) = classify_status(status) {
            return FetchedPage::broken(reason);
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if !is_html(content_type.as_deref()) {
            tracing::trace!("Not expanding {}: content type {:?}", final_url, content_type);
            return FetchedPage::healthy(status.as_u16(), final_url, None);
        }

        match response.text().await {
            Ok(body) => FetchedPage::healthy(status.as_u16(), final_url, Some(body)),
            Err(e) => FetchedPage::broken(classify_error(&e)),
        }
    }
}

/// Maps a terminal status code to an outcome
pub fn classify_status(status: StatusCode) -> FetchOutcome {
    if status.is_success() || status.is_redirection() {
        FetchOutcome::Healthy {
            status: status.as_u16(),
        }
    } else {
        FetchOutcome::Broken(BrokenReason::BadStatus {
            status: status.as_u16(),
        })
    }
}

/// Maps a transport error to a broken reason
pub fn classify_error(error: &reqwest::Error) -> BrokenReason {
    if error.is_timeout() {
        BrokenReason::Timeout
    } else if error.is_connect() {
        BrokenReason::Network {
            message: format!("connection failed: {}", root_cause(error)),
        }
    } else if error.is_redirect() {
        BrokenReason::Network {
            message: "too many redirects".to_string(),
        }
    } else {
        BrokenReason::Network {
            message: root_cause(error),
        }
    }
}

fn root_cause(error: &(dyn std::error::Error + 'static)) -> String {
    let mut current = error;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}

/// Returns true if a response with this Content-Type may contain links
///
/// A missing header is treated as HTML.
pub fn is_html(content_type: Option<&str>) -> bool {
    match content_type {
        None => true,
        Some(value) => {
            let value = value.to_ascii_lowercase();
            value.contains("text/html") || value.contains("application/xhtml+xml")
        }
    }
}
