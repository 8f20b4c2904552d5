use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// The port is not part of the result.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use link_sweep::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM:8080/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Decides which discovered URLs are in scope for a crawl
///
/// When restricted, a candidate is in scope only if its host is exactly the
/// seed's host. `www.example.com` and `example.com` are different hosts, and
/// so are subdomains. When unrestricted, everything is in scope.
#[derive(Debug, Clone)]
pub struct DomainFilter {
    /// Host of the seed URL, `None` when restriction is disabled
    reference: Option<String>,
}

impl DomainFilter {
    /// Creates a filter anchored on the seed's host
    ///
    /// A seed without a host cannot anchor anything; such a filter rejects
    /// every candidate in restricted mode.
    pub fn new(seed: &Url, restricted: bool) -> Self {
        let reference = if restricted {
            Some(extract_domain(seed).unwrap_or_default())
        } else {
            None
        };

        Self { reference }
    }

    /// Creates a filter that accepts every URL
    pub fn unrestricted() -> Self {
        Self { reference: None }
    }

    /// Returns true if domain restriction is active
    pub fn is_restricted(&self) -> bool {
        self.reference.is_some()
    }

    /// Returns true if the candidate should be checked
    pub fn is_in_scope(&self, candidate: &Url) -> bool {
        match &self.reference {
            None => true,
            Some(reference) => match extract_domain(candidate) {
                Some(host) => !reference.is_empty() && host == *reference,
                None => false,
            },
        }
    }
}
