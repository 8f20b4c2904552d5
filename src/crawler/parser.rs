//! HTML parser for extracting links
//!
//! Only anchor elements are considered. Parsing is lenient: a body that is
//! not valid HTML simply yields fewer (or no) links.

use crate::url::resolve_href;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts the absolute link targets of every `<a href>` in a page
///
/// # Link Extraction Rules
///
/// - Relative hrefs are resolved against the page URL, or against the
///   document's `<base href>` when one is present
/// - Anchors without `href` are ignored
/// - Empty, fragment-only, `javascript:`, `mailto:`, `tel:` and `data:`
///   hrefs are skipped, as is anything that does not resolve to HTTP(S)
/// - Fragments are removed and duplicates dropped; the order of first
///   occurrence is kept
///
/// # Example
///
/// ```
/// use link_sweep::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let links = extract_links(html, &base_url);
/// assert_eq!(links[0].as_str(), "https://example.com/page");
/// ```
pub fn extract_links(html: &str, page_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let base = document_base(&document, page_url);

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    let a_selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return links,
    };

    for element in document.select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        match resolve_href(href, &base) {
            Some(url) => {
                if seen.insert(url.clone()) {
                    links.push(url);
                }
            }
            None => tracing::trace!("Skipping href {:?} on {}", href, page_url),
        }
    }

    links
}

/// Returns the URL relative links resolve against
fn document_base(document: &Html, page_url: &Url) -> Url {
    let Ok(base_selector) = Selector::parse("base[href]") else {
        return page_url.clone();
    };

    document
        .select(&base_selector)
        .next()
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| page_url.join(href.trim()).ok())
        .filter(|url| url.scheme() == "http" || url.scheme() == "https")
        .unwrap_or_else(|| page_url.clone())
}
