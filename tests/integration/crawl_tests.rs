//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use link_sweep::config::CrawlJob;
use link_sweep::crawler::{find_broken_links, BrokenReason, Crawler};
use link_sweep::output::CrawlStatus;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An HTML page containing the given hrefs
fn html_page(links: &[&str]) -> ResponseTemplate {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    let body = format!("<html><head><title>Test</title></head><body>{}</body></html>", anchors);
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Returns a URL on 127.0.0.1 where nothing is listening
fn refused_url(route: &str) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("No local address").port();
    drop(listener);
    format!("http://127.0.0.1:{}{}", port, route)
}

fn job_for(server: &MockServer) -> CrawlJob {
    CrawlJob::new(&format!("{}/", server.uri()))
        .expect("Mock server URI should be a valid seed")
        .with_max_checked(None)
        .with_workers(4)
        .with_fetch_timeout(Duration::from_secs(2))
}

#[tokio::test]
async fn test_domain_restricted_scenario() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Served from "localhost", a different host than the seed's 127.0.0.1
    let external_server = MockServer::start().await;
    let external_port = url::Url::parse(&external_server.uri())
        .expect("Failed to parse external URI")
        .port()
        .expect("Mock server URI has a port");
    let external_url = format!("http://localhost:{}/d", external_port);

    let refused = refused_url("/c");

    mount(
        &mock_server,
        "/",
        html_page(&["/a", "/b", &refused, &external_url, "http://other.example/d"]),
    )
    .await;
    mount(&mock_server, "/a", html_page(&[])).await;
    mount(&mock_server, "/b", ResponseTemplate::new(404)).await;

    // The external page must never be fetched
    Mock::given(method("GET"))
        .and(path("/d"))
        .respond_with(html_page(&[]))
        .expect(0)
        .mount(&external_server)
        .await;

    let crawler = Crawler::with_http(job_for(&mock_server).with_domain_restricted(true))
        .expect("Failed to build crawler");
    let report = crawler.run().await.expect("Crawl failed");

    let mut expected = vec![format!("{}/b", base_url), refused.clone()];
    expected.sort();
    let mut broken = report.broken_urls();
    broken.sort();
    assert_eq!(broken, expected);

    assert_eq!(report.status, CrawlStatus::Completed);
    assert_eq!(report.checked, 4);

    // Nothing off the seed's host was ever claimed
    assert!(crawler
        .visited()
        .claimed()
        .iter()
        .all(|u| u.host_str() == Some("127.0.0.1")));

    let refused_entry = report
        .broken
        .iter()
        .find(|b| b.url == refused)
        .expect("Refused URL should be reported");
    assert!(matches!(refused_entry.reason, BrokenReason::Network { .. }));
}

#[tokio::test]
async fn test_cap_of_one_fetches_only_seed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&["/a", "/b", "/c", "/d"]))
        .expect(1)
        .mount(&mock_server)
        .await;

    for route in ["/a", "/b", "/c", "/d"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(html_page(&[]))
            .expect(0)
            .mount(&mock_server)
            .await;
    }

    let crawler = Crawler::with_http(job_for(&mock_server).with_max_checked(Some(1)))
        .expect("Failed to build crawler");
    let report = crawler.run().await.expect("Crawl failed");

    assert_eq!(report.checked, 1);
    assert!(report.broken.is_empty());
    assert_eq!(report.status, CrawlStatus::Completed);
}

#[tokio::test]
async fn test_cap_bounds_total_fetches() {
    let mock_server = MockServer::start().await;

    let links: Vec<String> = (0..20).map(|i| format!("/page{}", i)).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
    mount(&mock_server, "/", html_page(&link_refs)).await;
    for link in &links {
        mount(&mock_server, link, html_page(&[])).await;
    }

    let crawler = Crawler::with_http(
        job_for(&mock_server)
            .with_max_checked(Some(5))
            .with_workers(10),
    )
    .expect("Failed to build crawler");
    let report = crawler.run().await.expect("Crawl failed");

    let requests = mock_server
        .received_requests()
        .await
        .expect("Request recording is enabled");
    assert!(requests.len() <= 5, "Made {} requests", requests.len());
    assert_eq!(report.checked, requests.len());
}

#[tokio::test]
async fn test_transitive_crawl_follows_in_domain_pages() {
    let mock_server = MockServer::start().await;

    mount(&mock_server, "/", html_page(&["/level1"])).await;
    mount(&mock_server, "/level1", html_page(&["/level2", "/"])).await;
    mount(&mock_server, "/level2", html_page(&["/level3"])).await;
    mount(&mock_server, "/level3", ResponseTemplate::new(404)).await;

    let report = Crawler::with_http(job_for(&mock_server).with_domain_restricted(true))
        .expect("Failed to build crawler")
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(
        report.broken_urls(),
        vec![format!("{}/level3", mock_server.uri())]
    );
    assert_eq!(report.checked, 4);
}

#[tokio::test]
async fn test_depth_limit_stops_expansion() {
    let mock_server = MockServer::start().await;

    mount(&mock_server, "/", html_page(&["/level1"])).await;
    mount(&mock_server, "/level1", html_page(&["/level2"])).await;

    Mock::given(method("GET"))
        .and(path("/level2"))
        .respond_with(html_page(&[]))
        .expect(0)
        .mount(&mock_server)
        .await;

    let report = Crawler::with_http(job_for(&mock_server).with_max_depth(Some(1)))
        .expect("Failed to build crawler")
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(report.checked, 2);
}

#[tokio::test]
async fn test_worker_counts_agree() {
    let mock_server = MockServer::start().await;

    mount(&mock_server, "/", html_page(&["/a", "/b", "/c", "/d", "/e"])).await;
    mount(&mock_server, "/a", html_page(&["/a1", "/a2", "/b"])).await;
    mount(&mock_server, "/b", ResponseTemplate::new(500)).await;
    mount(&mock_server, "/c", html_page(&["/c1", "/a"])).await;
    mount(&mock_server, "/d", ResponseTemplate::new(410)).await;
    mount(&mock_server, "/e", html_page(&[])).await;
    mount(&mock_server, "/a1", html_page(&[])).await;
    mount(&mock_server, "/c1", html_page(&["/missing"])).await;
    // "/a2" and "/missing" are unmocked and answer 404

    let single = Crawler::with_http(job_for(&mock_server).with_workers(1))
        .expect("Failed to build crawler")
        .run()
        .await
        .expect("Crawl failed");
    let many = Crawler::with_http(job_for(&mock_server).with_workers(20))
        .expect("Failed to build crawler")
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(single.broken_urls(), many.broken_urls());
    assert_eq!(single.broken_urls().len(), 4);
    assert_eq!(single.checked, many.checked);
}

#[tokio::test]
async fn test_unreachable_seed_is_reported() {
    let seed = refused_url("/");

    let report = Crawler::with_http(
        CrawlJob::new(&seed)
            .expect("Valid seed")
            .with_fetch_timeout(Duration::from_secs(2)),
    )
    .expect("Failed to build crawler")
    .run()
    .await
    .expect("Crawl failed");

    assert_eq!(report.broken_urls(), vec![seed]);
    assert_eq!(report.checked, 1);
}

#[tokio::test]
async fn test_non_html_pages_are_not_expanded() {
    let mock_server = MockServer::start().await;

    mount(&mock_server, "/", html_page(&["/document.pdf"])).await;
    mount(
        &mock_server,
        "/document.pdf",
        ResponseTemplate::new(200)
            .set_body_raw(r#"<a href="/hidden">not really html</a>"#, "application/pdf"),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(html_page(&[]))
        .expect(0)
        .mount(&mock_server)
        .await;

    let report = Crawler::with_http(job_for(&mock_server))
        .expect("Failed to build crawler")
        .run()
        .await
        .expect("Crawl failed");

    assert!(report.broken.is_empty());
    assert_eq!(report.checked, 2);
}

#[tokio::test]
async fn test_redirects_are_followed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount(&mock_server, "/", html_page(&["/old", "/gone"])).await;
    mount(
        &mock_server,
        "/old",
        ResponseTemplate::new(301).insert_header("location", format!("{}/new", base_url).as_str()),
    )
    .await;
    mount(&mock_server, "/new", html_page(&[])).await;
    mount(
        &mock_server,
        "/gone",
        ResponseTemplate::new(302)
            .insert_header("location", format!("{}/nowhere", base_url).as_str()),
    )
    .await;
    mount(&mock_server, "/nowhere", ResponseTemplate::new(404)).await;

    let report = Crawler::with_http(job_for(&mock_server))
        .expect("Failed to build crawler")
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(report.broken_urls(), vec![format!("{}/gone", base_url)]);
    assert_eq!(
        report.broken[0].reason,
        BrokenReason::BadStatus { status: 404 }
    );
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let mock_server = MockServer::start().await;

    mount(&mock_server, "/", html_page(&["/slow"])).await;
    mount(
        &mock_server,
        "/slow",
        html_page(&[]).set_delay(Duration::from_secs(5)),
    )
    .await;

    let report = Crawler::with_http(
        job_for(&mock_server).with_fetch_timeout(Duration::from_millis(300)),
    )
    .expect("Failed to build crawler")
    .run()
    .await
    .expect("Crawl failed");

    assert_eq!(
        report.broken_urls(),
        vec![format!("{}/slow", mock_server.uri())]
    );
    assert_eq!(report.broken[0].reason, BrokenReason::Timeout);
}

#[tokio::test]
async fn test_fragments_are_fetched_once() {
    let mock_server = MockServer::start().await;

    mount(&mock_server, "/", html_page(&["/page#one", "/page#two", "/page"])).await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(html_page(&["/#top"]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = Crawler::with_http(job_for(&mock_server))
        .expect("Failed to build crawler")
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(report.checked, 2);
}

#[tokio::test]
async fn test_find_broken_links_entry_point() {
    let mock_server = MockServer::start().await;

    mount(&mock_server, "/", html_page(&["/ok", "/broken"])).await;
    mount(&mock_server, "/ok", html_page(&[])).await;
    mount(&mock_server, "/broken", ResponseTemplate::new(404)).await;

    let broken = find_broken_links(
        &format!("{}/", mock_server.uri()),
        Some(100),
        true,
        8,
        Duration::from_secs(2),
    )
    .await
    .expect("Crawl failed");

    assert_eq!(broken, vec![format!("{}/broken", mock_server.uri())]);
}
