//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use site_harvester::config::{Config, CrawlerConfig};
use site_harvester::crawler::{Coordinator, FileCategory};
use site_harvester::output::load_report;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing under `dir` with no inter-batch delay
fn create_test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.crawler = CrawlerConfig {
        batch_width: 5,
        batch_delay_ms: 0,
        request_timeout_secs: 5,
        ..CrawlerConfig::default()
    };
    config.user_agent.crawler_name = "TestBot".to_string();
    config.output.output_root = dir.path().to_string_lossy().into_owned();
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><head><title>Test</title></head><body>{}</body></html>",
            body
        ))
        .insert_header("content-type", "text/html; charset=utf-8")
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let site = MockServer::start().await;
    let cdn = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&format!(
            r#"<p><a href="/about">About</a> <a href="report.pdf">Report</a></p>
               <img src="{}/photos/x.jpg" alt="">
               <a href="archive.zip">Archive</a>
               <a href="{}/elsewhere">Elsewhere</a>"#,
            cdn.uri(),
            cdn.uri()
        )))
        .mount(&site)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html(r#"<h1>About</h1><a href="/">Home</a>"#))
        .mount(&site)
        .await;

    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"%PDF-1.4 test report".to_vec())
                .insert_header("content-type", "application/pdf"),
        )
        .expect(1)
        .mount(&site)
        .await;

    Mock::given(method("GET"))
        .and(path("/archive.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK".to_vec()))
        .expect(0)
        .mount(&site)
        .await;

    Mock::given(method("GET"))
        .and(path("/photos/x.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF]))
        .expect(1)
        .mount(&cdn)
        .await;

    // Off-site pages are never crawled
    Mock::given(method("GET"))
        .and(path("/elsewhere"))
        .respond_with(html("elsewhere"))
        .expect(0)
        .mount(&cdn)
        .await;

    let dir = TempDir::new().unwrap();
    let base_url = format!("{}/", site.uri());
    let coordinator = Coordinator::new(create_test_config(&dir), &base_url).unwrap();

    let stats = coordinator.crawl(None).await;

    assert_eq!(stats.pages_visited, 2);
    assert_eq!(stats.pages_recorded, 2);
    assert_eq!(stats.files_downloaded, 2);
    assert_eq!(stats.files_by_category.get(&FileCategory::Documents), Some(&1));
    assert_eq!(stats.files_by_category.get(&FileCategory::Images), Some(&1));

    let run_dir = coordinator.run_dir();
    let report_pdf = run_dir.join("documents").join("report.pdf");
    let photo = run_dir.join("images").join("x.jpg");
    assert_eq!(std::fs::read(&report_pdf).unwrap(), b"%PDF-1.4 test report".to_vec());
    assert_eq!(std::fs::read(&photo).unwrap(), vec![0xFF, 0xD8, 0xFF]);
    assert!(!run_dir.join("documents").join("archive.zip").exists());

    let report = load_report(coordinator.report_path()).unwrap();
    assert_eq!(report.base_url, base_url);
    assert_eq!(report.total_pages_crawled, report.results.len());

    let home = report
        .results
        .iter()
        .find(|page| page.url == base_url)
        .expect("home page recorded");
    assert_eq!(home.title, "Test");
    assert_eq!(home.downloaded_files.len(), 2);
    for file in &home.downloaded_files {
        let size = std::fs::metadata(&file.local_path).unwrap().len();
        assert_eq!(file.size, size);
    }

    assert!(report
        .results
        .iter()
        .any(|page| page.url == format!("{}about", base_url)));
}

#[tokio::test]
async fn test_max_pages_stops_after_first_batch() {
    let site = MockServer::start().await;

    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/page{}">Page {}</a> "#, i, i))
        .collect();
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&links))
        .expect(1)
        .mount(&site)
        .await;

    let dir = TempDir::new().unwrap();
    let coordinator = Coordinator::new(create_test_config(&dir), &site.uri()).unwrap();

    let stats = coordinator.crawl(Some(1)).await;

    assert_eq!(coordinator.visited_count(), 1);
    assert_eq!(coordinator.pending_urls().len(), 10);
    assert_eq!(stats.pages_recorded, 1);

    let report = load_report(coordinator.report_path()).unwrap();
    assert_eq!(report.total_pages_crawled, 1);
}

#[tokio::test]
async fn test_failing_page_does_not_stop_crawl() {
    let site = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/broken">Broken</a> <a href="/fine">Fine</a>"#))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/fine"))
        .respond_with(html("fine"))
        .mount(&site)
        .await;

    let dir = TempDir::new().unwrap();
    let coordinator = Coordinator::new(create_test_config(&dir), &site.uri()).unwrap();

    let stats = coordinator.crawl(None).await;

    assert_eq!(stats.pages_visited, 3);
    assert_eq!(stats.pages_recorded, 2);
    assert!(coordinator.pending_urls().is_empty());
}

#[tokio::test]
async fn test_uppercase_html_content_type_followed() {
    let site = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<html><body><a href="/next">Next</a></body></html>"#)
                .insert_header("content-type", "Text/HTML; charset=UTF-8"),
        )
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/next"))
        .respond_with(html("next"))
        .expect(1)
        .mount(&site)
        .await;

    let dir = TempDir::new().unwrap();
    let coordinator = Coordinator::new(create_test_config(&dir), &site.uri()).unwrap();

    let stats = coordinator.crawl(None).await;

    assert_eq!(stats.pages_visited, 2);
    assert_eq!(stats.pages_recorded, 2);
}

#[tokio::test]
async fn test_unreachable_base_url() {
    let dir = TempDir::new().unwrap();
    // Nothing listens on the discard port
    let coordinator = Coordinator::new(create_test_config(&dir), "http://127.0.0.1:9/").unwrap();

    let stats = coordinator.crawl(None).await;

    assert_eq!(stats.pages_visited, 1);
    assert_eq!(stats.pages_recorded, 0);
    assert!(coordinator.pending_urls().is_empty());

    assert_eq!(
        coordinator.run_dir(),
        dir.path().join("127.0.0.1_9_downloads")
    );
    let report = load_report(coordinator.report_path()).unwrap();
    assert_eq!(report.total_pages_crawled, 0);
    assert!(report.results.is_empty());
}
