//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use shelf_ripple::config::{
    apply_overrides, load_config, Config, ConfigOverrides, CrawlerConfig, DEFAULT_SEED_PATHS,
};
use shelf_ripple::crawler::{crawl, Scheduler};
use shelf_ripple::output::write_results;
use shelf_ripple::{ConfigError, CrawlPhase, ShelfError};
use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;
use tempfile::{NamedTempFile, TempDir};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration for the given mock servers
fn create_test_config(servers: &[&MockServer], max_pages: usize) -> Config {
    let mut config = Config::for_domains(servers.iter().map(|s| s.uri()));
    config.crawler.max_pages = max_pages;
    config.crawler.delay = 0.0;
    config.crawler.timeout = 5.0;
    config.crawler.seed_paths = Vec::new();
    config
}

async fn mount_page(server: &MockServer, p: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(p))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html"))
        .mount(server)
        .await;
}

fn homepage(server: &MockServer) -> String {
    format!("{}/", server.uri())
}

#[tokio::test]
async fn test_product_found_within_page_limit() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<html><body>
            <a href="/about">About us</a>
            <a href="/product/101">Cotton kurta</a>
        </body></html>"#,
    )
    .await;
    mount_page(&server, "/about", "<p>About</p>").await;
    mount_page(
        &server,
        "/product/101",
        r#"<button class="add-to-cart">Add to cart</button>"#,
    )
    .await;

    let report = crawl(create_test_config(&[&server], 2)).await.unwrap();
    let domain = &report.domains[0];

    assert_eq!(domain.pages_fetched, 2);
    assert_eq!(domain.phase, CrawlPhase::Done);
    assert_eq!(
        domain.product_urls,
        vec![format!("{}/product/101", server.uri())]
    );

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_learned_pattern_classifies_later_links() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/category/kurta">Kurtas</a>"#).await;
    mount_page(
        &server,
        "/category/kurta",
        r#"<div class="listing" data-sku="KT-1">
             <span>MRP 1,299</span>
             <a href="/category/kurta/xyz">Kurta XYZ</a>
           </div>"#,
    )
    .await;
    mount_page(&server, "/category/kurta/xyz", "<p>Kurta XYZ</p>").await;

    let report = crawl(create_test_config(&[&server], 10)).await.unwrap();
    let domain = &report.domains[0];

    let learned: Vec<&str> = domain
        .learned_patterns
        .iter()
        .map(|p| p.pattern.as_str())
        .collect();
    assert_eq!(learned, vec!["/category/", "/category/kurta/"]);
    assert!(domain
        .product_urls
        .contains(&format!("{}/category/kurta/xyz", server.uri())));
    assert!(domain.learned_patterns[0].signal.contains("MRP present"));
}

#[tokio::test]
async fn test_cross_domain_links_rejected() {
    let shop = MockServer::start().await;
    let other = MockServer::start().await;
    mount_page(
        &shop,
        "/",
        &format!(
            r#"<a href="{}/product/1">Elsewhere</a>
               <a href="http://other.example/product/1">Elsewhere too</a>"#,
            other.uri()
        ),
    )
    .await;
    mount_page(&other, "/", "<p>other</p>").await;
    mount_page(&other, "/product/1", "<p>product</p>").await;

    let report = crawl(create_test_config(&[&shop], 10)).await.unwrap();
    let domain = &report.domains[0];

    assert_eq!(domain.pages_fetched, 1);
    assert!(domain.product_urls.is_empty());
    assert!(other.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_page_budget_is_exact() {
    let server = MockServer::start().await;
    let links: String = (0..30)
        .map(|i| format!(r#"<a href="/page-{}">p</a>"#, i))
        .collect();
    mount_page(&server, "/", &links).await;
    for i in 0..30 {
        mount_page(&server, &format!("/page-{}", i), &links).await;
    }

    let mut config = create_test_config(&[&server], 7);
    config.crawler.concurrency = 4;
    let report = crawl(config).await.unwrap();

    assert_eq!(report.domains[0].pages_fetched, 7);
    assert_eq!(server.received_requests().await.unwrap().len(), 7);
}

#[tokio::test]
async fn test_pages_fetched_once() {
    let server = MockServer::start().await;
    let links = r#"<a href="/a">a</a><a href="/b">b</a><a href="/a/">a again</a><a href="/b?utm_source=x">b again</a>"#;
    mount_page(&server, "/", links).await;
    mount_page(&server, "/a", links).await;
    mount_page(&server, "/b", links).await;

    let report = crawl(create_test_config(&[&server], 50)).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let mut paths: Vec<String> = requests.iter().map(|r| r.url.path().to_string()).collect();
    paths.sort();
    assert_eq!(paths, vec!["/", "/a", "/b"]);
    assert_eq!(report.domains[0].phase, CrawlPhase::Done);
}

#[tokio::test]
async fn test_concurrency_limit_respected() {
    let server = MockServer::start().await;
    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/slow-{}">p</a>"#, i))
        .collect();
    mount_page(&server, "/", &links).await;
    for i in 0..10 {
        Mock::given(method("GET"))
            .and(path(format!("/slow-{}", i)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<p>slow</p>", "text/html")
                    .set_delay(Duration::from_millis(150)),
            )
            .mount(&server)
            .await;
    }

    let mut config = create_test_config(&[&server], 100);
    config.crawler.concurrency = 2;
    let report = crawl(config).await.unwrap();

    assert_eq!(report.domains[0].pages_fetched, 11);
    assert!(report.domains[0].peak_in_flight <= 2);
}

#[tokio::test]
async fn test_delay_spaces_requests() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/a">a</a><a href="/b">b</a>"#).await;
    mount_page(&server, "/a", "<p>a</p>").await;
    mount_page(&server, "/b", "<p>b</p>").await;

    let mut config = create_test_config(&[&server], 10);
    config.crawler.delay = 0.2;
    let started = std::time::Instant::now();
    let report = crawl(config).await.unwrap();

    assert_eq!(report.domains[0].pages_fetched, 3);
    assert!(started.elapsed() >= Duration::from_millis(400));
}

#[tokio::test]
async fn test_unreachable_domain_does_not_stop_others() {
    let healthy = MockServer::start().await;
    mount_page(&healthy, "/", r#"<a href="/product/9">Item</a>"#).await;
    mount_page(&healthy, "/product/9", "<p>item</p>").await;

    let dead = MockServer::builder().start().await;
    let dead_uri = dead.uri();
    drop(dead);

    let mut config = create_test_config(&[&healthy], 10);
    config.crawler.domains.push(dead_uri.clone());
    let report = crawl(config).await.unwrap();

    assert_eq!(report.domains.len(), 2);
    assert_eq!(report.domains[0].product_urls.len(), 1);

    let failed = &report.domains[1];
    assert!(failed.product_urls.is_empty());
    assert_eq!(failed.skipped_pages.get("unreachable"), Some(&1));

    let map = report.product_map();
    assert_eq!(map[&format!("{}/", dead_uri)], Vec::<String>::new());
}

#[tokio::test]
async fn test_dead_links_are_skipped() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="/gone">gone</a><a href="/error">error</a><a href="/product/5">p</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/error"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "/product/5", "<p>p</p>").await;

    let report = crawl(create_test_config(&[&server], 10)).await.unwrap();
    let domain = &report.domains[0];

    assert_eq!(domain.pages_fetched, 4);
    assert_eq!(domain.skipped_pages.get("dead_link"), Some(&1));
    assert_eq!(domain.skipped_pages.get("http_error"), Some(&1));
    assert_eq!(domain.product_urls.len(), 1);
}

#[tokio::test]
async fn test_redirected_page_is_processed() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/old-shop">shop</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/old-shop"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/shop"))
        .mount(&server)
        .await;
    mount_page(&server, "/shop", r#"<a href="/item/42">Item</a>"#).await;
    mount_page(&server, "/item/42", "<p>item</p>").await;

    let report = crawl(create_test_config(&[&server], 10)).await.unwrap();
    let domain = &report.domains[0];

    assert_eq!(domain.product_urls, vec![format!("{}/item/42", server.uri())]);
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.iter().filter(|r| r.url.path() == "/shop").count(), 1);
}

#[tokio::test]
async fn test_script_and_data_attribute_links_followed() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<html><body>
            <div class="banner" onclick="location.href='/hidden/page'">New season</div>
            <div class="product-card" data-url="/item/77"><span>Linen shirt</span></div>
            <span data-href="/lookbook">Lookbook</span>
        </body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/hidden/page",
        r#"<button onclick="location.assign('/product/31')">View</button>"#,
    )
    .await;
    mount_page(&server, "/item/77", "<p>shirt</p>").await;
    mount_page(&server, "/lookbook", "<p>looks</p>").await;
    mount_page(&server, "/product/31", "<p>dress</p>").await;

    let report = crawl(create_test_config(&[&server], 10)).await.unwrap();
    let domain = &report.domains[0];

    let requests = server.received_requests().await.unwrap();
    let mut paths: Vec<String> = requests.iter().map(|r| r.url.path().to_string()).collect();
    paths.sort();
    assert_eq!(
        paths,
        vec!["/", "/hidden/page", "/item/77", "/lookbook", "/product/31"]
    );
    assert!(domain
        .product_urls
        .contains(&format!("{}/item/77", server.uri())));
    assert!(domain
        .product_urls
        .contains(&format!("{}/product/31", server.uri())));
}

#[tokio::test]
async fn test_shallow_page_with_product_content_recorded() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/blue-cotton-kurta">Blue kurta</a>"#).await;
    mount_page(
        &server,
        "/blue-cotton-kurta",
        r#"<html><head><script type="application/ld+json">
             {"@type": "Product", "name": "Blue cotton kurta"}
           </script></head>
           <body><div itemscope itemtype="https://schema.org/Product">
             <span class="product-price">1,499</span>
             <button class="add-to-cart">Add to cart</button>
           </div></body></html>"#,
    )
    .await;

    let report = crawl(create_test_config(&[&server], 10)).await.unwrap();

    assert_eq!(
        report.domains[0].product_urls,
        vec![format!("{}/blue-cotton-kurta", server.uri())]
    );
}

#[tokio::test]
async fn test_default_seed_paths_are_requested() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<p>home</p>").await;
    mount_page(&server, "/products", r#"<a href="/products/tee-1">Tee</a>"#).await;
    mount_page(&server, "/products/tee-1", "<p>tee</p>").await;

    let mut config = create_test_config(&[&server], 50);
    config.crawler.seed_paths = CrawlerConfig::default().seed_paths;
    let report = crawl(config).await.unwrap();
    let domain = &report.domains[0];

    let requests = server.received_requests().await.unwrap();
    for seed in DEFAULT_SEED_PATHS {
        assert!(
            requests.iter().any(|r| r.url.path() == *seed),
            "seed {} not requested",
            seed
        );
    }
    assert_eq!(domain.pages_fetched, 13);
    assert_eq!(
        domain.product_urls,
        vec![format!("{}/products/tee-1", server.uri())]
    );
}

#[tokio::test]
async fn test_empty_domain_list_is_fatal() {
    let result = crawl(Config::default()).await;
    assert!(matches!(
        result,
        Err(ShelfError::Config(ConfigError::Validation(_)))
    ));

    let result = apply_overrides(Config::default(), ConfigOverrides::default());
    assert!(result.is_err());
}

#[tokio::test]
async fn test_config_file_and_output_artifacts() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/product/1">p</a>"#).await;
    mount_page(&server, "/product/1", "<p>p</p>").await;
    mount_page(&server, "/new-arrivals", r#"<a href="/product/2">p</a>"#).await;
    mount_page(&server, "/product/2", "<p>p</p>").await;

    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[crawler]
max-pages = 10
concurrency = 1
delay = 0
timeout = 5
seed-paths = ["/new-arrivals"]
domains = ["{}"]
"#,
        server.uri()
    )
    .unwrap();
    file.flush().unwrap();

    let config = load_config(file.path()).unwrap();
    let config = apply_overrides(config, ConfigOverrides::default()).unwrap();
    let report = Scheduler::new(config).unwrap().run().await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("product_urls.json");
    let written = write_results(&report, &output).unwrap();

    let results: BTreeMap<String, Vec<String>> =
        serde_json::from_str(&std::fs::read_to_string(&written.results).unwrap()).unwrap();
    let products = &results[&homepage(&server)];
    assert_eq!(
        products,
        &vec![
            format!("{}/product/1", server.uri()),
            format!("{}/product/2", server.uri()),
        ]
    );

    let stats: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&written.stats).unwrap()).unwrap();
    assert_eq!(stats["domains"], 1);
    assert_eq!(stats["total_product_urls"], 2);
    assert_eq!(stats["pages_crawled_per_domain"][homepage(&server)], 4);
}
