//! Integration tests for the paged crawler against a mock kariyer.net API

use jobmeter::config::Config;
use jobmeter::crawler::{build_scraper, KariyerNet, PagedCrawler};
use jobmeter::job::UNKNOWN;
use jobmeter::{HarvestError, JobRecord, ResilientClient};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE_SIZE: u32 = 3;

/// Creates a configuration pointing kariyer.net at the mock server
fn create_test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.kariyernet.search_endpoint = format!("{}/search", server.uri());
    config.kariyernet.detail_endpoint = format!("{}/job", server.uri());
    config.kariyernet.page_size = PAGE_SIZE;
    config.kariyernet.proxied = false;
    config
}

fn crawler(server: &MockServer) -> PagedCrawler<KariyerNet> {
    let config = create_test_config(server);
    let client = ResilientClient::new(&config.http, None).expect("client should build");
    PagedCrawler::new(
        KariyerNet::new(config.kariyernet),
        Arc::new(client),
        Duration::ZERO,
    )
}

fn search_body(total: u64, ids: &[u64]) -> Value {
    let items: Vec<Value> = ids.iter().map(|id| json!({ "id": id })).collect();
    json!({
        "data": {
            "totalJobCount": total,
            "jobs": { "items": items }
        }
    })
}

fn detail_body(id: &str, confidential: bool) -> Value {
    json!({
        "data": {
            "jobGeneralInformation": {
                "title": format!("Job {}", id),
                "confidential": confidential,
                "postingDate": "2024-03-10T08:00:00",
                "closingDate": "9 Nisan 2024",
                "locationText": "Ankara",
                "qualifications": "Experience with Rust",
                "language": "Türkçe"
            },
            "jobCompanyInformation": { "companyName": " Acme Yazılım " }
        }
    })
}

/// Mounts a search page; page 1 also answers the page-count request
async fn mount_search_page(server: &MockServer, page: u32, total: u64, ids: &[u64], hits: u64) {
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_partial_json(json!({ "currentPage": page })))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(total, ids)))
        .expect(hits)
        .mount(server)
        .await;
}

async fn mount_details(server: &MockServer, ids: &[u64], hits: u64) {
    for id in ids {
        let id = id.to_string();
        Mock::given(method("GET"))
            .and(path("/job"))
            .and(query_param("jobId", id.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(detail_body(&id, false)))
            .expect(hits)
            .mount(server)
            .await;
    }
}

fn ids_of(records: &[JobRecord]) -> Vec<String> {
    records.iter().map(|r| r.external_id.clone()).collect()
}

fn seen(ids: &[&str]) -> HashSet<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

#[tokio::test]
async fn test_stops_at_first_page_without_new_jobs() {
    let server = MockServer::start().await;

    // 15 results, 5 pages; page 3 was fully harvested before
    mount_search_page(&server, 1, 15, &[1, 2, 3], 2).await;
    mount_search_page(&server, 2, 15, &[4, 5, 6], 1).await;
    mount_search_page(&server, 3, 15, &[7, 8, 9], 1).await;
    mount_search_page(&server, 4, 15, &[10, 11, 12], 0).await;
    mount_search_page(&server, 5, 15, &[13, 14, 15], 0).await;
    mount_details(&server, &[1, 2, 3, 4, 5, 6], 1).await;
    mount_details(&server, &[7, 8, 9], 0).await;

    let records = crawler(&server)
        .run(seen(&["7", "8", "9"]), None)
        .await
        .unwrap();

    assert_eq!(ids_of(&records), vec!["1", "2", "3", "4", "5", "6"]);
}

#[tokio::test]
async fn test_limit_stops_mid_crawl() {
    let server = MockServer::start().await;

    mount_search_page(&server, 1, 8, &[1, 2, 3], 2).await;
    mount_search_page(&server, 2, 8, &[4, 5, 6], 1).await;
    mount_search_page(&server, 3, 8, &[7, 8], 0).await;
    mount_details(&server, &[1, 2, 3, 4, 5], 1).await;
    mount_details(&server, &[6, 7, 8], 0).await;

    let records = crawler(&server).run(HashSet::new(), Some(5)).await.unwrap();

    assert_eq!(records.len(), 5);
    assert_eq!(ids_of(&records), vec!["1", "2", "3", "4", "5"]);
}

#[tokio::test]
async fn test_empty_source_only_counts_pages() {
    let server = MockServer::start().await;

    mount_search_page(&server, 1, 0, &[], 1).await;

    let records = crawler(&server).run(HashSet::new(), None).await.unwrap();

    assert!(records.is_empty());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_zero_limit_makes_no_requests() {
    let server = MockServer::start().await;

    let records = crawler(&server).run(HashSet::new(), Some(0)).await.unwrap();

    assert!(records.is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_caught_up_source_fetches_no_details() {
    let server = MockServer::start().await;

    mount_search_page(&server, 1, 6, &[1, 2, 3], 2).await;
    mount_search_page(&server, 2, 6, &[4, 5, 6], 0).await;
    mount_details(&server, &[1, 2, 3], 0).await;

    let records = crawler(&server)
        .run(seen(&["1", "2", "3"]), None)
        .await
        .unwrap();

    assert!(records.is_empty());
}

#[tokio::test]
async fn test_confidential_company_is_unknown() {
    let server = MockServer::start().await;

    mount_search_page(&server, 1, 2, &[1, 2], 2).await;
    mount_details(&server, &[1], 1).await;
    Mock::given(method("GET"))
        .and(path("/job"))
        .and(query_param("jobId", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_body("2", true)))
        .expect(1)
        .mount(&server)
        .await;

    let records = crawler(&server).run(HashSet::new(), None).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].company, "Acme Yazılım");
    assert_eq!(records[1].company, UNKNOWN);
    assert_eq!(records[1].salary, UNKNOWN);
    assert_eq!(records[1].closing_date.to_string(), "2024-04-09");
    assert_eq!(records[1].source, "kariyernet");
}

#[tokio::test]
async fn test_page_count_failure_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = crawler(&server)
        .run(HashSet::new(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, HarvestError::PageCount { .. }));
}

#[tokio::test]
async fn test_page_count_without_total_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
        .mount(&server)
        .await;

    let err = crawler(&server)
        .run(HashSet::new(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, HarvestError::PageCount { .. }));
}

#[tokio::test]
async fn test_failed_detail_is_skipped() {
    let server = MockServer::start().await;

    mount_search_page(&server, 1, 3, &[1, 2, 3], 2).await;
    mount_details(&server, &[1, 3], 1).await;
    Mock::given(method("GET"))
        .and(path("/job"))
        .and(query_param("jobId", "2"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let records = crawler(&server).run(HashSet::new(), None).await.unwrap();

    assert_eq!(ids_of(&records), vec!["1", "3"]);
}

#[tokio::test]
async fn test_failed_page_returns_partial_result() {
    let server = MockServer::start().await;

    mount_search_page(&server, 1, 9, &[1, 2, 3], 2).await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_partial_json(json!({ "currentPage": 2 })))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;
    mount_search_page(&server, 3, 9, &[7, 8, 9], 0).await;
    mount_details(&server, &[1, 2, 3], 1).await;

    let records = crawler(&server).run(HashSet::new(), None).await.unwrap();

    assert_eq!(ids_of(&records), vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_search_request_shape() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "memberId": 0,
            "currentPage": 1,
            "size": PAGE_SIZE,
            "departments": ["55", "78"],
            "sortType": "SortByDate",
            "sortDirection": "Descending"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(0, &[])))
        .expect(1)
        .mount(&server)
        .await;

    let records = crawler(&server).run(HashSet::new(), None).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_scraper_built_from_config() {
    let server = MockServer::start().await;
    let mut config = create_test_config(&server);
    config.crawler.navigation_delay = 0;

    mount_search_page(&server, 1, 1, &[42], 2).await;
    mount_details(&server, &[42], 1).await;

    let client = Arc::new(ResilientClient::new(&config.http, None).unwrap());
    let scraper = build_scraper("kariyernet", &config, client).unwrap();
    let records = scraper.scrape(HashSet::new(), None).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Job 42");
    assert_eq!(records[0].company, "Acme Yazılım");
}
