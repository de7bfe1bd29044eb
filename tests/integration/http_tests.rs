//! Integration tests for proxy routing and fallback in ResilientClient

use jobmeter::config::HttpConfig;
use jobmeter::proxy::{ProxyPool, WebshareProvider};
use jobmeter::{FetchResult, ResilientClient};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn http_config() -> HttpConfig {
    HttpConfig {
        timeout_secs: 5,
        connect_timeout_secs: 2,
        ..HttpConfig::default()
    }
}

/// Pool backed by a mock provider at `provider`
fn pool(provider: &MockServer) -> Arc<ProxyPool> {
    let provider = WebshareProvider::new(reqwest::Client::new(), &provider.uri(), "test-key");
    Arc::new(ProxyPool::new(provider, 25, Duration::from_secs(300)))
}

/// Provider listing one endpoint that points at `proxy`, with credentials u:p
async fn mount_provider_for(provider: &MockServer, proxy: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v2/proxy/list/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "username": "u",
                "password": "p",
                "proxy_address": proxy.address().ip().to_string(),
                "port": proxy.address().port(),
                "valid": true
            }]
        })))
        .expect(1)
        .mount(provider)
        .await;
}

#[tokio::test]
async fn test_proxied_error_status_is_http_error() {
    let provider = MockServer::start().await;
    let proxy = MockServer::start().await;
    mount_provider_for(&provider, &proxy).await;

    // Forward proxy relays an upstream 503
    Mock::given(method("GET"))
        .and(path("/job"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&proxy)
        .await;

    let client = ResilientClient::new(&http_config(), Some(pool(&provider))).unwrap();
    let result = client.get("http://example.invalid/job?jobId=1", true).await;

    let expected_proxy = proxy.address().to_string();
    match result {
        FetchResult::HttpError {
            status_code, proxy, ..
        } => {
            assert_eq!(status_code, 503);
            assert_eq!(proxy.as_deref(), Some(expected_proxy.as_str()));
        }
        other => panic!("expected proxied HTTP error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_proxied_request_carries_credentials() {
    let provider = MockServer::start().await;
    let proxy = MockServer::start().await;
    mount_provider_for(&provider, &proxy).await;

    // base64("u:p")
    Mock::given(method("GET"))
        .and(path("/job"))
        .and(query_param("jobId", "1"))
        .and(header("proxy-authorization", "Basic dTpw"))
        .respond_with(ResponseTemplate::new(200).set_body_string("via proxy"))
        .expect(1)
        .mount(&proxy)
        .await;

    let client = ResilientClient::new(&http_config(), Some(pool(&provider))).unwrap();
    let result = client.get("http://example.invalid/job?jobId=1", true).await;

    match result {
        FetchResult::Success {
            status_code, body, ..
        } => {
            assert_eq!(status_code, 200);
            assert_eq!(body, "via proxy");
        }
        other => panic!("expected response through proxy, got {:?}", other),
    }
}

#[tokio::test]
async fn test_direct_error_status_passes_through() {
    let target = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .mount(&target)
        .await;

    let client = ResilientClient::new(&http_config(), None).unwrap();
    let result = client
        .get(&format!("{}/missing", target.uri()), false)
        .await;

    match result {
        FetchResult::Success {
            status_code, body, ..
        } => {
            assert_eq!(status_code, 404);
            assert_eq!(body, "not here");
        }
        other => panic!("expected pass-through response, got {:?}", other),
    }
}

#[tokio::test]
async fn test_post_sends_body_and_headers_verbatim() {
    let target = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("x-client", "jobmeter"))
        .and(body_partial_json(json!({ "currentPage": 4, "size": 50 })))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&target)
        .await;

    let mut headers = HeaderMap::new();
    headers.insert("x-client", HeaderValue::from_static("jobmeter"));

    let client = ResilientClient::new(&http_config(), None).unwrap();
    let result = client
        .post(
            &format!("{}/search", target.uri()),
            &json!({ "currentPage": 4, "size": 50 }),
            &headers,
            false,
        )
        .await;

    assert_eq!(result.into_body().as_deref(), Some("ok"));
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    let client = ResilientClient::new(&http_config(), None).unwrap();
    let result = client.get("http://127.0.0.1:1/", false).await;

    match result {
        FetchResult::NetworkError { proxy, .. } => assert!(proxy.is_none()),
        other => panic!("expected network error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_dead_proxy_is_network_error() {
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/proxy/list/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "username": "user",
                "password": "secret",
                "proxy_address": "127.0.0.1",
                "port": 1,
                "valid": true
            }]
        })))
        .expect(1)
        .mount(&provider)
        .await;

    let target = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&target)
        .await;

    let client = ResilientClient::new(&http_config(), Some(pool(&provider))).unwrap();
    let result = client.get(&format!("{}/job", target.uri()), true).await;

    match result {
        FetchResult::NetworkError { proxy, .. } => {
            assert_eq!(proxy.as_deref(), Some("127.0.0.1:1"));
        }
        other => panic!("expected network error through proxy, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_pool_falls_back_to_direct() {
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/proxy/list/"))
        .respond_with(ResponseTemplate::new(500))
        // A failed refresh still throttles the next attempt
        .expect(1)
        .mount(&provider)
        .await;

    let target = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/job"))
        .respond_with(ResponseTemplate::new(200).set_body_string("direct"))
        .expect(2)
        .mount(&target)
        .await;

    let client = ResilientClient::new(&http_config(), Some(pool(&provider))).unwrap();
    let url = format!("{}/job", target.uri());

    for _ in 0..2 {
        let result = client.get(&url, true).await;
        assert_eq!(result.into_body().as_deref(), Some("direct"));
    }
}

#[tokio::test]
async fn test_unflagged_request_skips_pool() {
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(0)
        .mount(&provider)
        .await;

    let target = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .mount(&target)
        .await;

    let client = ResilientClient::new(&http_config(), Some(pool(&provider))).unwrap();
    let result = client.get(&target.uri(), false).await;

    assert!(result.is_success());
}
