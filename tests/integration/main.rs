//! Integration tests for jobmeter
//!
//! These tests use wiremock to stand in for job boards and the proxy
//! provider, and drive the public API end-to-end.

mod crawl_tests;
mod http_tests;
