//! Outbound HTTP with proxy fallback

mod client;

pub use client::{build_http_client, FetchResult, ResilientClient};
