// src/fetch/mod.rs
// =============================================================================
// This module fetches pages, the one genuinely external thing the crawler
// does.
//
// The crawl driver only ever talks to the PageFetcher trait, so tests can
// hand it an in-memory fake and exercise the whole loop without a network.
// The real implementation, HttpFetcher, wraps a reqwest client configured
// once with a timeout and a bounded redirect policy; reqwest tears the
// connection down on failure, so nothing leaks when a page errors out.
//
// Rust concepts:
// - Traits: The seam between the crawl loop and the network
// - async fn in traits: Each fetch is awaited by the sequential loop
// =============================================================================

use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::crawl::CrawlUrl;

// What can go wrong when rendering a page
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status
    #[error("HTTP {0}")]
    Status(StatusCode),

    /// Connection, DNS, TLS or timeout failure
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

// The page-render collaborator the crawl driver depends on
//
// Implementations must be side-effect free on failure: a failed fetch
// leaves nothing for the caller to clean up.
pub trait PageFetcher {
    async fn render_page(&self, url: &CrawlUrl) -> Result<String, FetchError>;
}

// Fetches pages over plain HTTP(S) with reqwest
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    // Builds the fetcher with a per-request timeout
    //
    // The timeout is required hardening: without one, a single
    // unresponsive server stalls the whole sequential crawl.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(HttpFetcher { client })
    }
}

impl PageFetcher for HttpFetcher {
    async fn render_page(&self, url: &CrawlUrl) -> Result<String, FetchError> {
        let response = self.client.get(url.as_str()).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        Ok(response.text().await?)
    }
}
