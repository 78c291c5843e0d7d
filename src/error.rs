// src/error.rs
// =============================================================================
// This file defines the error taxonomy for the crawler.
//
// There are two very different kinds of failure in this tool:
// - Per-page failures (fetch, convert, write): these are recovered locally.
//   The page is recorded as failed and the crawl keeps going.
// - Configuration failures (bad start/base URL): these are fatal and are
//   surfaced before the crawl loop ever starts.
//
// We use the `thiserror` crate to derive Display/Error implementations, and
// `anyhow` at the application boundary (main.rs) to report whatever bubbles
// up there.
// =============================================================================

use thiserror::Error;

use crate::fetch::FetchError;

// The typed error for everything that can go wrong during a crawl
//
// #[derive(Error)] generates the std::error::Error impl for us,
// and #[error("...")] generates the Display message for each variant.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Page render/navigation failed; recovered per page
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// HTML to Markdown conversion failed; treated like a fetch failure
    #[error("conversion failed: {0}")]
    Convert(String),

    /// Directory creation or file write failed; recovered per page
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed start/base URL or unusable scope; fatal, crawl never starts
    #[error("configuration error: {0}")]
    Config(String),
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why thiserror instead of hand-written impls?
//    - Writing Display and Error by hand is boilerplate
//    - thiserror generates both from the #[error(...)] attributes
//
// 2. What does #[from] do?
//    - It generates a From<FetchError> impl for CrawlError
//    - That lets us use the ? operator on a Result<_, FetchError>
//      inside a function returning Result<_, CrawlError>
//
// 3. Why both thiserror and anyhow?
//    - thiserror is for errors callers need to match on (our taxonomy)
//    - anyhow is for main(), where we only want to print and exit
// -----------------------------------------------------------------------------
