// src/crawl/mod.rs
// =============================================================================
// This module is the crawl traversal engine.
//
// Submodules:
// - scope: URL normalization, the CrawlUrl key type, and the scope filter
// - paths: the deterministic URL -> output file mapping
// - driver: the frontier, the visited ledger, and the crawl loop
//
// This file (mod.rs) is the module root - it re-exports the public API so
// the rest of the application can write `crawl::CrawlDriver` instead of
// `crawl::driver::CrawlDriver`.
// =============================================================================

mod driver;
mod paths;
mod scope;

pub use driver::{CrawlDriver, CrawlOptions, CrawlResult, PageOutcome};
pub use scope::{seed_url, CrawlScope, CrawlUrl};
