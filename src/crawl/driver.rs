// src/crawl/driver.rs
// =============================================================================
// This module implements the crawl loop itself.
//
// How it works:
// 1. Seed the frontier (a FIFO queue) with the start URL
// 2. Pop a URL; if the visited ledger already has it, drop it and loop
// 3. Otherwise mark it seen, consume one unit of the page budget, fetch it
// 4. Convert the page to markdown and write it under the data directory
// 5. Extract the page's links, normalize them, keep the in-scope ones and
//    push them all onto the frontier (dedup happens at pop time, step 2)
// 6. Repeat until the frontier is empty, the budget is exhausted, or the
//    stop flag was raised
//
// The pop -> check-seen -> mark-seen ordering is the ONLY dedup mechanism:
// a URL may sit in the frontier many times, but it is fetched at most once
// per run. Trading a little redundant queuing for not having to maintain a
// second "already enqueued" set keeps the invariant simple.
//
// Every per-page failure (fetch, convert, write) is recorded on the page's
// record and the loop continues; one bad page never aborts the crawl.
// =============================================================================

use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::paths::map_to_path;
use super::scope::{normalize, CrawlScope, CrawlUrl};
use crate::convert;
use crate::error::CrawlError;
use crate::fetch::PageFetcher;
use crate::output;

// How a single page visit ended
//
// #[derive(Serialize, Deserialize)] lets us dump the run report as JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PageOutcome {
    /// Fetched, converted and written
    Saved { path: String },
    /// Page render/navigation failed
    FetchFailed,
    /// HTML to markdown conversion failed
    ConvertFailed,
    /// Directory creation or file write failed
    WriteFailed,
}

// One processed page: the URL, how the visit ended, and an optional
// diagnostic. Records live only for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    #[serde(flatten)]
    pub outcome: PageOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PageRecord {
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, PageOutcome::Saved { .. })
    }
}

// The outcome of a whole crawl run
#[derive(Debug)]
pub struct CrawlResult {
    /// One record per page actually processed, in visit order
    pub records: Vec<PageRecord>,
}

impl CrawlResult {
    pub fn pages_visited(&self) -> usize {
        self.records.len()
    }

    pub fn pages_saved(&self) -> usize {
        self.records.iter().filter(|r| r.is_ok()).count()
    }
}

// Knobs for one crawl run
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Directory the per-page markdown files are written into
    pub data_dir: PathBuf,
    /// Maximum number of pages to process; None = crawl until the
    /// frontier empties
    pub max_pages: Option<usize>,
    /// Pause between successful fetches (polite crawling)
    pub fetch_delay: Duration,
}

// Drives one crawl run
//
// The frontier and the visited ledger are plain owned fields, so several
// independent crawls can run in the same process and the whole loop is
// unit-testable with a fake fetcher.
pub struct CrawlDriver {
    scope: CrawlScope,
    options: CrawlOptions,
    frontier: VecDeque<CrawlUrl>,
    visited: HashSet<String>,
    stop: Arc<AtomicBool>,
}

impl CrawlDriver {
    pub fn new(scope: CrawlScope, options: CrawlOptions) -> Self {
        CrawlDriver {
            scope,
            options,
            frontier: VecDeque::new(),
            visited: HashSet::new(),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    // Shared flag that makes the loop exit before the next pop
    //
    // main() wires this to Ctrl-C so an operator can bound the run
    // without killing the process mid-write.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    // Runs the crawl to completion and returns the per-page records
    //
    // Terminates because the visited ledger only grows and the site graph
    // is finite; with a budget, after at most `max_pages` processed pages.
    pub async fn crawl<F: PageFetcher>(mut self, seed: CrawlUrl, fetcher: &F) -> CrawlResult {
        self.frontier.push_back(seed);

        let mut records = Vec::new();

        loop {
            if self.stop.load(Ordering::Relaxed) {
                println!("🛑 Stop requested, ending crawl");
                break;
            }
            if let Some(budget) = self.options.max_pages {
                if records.len() >= budget {
                    println!("📊 Page budget of {} reached", budget);
                    break;
                }
            }

            let Some(url) = self.frontier.pop_front() else {
                break;
            };

            // The ledger, not the queue, is the source of truth: a URL
            // enqueued many times is processed at most once
            if self.visited.contains(url.as_str()) {
                continue;
            }
            self.visited.insert(url.as_str().to_string());

            println!("  Visiting [{}]: {}", records.len() + 1, url);
            records.push(self.visit_page(&url, fetcher).await);
        }

        CrawlResult { records }
    }

    // Processes one unseen URL: fetch, convert, write, harvest links
    //
    // Any failure ends the page's processing right there (no links are
    // harvested from a page we could not archive) but never the crawl.
    async fn visit_page<F: PageFetcher>(&mut self, url: &CrawlUrl, fetcher: &F) -> PageRecord {
        let html = match fetcher.render_page(url).await {
            Ok(html) => html,
            Err(e) => {
                let e = CrawlError::Fetch(e);
                eprintln!("  Warning: {} ({})", e, url);
                return PageRecord {
                    url: url.to_string(),
                    outcome: PageOutcome::FetchFailed,
                    message: Some(e.to_string()),
                };
            }
        };

        let markdown = match convert::html_to_markdown(&html) {
            Ok(markdown) => markdown,
            Err(e) => {
                eprintln!("  Warning: {} ({})", e, url);
                return PageRecord {
                    url: url.to_string(),
                    outcome: PageOutcome::ConvertFailed,
                    message: Some(e.to_string()),
                };
            }
        };

        let relative = map_to_path(url, &self.scope);
        let path = self.options.data_dir.join(&relative);
        if let Err(e) = output::persist(&path, &markdown) {
            // The page stays marked seen: it WAS fetched, retrying the
            // write within this run would not help
            eprintln!("  Warning: {} ({})", e, path.display());
            return PageRecord {
                url: url.to_string(),
                outcome: PageOutcome::WriteFailed,
                message: Some(e.to_string()),
            };
        }

        self.enqueue_links(url, &html);

        if !self.options.fetch_delay.is_zero() {
            // Polite crawling: small pause so we don't hammer the server
            tokio::time::sleep(self.options.fetch_delay).await;
        }

        PageRecord {
            url: url.to_string(),
            outcome: PageOutcome::Saved {
                path: relative.display().to_string(),
            },
            message: None,
        }
    }

    // Normalizes the page's links and pushes the in-scope ones
    //
    // Seen-status is deliberately NOT checked here; that happens at pop
    // time, where the check and the mark are one critical section.
    fn enqueue_links(&mut self, page: &CrawlUrl, html: &str) {
        // A CrawlUrl is a serialized Url, so this always reparses
        let Ok(base) = Url::parse(page.as_str()) else {
            return;
        };

        for raw in convert::extract_links(html) {
            let normalized = normalize(&raw, &base);
            if normalized.is_degraded() {
                eprintln!(
                    "  Warning: best-effort resolution for href '{}' on {}",
                    raw, page
                );
            }
            let link = normalized.into_url();
            if self.scope.in_scope(&link) {
                self.frontier.push_back(link);
            }
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is dedup done at pop time instead of at enqueue time?
//    - Checking at enqueue time would need a second set ("in queue OR
//      seen"), and the two sets could drift apart
//    - Checking at pop time needs only the visited ledger; the cost is a
//      few redundant queue entries, which is fine
//
// 2. Why does the budget count records instead of pops?
//    - A pop that hits the ledger costs nothing (no fetch happened)
//    - The budget bounds real work: pages fetched and processed
//
// 3. Why Arc<AtomicBool> for the stop flag?
//    - The Ctrl-C handler runs on another task and needs shared access
//    - An atomic bool is the smallest possible shared state: no lock,
//      just a relaxed load before each pop
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::scope::seed_url;
    use crate::fetch::FetchError;
    use reqwest::StatusCode;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::tempdir;

    // In-memory fetcher: a map of URL -> HTML plus a log of every fetch,
    // so tests can assert exactly which pages were rendered how often
    struct FakeFetcher {
        pages: HashMap<String, String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        fn new(pages: &[(&str, &str)]) -> Self {
            FakeFetcher {
                pages: pages
                    .iter()
                    .map(|(u, h)| (u.to_string(), h.to_string()))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl PageFetcher for FakeFetcher {
        async fn render_page(&self, url: &CrawlUrl) -> Result<String, FetchError> {
            self.calls.lock().unwrap().push(url.to_string());
            self.pages
                .get(url.as_str())
                .cloned()
                .ok_or(FetchError::Status(StatusCode::NOT_FOUND))
        }
    }

    fn driver(data_dir: PathBuf, max_pages: Option<usize>) -> CrawlDriver {
        let scope = CrawlScope::new("https://x.test/docs").unwrap();
        CrawlDriver::new(
            scope,
            CrawlOptions {
                data_dir,
                max_pages,
                fetch_delay: Duration::ZERO,
            },
        )
    }

    #[tokio::test]
    async fn test_end_to_end_scope_and_dedup() {
        // Page a links to b (with a fragment) and to an out-of-scope page;
        // b links back to a. Expected: a and b visited once each.
        let fetcher = FakeFetcher::new(&[
            (
                "https://x.test/docs/a",
                r#"<a href="https://x.test/docs/b#sec">b</a>
                   <a href="https://x.test/other">out</a>"#,
            ),
            (
                "https://x.test/docs/b",
                r#"<a href="/docs/a">back</a>"#,
            ),
        ]);
        let dir = tempdir().unwrap();

        let result = driver(dir.path().to_path_buf(), None)
            .crawl(seed_url("https://x.test/docs/a").unwrap(), &fetcher)
            .await;

        assert_eq!(result.pages_visited(), 2);
        assert_eq!(result.pages_saved(), 2);
        assert_eq!(
            fetcher.calls(),
            vec!["https://x.test/docs/a", "https://x.test/docs/b"]
        );
        assert!(dir.path().join("a.md").exists());
        assert!(dir.path().join("b.md").exists());
    }

    #[tokio::test]
    async fn test_each_url_fetched_at_most_once() {
        // Both pages link to each other and to themselves; the ledger must
        // still keep every URL down to a single fetch
        let fetcher = FakeFetcher::new(&[
            (
                "https://x.test/docs/a",
                r#"<a href="/docs/a">a</a><a href="/docs/b">b</a><a href="/docs/b">b</a>"#,
            ),
            (
                "https://x.test/docs/b",
                r#"<a href="/docs/a">a</a><a href="/docs/b">b</a>"#,
            ),
        ]);
        let dir = tempdir().unwrap();

        driver(dir.path().to_path_buf(), None)
            .crawl(seed_url("https://x.test/docs/a").unwrap(), &fetcher)
            .await;

        let mut calls = fetcher.calls();
        calls.sort();
        assert_eq!(calls, vec!["https://x.test/docs/a", "https://x.test/docs/b"]);
    }

    #[tokio::test]
    async fn test_budget_stops_the_crawl_early() {
        let fetcher = FakeFetcher::new(&[
            ("https://x.test/docs/a", r#"<a href="/docs/b">b</a>"#),
            ("https://x.test/docs/b", r#"<a href="/docs/c">c</a>"#),
            ("https://x.test/docs/c", ""),
        ]);
        let dir = tempdir().unwrap();

        let result = driver(dir.path().to_path_buf(), Some(2))
            .crawl(seed_url("https://x.test/docs/a").unwrap(), &fetcher)
            .await;

        assert_eq!(result.pages_visited(), 2);
        assert_eq!(fetcher.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_zero_budget_processes_nothing() {
        let fetcher = FakeFetcher::new(&[("https://x.test/docs/a", "")]);
        let dir = tempdir().unwrap();

        let result = driver(dir.path().to_path_buf(), Some(0))
            .crawl(seed_url("https://x.test/docs/a").unwrap(), &fetcher)
            .await;

        assert_eq!(result.pages_visited(), 0);
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_one_failing_page_does_not_abort_the_crawl() {
        // b is not in the fake fetcher's map, so it 404s; a and c must
        // still be archived and the run must complete
        let fetcher = FakeFetcher::new(&[
            (
                "https://x.test/docs/a",
                r#"<a href="/docs/b">b</a><a href="/docs/c">c</a>"#,
            ),
            ("https://x.test/docs/c", "<p>c</p>"),
        ]);
        let dir = tempdir().unwrap();

        let result = driver(dir.path().to_path_buf(), None)
            .crawl(seed_url("https://x.test/docs/a").unwrap(), &fetcher)
            .await;

        assert_eq!(result.pages_visited(), 3);
        assert_eq!(result.pages_saved(), 2);
        assert!(dir.path().join("a.md").exists());
        assert!(!dir.path().join("b.md").exists());
        assert!(dir.path().join("c.md").exists());

        let failed: Vec<_> = result.records.iter().filter(|r| !r.is_ok()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].url, "https://x.test/docs/b");
        assert!(matches!(failed[0].outcome, PageOutcome::FetchFailed));
    }

    #[tokio::test]
    async fn test_write_failure_is_isolated_and_not_retried() {
        // Pointing data_dir at a regular file makes every persist fail;
        // the page must be recorded as WriteFailed, stay marked seen after
        // its single fetch, and the run must still complete
        let fetcher = FakeFetcher::new(&[(
            "https://x.test/docs/a",
            r#"<a href="/docs/a">self</a>"#,
        )]);
        let dir = tempdir().unwrap();
        let not_a_dir = dir.path().join("blocker");
        std::fs::write(&not_a_dir, "plain file").unwrap();

        let result = driver(not_a_dir, None)
            .crawl(seed_url("https://x.test/docs/a").unwrap(), &fetcher)
            .await;

        assert_eq!(result.pages_visited(), 1);
        assert_eq!(result.pages_saved(), 0);
        assert!(matches!(result.records[0].outcome, PageOutcome::WriteFailed));
        assert_eq!(fetcher.calls(), vec!["https://x.test/docs/a"]);
    }

    #[tokio::test]
    async fn test_failed_page_is_not_retried() {
        // a links to the missing page twice; it must be fetched once
        let fetcher = FakeFetcher::new(&[(
            "https://x.test/docs/a",
            r#"<a href="/docs/gone">x</a><a href="/docs/gone#again">x</a>"#,
        )]);
        let dir = tempdir().unwrap();

        driver(dir.path().to_path_buf(), None)
            .crawl(seed_url("https://x.test/docs/a").unwrap(), &fetcher)
            .await;

        let gone_fetches = fetcher
            .calls()
            .iter()
            .filter(|u| u.as_str() == "https://x.test/docs/gone")
            .count();
        assert_eq!(gone_fetches, 1);
    }

    #[tokio::test]
    async fn test_stop_flag_ends_the_run_before_the_next_pop() {
        let fetcher = FakeFetcher::new(&[("https://x.test/docs/a", "")]);
        let dir = tempdir().unwrap();

        let driver = driver(dir.path().to_path_buf(), None);
        driver.stop_flag().store(true, Ordering::Relaxed);

        let result = driver
            .crawl(seed_url("https://x.test/docs/a").unwrap(), &fetcher)
            .await;

        assert_eq!(result.pages_visited(), 0);
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_seed_outside_scope_links_stay_contained() {
        // Scope containment: nothing outside /docs is ever fetched even
        // when pages link out aggressively
        let fetcher = FakeFetcher::new(&[(
            "https://x.test/docs/a",
            r#"<a href="https://x.test/blog/x">blog</a>
               <a href="https://elsewhere.test/docs/a">foreign</a>"#,
        )]);
        let dir = tempdir().unwrap();

        driver(dir.path().to_path_buf(), None)
            .crawl(seed_url("https://x.test/docs/a").unwrap(), &fetcher)
            .await;

        assert_eq!(fetcher.calls(), vec!["https://x.test/docs/a"]);
    }
}
