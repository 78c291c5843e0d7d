// src/output/mod.rs
// =============================================================================
// This module owns all disk I/O:
//
// - persist(): write one page's markdown, creating parent directories on
//   demand (the path mapper produces at most one directory level)
// - aggregate(): after the crawl loop has finished, walk the document root,
//   collect every .md file except the output file itself, and concatenate
//   them into the single merged file
//
// The aggregate order is made deterministic by sorting the collected
// relative paths lexicographically, so the same crawl always produces a
// byte-identical merged file regardless of filesystem enumeration order.
// =============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::CrawlError;

/// Separator emitted after each document in the merged file
const DOCUMENT_SEPARATOR: &str = "---";

// Writes one document, creating missing parent directories first
pub fn persist(path: &Path, content: &str) -> Result<(), CrawlError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

// Merges every .md document under `document_root` into `output_file`
//
// Each document is emitted as a header line naming its path relative to
// the root, the document body, and a trailing separator line:
//
//   # File: guide/intro.md
//   <body>
//   ---
//
// The output file itself is excluded even when it lives under the
// document root. A missing or empty root is the zero-successful-pages
// case and still produces the (empty) output file.
//
// Returns the number of documents merged.
pub fn aggregate(document_root: &Path, output_file: &Path) -> Result<usize> {
    if let Some(parent) = output_file.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }

    let mut documents = Vec::new();
    if document_root.is_dir() {
        collect_markdown(document_root, document_root, output_file, &mut documents)?;
    }

    // Lexicographic order for reproducible output
    documents.sort();

    let mut merged = String::new();
    for relative in &documents {
        let body = fs::read_to_string(document_root.join(relative))
            .with_context(|| format!("reading {}", relative.display()))?;

        merged.push_str(&format!("# File: {}\n", relative.display()));
        merged.push_str(&body);
        if !body.ends_with('\n') {
            merged.push('\n');
        }
        merged.push_str(DOCUMENT_SEPARATOR);
        merged.push('\n');
    }

    fs::write(output_file, merged)
        .with_context(|| format!("writing {}", output_file.display()))?;

    Ok(documents.len())
}

// Recursively collects the root-relative paths of all .md files,
// skipping the output file itself
fn collect_markdown(
    dir: &Path,
    root: &Path,
    output_file: &Path,
    documents: &mut Vec<PathBuf>,
) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            collect_markdown(&path, root, output_file, documents)?;
        } else if path.extension().is_some_and(|ext| ext == "md") && !is_same_file(&path, output_file)
        {
            if let Ok(relative) = path.strip_prefix(root) {
                documents.push(relative.to_path_buf());
            }
        }
    }
    Ok(())
}

// Compares two paths by canonical form where possible
//
// The output file usually does not exist yet on the first run, so a failed
// canonicalize on either side falls back to comparing the raw paths.
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
