// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// docs-mirror is a single-purpose tool, so unlike a multi-command CLI there
// are no subcommands here: just three positional arguments (the seed page,
// the scope root, and the merged output file) plus a few optional flags.
//
// clap's "derive" API lets us describe the whole surface as one struct with
// attributes; parsing, --help and --version all come for free.
// =============================================================================

use clap::Parser;
use std::path::PathBuf;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "docs-mirror",
    version = "0.1.0",
    about = "Crawl a documentation site and merge it into one markdown file",
    long_about = "docs-mirror crawls a documentation website starting from a seed page, \
                  follows every link that stays under the scope root, converts each page \
                  to markdown, and finally concatenates all pages into a single output file."
)]
pub struct Cli {
    /// Seed page the crawl starts from (e.g. https://docs.example.com/docs/intro)
    pub start_url: String,

    /// Scope root; only pages under this URL are crawled
    /// (e.g. https://docs.example.com/docs)
    pub base_url: String,

    /// Path of the merged output file (e.g. docs.md)
    pub output_file: PathBuf,

    /// Maximum number of pages to process before stopping
    ///
    /// When absent the crawl runs until the frontier is empty.
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Directory the per-page markdown files are written into
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Per-request fetch timeout in seconds
    ///
    /// Without a timeout a single unresponsive page would stall the
    /// whole crawl indefinitely.
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// Output the per-page crawl report as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}
