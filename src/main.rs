// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Validate the start/base URLs into a seed and a crawl scope
//    (configuration errors are fatal, the crawl never starts)
// 3. Run the sequential crawl loop
// 4. Print the per-page run report (table or JSON)
// 5. Merge everything under the data directory into the output file
// 6. Exit with proper code (0 = pages archived, 1 = nothing archived,
//    2 = fatal error)
//
// Aggregation always runs, even when every page failed: the degenerate
// zero-page run still produces an (empty) output file.
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli;        // src/cli.rs - command-line parsing
mod convert;    // src/convert/ - HTML to markdown + link extraction
mod crawl;      // src/crawl/ - the crawl traversal engine
mod error;      // src/error.rs - the crawl error taxonomy
mod fetch;      // src/fetch/ - the page fetcher
mod output;     // src/output/ - per-page writes and final aggregation

use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use cli::Cli;
use crawl::{CrawlDriver, CrawlOptions, CrawlResult, CrawlScope, PageOutcome};
use fetch::HttpFetcher;

/// Pause between successful fetches (polite crawling)
const FETCH_DELAY: Duration = Duration::from_millis(100);

// The #[tokio::main] attribute transforms our async main into a real main
// function; it creates a tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// The main application logic
// Returns:
//   Ok(0) = at least one page archived
//   Ok(1) = zero pages successfully visited
//   Err   = fatal error (bad configuration, aggregation I/O failure)
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    // Fatal configuration checks happen up front, before any fetching
    let scope = CrawlScope::new(&cli.base_url)?;
    let seed = crawl::seed_url(&cli.start_url)?;

    println!("🔍 Mirroring from: {}", seed);
    println!("🌐 Scope root:     {}", cli.base_url);
    match cli.max_pages {
        Some(n) => println!("📊 Page budget:    {}", n),
        None => println!("📊 Page budget:    unbounded"),
    }

    let fetcher = HttpFetcher::new(Duration::from_secs(cli.timeout))?;
    let driver = CrawlDriver::new(
        scope,
        CrawlOptions {
            data_dir: cli.data_dir.clone(),
            max_pages: cli.max_pages,
            fetch_delay: FETCH_DELAY,
        },
    );

    // Ctrl-C raises the stop flag; the loop exits before its next pop
    let stop = driver.stop_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.store(true, Ordering::Relaxed);
        }
    });

    let result = driver.crawl(seed, &fetcher).await;

    print_report(&result, cli.json)?;

    // Aggregation runs regardless of how many pages failed
    let merged = output::aggregate(&cli.data_dir, &cli.output_file)?;
    println!(
        "📦 Merged {} document(s) into {}",
        merged,
        cli.output_file.display()
    );

    if result.pages_saved() == 0 {
        Ok(1) // Nothing was archived: total failure
    } else {
        Ok(0)
    }
}

// Prints the run report either as a table or JSON
fn print_report(result: &CrawlResult, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(&result.records)?;
        println!("{}", json_output);
    } else {
        print_table(result);
    }
    Ok(())
}

// Prints the run report as a human-readable table in the terminal
fn print_table(result: &CrawlResult) {
    println!();
    println!("{:<60} {:<25} {:<15}", "URL", "OUTPUT", "STATUS");
    println!("{}", "=".repeat(100));

    for record in &result.records {
        let (output, status) = match &record.outcome {
            PageOutcome::Saved { path } => (path.as_str(), "✅ SAVED"),
            PageOutcome::FetchFailed => ("", "❌ FETCH FAILED"),
            PageOutcome::ConvertFailed => ("", "❌ CONVERT FAILED"),
            PageOutcome::WriteFailed => ("", "❌ WRITE FAILED"),
        };

        // Truncate URL if too long for display
        let url_display = if record.url.len() > 57 {
            format!("{}...", &record.url[..57])
        } else {
            record.url.clone()
        };

        println!("{:<60} {:<25} {:<15}", url_display, output, status);
    }

    println!();
    println!("📊 Summary:");
    println!("   ✅ Archived: {}", result.pages_saved());
    println!(
        "   ❌ Failed:   {}",
        result.pages_visited() - result.pages_saved()
    );
    println!("   📋 Visited:  {}", result.pages_visited());
}
