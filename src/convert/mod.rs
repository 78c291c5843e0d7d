// src/convert/mod.rs
// =============================================================================
// This module turns fetched HTML into the two things the crawler needs
// from it:
//
// - A markdown rendering of the page body (via the `htmd` crate)
// - The raw href values of every anchor on the page (via `scraper`)
//
// Link extraction is total: it never fails and an empty result is valid.
// Conversion is treated as effectively total too; on the rare htmd error
// the driver isolates the page exactly like a failed fetch.
// =============================================================================

use scraper::{Html, Selector};

use crate::error::CrawlError;

// Converts an HTML page body to markdown
pub fn html_to_markdown(html: &str) -> Result<String, CrawlError> {
    let converter = htmd::HtmlToMarkdown::builder().build();
    converter
        .convert(html)
        .map_err(|e| CrawlError::Convert(e.to_string()))
}

// Extracts the raw href value of every anchor on a page
//
// The values come back exactly as written (relative, absolute, with
// fragments, whatever) — resolving them against the page URL is the
// normalizer's job. Non-web schemes and pure fragment jumps are skipped
// here because they can never become crawlable pages.
pub fn extract_links(html: &str) -> Vec<String> {
    let mut links = Vec::new();

    let document = Html::parse_document(html);

    // Selector::parse returns Result, so we use .unwrap() which panics on
    // error. This is OK here because our selector is a constant and known
    // to be valid.
    let selector = Selector::parse("a[href]").unwrap();

    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            if is_crawlable(href) {
                links.push(href.to_string());
            }
        }
    }

    links
}

// Filters out hrefs that can never resolve to a fetchable page
fn is_crawlable(href: &str) -> bool {
    !(href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
        || href.starts_with("data:"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_relative_and_absolute() {
        let html = r#"
            <a href="https://example.com/docs/a">A</a>
            <a href="/docs/b">B</a>
            <a href="../c">C</a>
        "#;
        let links = extract_links(html);
        assert_eq!(
            links,
            vec!["https://example.com/docs/a", "/docs/b", "../c"]
        );
    }

    #[test]
    fn test_extract_skips_non_web_schemes() {
        // The fragment href needs the double-# raw string delimiter so the
        // literal's own "# sequence doesn't end it early
        let html = r##"
            <a href="mailto:docs@example.com">Mail</a>
            <a href="javascript:void(0)">JS</a>
            <a href="#top">Top</a>
            <a href="/docs/real">Real</a>
        "##;
        let links = extract_links(html);
        assert_eq!(links, vec!["/docs/real"]);
    }

    #[test]
    fn test_extract_empty_page() {
        assert!(extract_links("<p>no links here</p>").is_empty());
    }

    #[test]
    fn test_html_to_markdown_keeps_text_and_links() {
        let md = html_to_markdown(
            r#"<h1>Title</h1><p>Hello <a href="/docs/b">there</a></p>"#,
        )
        .unwrap();
        assert!(md.contains("Title"));
        assert!(md.contains("Hello"));
        assert!(md.contains("/docs/b"));
    }
}
