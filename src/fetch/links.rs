// src/fetch/links.rs
// =============================================================================
// Pulls outgoing references out of fetched documents.
//
// - HTML: every <a href> (via `scraper`)
// - Markdown: every [text](url) link (via `pulldown-cmark`)
//
// Both resolve relative links against the document's own URL, keep only
// http/https targets, and drop the #fragment so that "page#a" and "page#b"
// name the same node.
// =============================================================================

use pulldown_cmark::{Event, Parser, Tag};
use scraper::{Html, Selector};
use url::Url;

/// Extracts all absolute http(s) links from an HTML page.
///
/// Example:
///   html = "<a href='/docs'>Docs</a>", base_url = "https://example.com"
///   -> ["https://example.com/docs"]
pub fn extract_html_links(html: &str, base_url: &str) -> Vec<String> {
    let base = match Url::parse(base_url) {
        Ok(url) => url,
        Err(_) => return Vec::new(),
    };

    let document = Html::parse_document(html);
    // The selector is a constant, so parsing it cannot fail at runtime
    let selector = Selector::parse("a[href]").unwrap();

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(&base, href))
        .collect()
}

/// Extracts all absolute http(s) links from a Markdown document.
pub fn extract_markdown_links(markdown: &str, base_url: &str) -> Vec<String> {
    let base = match Url::parse(base_url) {
        Ok(url) => url,
        Err(_) => return Vec::new(),
    };

    let mut links = Vec::new();

    // pulldown-cmark 0.9: Tag::Link(link_type, dest_url, title)
    for event in Parser::new(markdown) {
        if let Event::Start(Tag::Link(_link_type, dest_url, _title)) = event {
            if let Some(url) = resolve_link(&base, &dest_url) {
                links.push(url);
            }
        }
    }

    links
}

// Resolves a link (possibly relative) to an absolute, fragment-free URL.
// Returns None for anchors, non-http schemes and unparseable hrefs.
pub(crate) fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    let mut url = base.join(href).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.set_fragment(None);
    Some(url.to_string())
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is filter_map?
//    - Like map, but the closure returns an Option
//    - None values are skipped, Some(x) values are kept as x
//
// 2. Why drop the #fragment?
//    - "page#intro" and "page#usage" are the same document
//    - Keeping fragments would fetch the same page once per anchor
//
// 3. What does base.join(href) do?
//    - Resolves href like a browser: "/docs", "../x" and absolute URLs all
//      come out as absolute URLs
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_absolute_link() {
        let base = Url::parse("https://example.com/page").unwrap();
        let result = resolve_link(&base, "https://other.com");
        assert_eq!(result, Some("https://other.com/".to_string()));
    }

    #[test]
    fn test_resolve_relative_link() {
        let base = Url::parse("https://example.com/page").unwrap();
        let result = resolve_link(&base, "/docs");
        assert_eq!(result, Some("https://example.com/docs".to_string()));
    }

    #[test]
    fn test_strip_fragment() {
        let base = Url::parse("https://example.com/").unwrap();
        let result = resolve_link(&base, "/guide#install");
        assert_eq!(result, Some("https://example.com/guide".to_string()));
    }

    #[test]
    fn test_skip_anchor() {
        let base = Url::parse("https://example.com/page").unwrap();
        assert_eq!(resolve_link(&base, "#section"), None);
    }

    #[test]
    fn test_skip_mailto() {
        let base = Url::parse("https://example.com/page").unwrap();
        assert_eq!(resolve_link(&base, "mailto:test@example.com"), None);
    }

    #[test]
    fn test_skip_ftp() {
        let base = Url::parse("https://example.com/page").unwrap();
        assert_eq!(resolve_link(&base, "ftp://example.com/file"), None);
    }

    #[test]
    fn test_html_multiple_links() {
        let html = r#"
            <a href="https://rust-lang.org">Rust</a>
            <a href="/docs">Docs</a>
            <a href="../about">About</a>
            <a href="mailto:me@example.com">Mail</a>
        "#;
        let links = extract_html_links(html, "https://example.com/page/");
        assert_eq!(
            links,
            vec![
                "https://rust-lang.org/",
                "https://example.com/docs",
                "https://example.com/about",
            ]
        );
    }

    #[test]
    fn test_html_invalid_base() {
        let links = extract_html_links(r#"<a href="/x">x</a>"#, "not a url");
        assert!(links.is_empty());
    }

    #[test]
    fn test_markdown_links_resolved() {
        let markdown = r#"
# Resources

- [Rust](https://www.rust-lang.org)
- [Guide](./guide.md)
- [Email](mailto:test@example.com)
        "#;
        let links = extract_markdown_links(markdown, "https://example.com/docs/README.md");
        assert_eq!(
            links,
            vec!["https://www.rust-lang.org/", "https://example.com/docs/guide.md"]
        );
    }
}
