// src/fetch/http.rs
// =============================================================================
// Fetches real web pages over HTTP.
//
// How it works:
// 1. GET the identifier (which must be an http/https URL)
// 2. Non-2xx responses count as failures ("HTTP 404")
// 3. The body is the page content
// 4. References are the links found in the body: Markdown documents go
//    through pulldown-cmark, everything else through scraper
// 5. Optionally only links on the seed's host are followed, so the crawl
//    stays on one site
//
// Identifiers are normalized URLs (parsed by `url`, no #fragment). The seed
// goes through the same normalization, see `HttpFetcher::seed`.
// =============================================================================

use super::links::{extract_html_links, extract_markdown_links};
use super::{Fetcher, Identifier, Page};
use crate::error::{CrawlError, FetchError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    // Normalized form of the seed URL
    seed: Identifier,
    // When set, references on other hosts are dropped
    host: Option<String>,
}

impl HttpFetcher {
    /// Builds a fetcher for a crawl starting at `seed`.
    ///
    /// With `same_domain`, the crawl never leaves the seed's host (a domain
    /// name or an IP address).
    pub fn new(seed: &str, same_domain: bool) -> Result<Self> {
        let mut start = Url::parse(seed).map_err(|e| CrawlError::InvalidSeed {
            url: seed.to_string(),
            reason: e.to_string(),
        })?;

        if start.scheme() != "http" && start.scheme() != "https" {
            return Err(CrawlError::InvalidSeed {
                url: seed.to_string(),
                reason: format!("unsupported scheme '{}'", start.scheme()),
            });
        }

        let host = if same_domain {
            let host = start.host_str().ok_or_else(|| CrawlError::InvalidSeed {
                url: seed.to_string(),
                reason: "URL has no host".to_string(),
            })?;
            Some(host.to_string())
        } else {
            None
        };

        start.set_fragment(None);

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            seed: start.to_string(),
            host,
        })
    }

    /// The seed spelled the way discovered links are spelled
    /// (`https://example.com` becomes `https://example.com/`). Start the
    /// crawl from this, not from the raw input.
    pub fn seed(&self) -> &str {
        &self.seed
    }

    fn keep(&self, link: &str) -> bool {
        match &self.host {
            None => true,
            Some(host) => Url::parse(link)
                .map(|url| url.host_str() == Some(host.as_str()))
                .unwrap_or(false),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, id: &str) -> std::result::Result<Page, FetchError> {
        let url = Url::parse(id).map_err(|_| FetchError::InvalidIdentifier(id.to_string()))?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http { status: status.as_u16() });
        }

        let final_url = response.url().clone();
        let is_markdown = is_markdown(
            response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            &final_url,
        );

        let body = response.text().await?;

        // Resolve against the URL after redirects, like a browser would
        let links = if is_markdown {
            extract_markdown_links(&body, final_url.as_str())
        } else {
            extract_html_links(&body, final_url.as_str())
        };

        let references = links.into_iter().filter(|link| self.keep(link)).collect();

        Ok(Page::new(body, references))
    }
}

fn is_markdown(content_type: Option<&str>, url: &Url) -> bool {
    if let Some(ct) = content_type {
        if ct.starts_with("text/markdown") || ct.starts_with("text/x-markdown") {
            return true;
        }
    }
    url.path().ends_with(".md")
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why store the seed inside the fetcher?
//    - Url::parse normalizes: "https://example.com" becomes
//      "https://example.com/"
//    - Links found in pages are normalized the same way
//    - If the raw seed were used, the home page would be two different
//      identifiers and would be fetched twice
//
// 2. host_str() vs domain()
//    - domain() is None for IP addresses like 127.0.0.1
//    - host_str() returns the host either way
//
// 3. What does `?` do on `send().await?`?
//    - On error, it converts the reqwest::Error into a FetchError (via the
//      From impl in error.rs) and returns early
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::Crawler;
    use crate::report::CollectingSink;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    // Serves "/" (linking back to itself and to /about) and "/about"
    async fn serve_site() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let (mut socket, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 4096];
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(&buf[..n]);
                    let path = request.split_whitespace().nth(1).unwrap_or("/");

                    let (status, body) = match path {
                        "/" => ("200 OK", r#"<a href="/">Home</a> <a href="/about#team">About</a>"#),
                        "/about" => ("200 OK", r#"<a href="/">Home</a>"#),
                        _ => ("404 Not Found", ""),
                    };
                    let response = format!(
                        "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{}", addr)
    }

    #[test]
    fn test_seed_is_normalized() {
        let fetcher = HttpFetcher::new("https://example.com#top", true).unwrap();
        assert_eq!(fetcher.seed(), "https://example.com/");
    }

    #[test]
    fn test_ip_seed_with_same_domain() {
        let fetcher = HttpFetcher::new("http://127.0.0.1:8080/", true).unwrap();
        assert!(fetcher.keep("http://127.0.0.1:8080/docs"));
        assert!(!fetcher.keep("http://10.0.0.1/"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_site_root_fetched_once() {
        // No trailing slash: the page's own href="/" must map to the same node
        let base = serve_site().await;
        let fetcher = HttpFetcher::new(&base, true).unwrap();
        let seed = fetcher.seed().to_string();
        let sink = Arc::new(CollectingSink::new());

        let crawler = Crawler::new(fetcher).with_sink(Arc::clone(&sink));
        crawler.run(seed).await;

        assert_eq!(
            sink.found_ids(),
            vec![format!("{}/", base), format!("{}/about", base)]
        );
        assert!(sink.failed_ids().is_empty());
    }

    #[test]
    fn test_rejects_invalid_seed() {
        let result = HttpFetcher::new("not a url", true);
        assert!(matches!(result, Err(CrawlError::InvalidSeed { .. })));
    }

    #[test]
    fn test_rejects_non_http_seed() {
        let result = HttpFetcher::new("ftp://example.com/", false);
        assert!(matches!(result, Err(CrawlError::InvalidSeed { .. })));
    }

    #[test]
    fn test_same_domain_filter() {
        let fetcher = HttpFetcher::new("https://example.com/", true).unwrap();
        assert!(fetcher.keep("https://example.com/docs"));
        assert!(!fetcher.keep("https://other.com/"));
    }

    #[test]
    fn test_any_domain_keeps_everything() {
        let fetcher = HttpFetcher::new("https://example.com/", false).unwrap();
        assert!(fetcher.keep("https://other.com/"));
    }

    #[test]
    fn test_markdown_detection() {
        let readme = Url::parse("https://example.com/README.md").unwrap();
        let page = Url::parse("https://example.com/index.html").unwrap();
        assert!(is_markdown(None, &readme));
        assert!(is_markdown(Some("text/markdown; charset=utf-8"), &page));
        assert!(!is_markdown(Some("text/html"), &page));
    }

    #[tokio::test]
    async fn test_invalid_identifier_is_fetch_error() {
        let fetcher = HttpFetcher::new("https://example.com/", false).unwrap();
        let err = fetcher.fetch("relative/path").await.unwrap_err();
        assert_eq!(err, FetchError::InvalidIdentifier("relative/path".to_string()));
    }
}
