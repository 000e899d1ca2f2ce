//! Web search used by the title and text-fingerprint strategies.
//!
//! The default provider scrapes the DuckDuckGo HTML endpoint, which serves
//! plain markup without JavaScript and tolerates automated clients better
//! than the big engines.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use crate::error::{DocidentError, Result};
use crate::http::RateLimitedClient;

/// One ranked search result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub snippet: String,
}

impl SearchHit {
    /// Everything the identifier scanner should look at for this hit.
    pub fn scannable_text(&self) -> String {
        format!("{}\n{}\n{}", self.url, self.title, self.snippet)
    }
}

/// Seam for the web-search strategies; swapped for a canned provider in
/// tests.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}

/// Scrapes the `html.duckduckgo.com/html/` endpoint.
pub struct DuckDuckGoSearch {
    client: RateLimitedClient,
    base_url: String,
}

static UDDG_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]uddg=([^&]+)").expect("valid uddg regex"));

impl DuckDuckGoSearch {
    pub fn new() -> Self {
        Self::with_params("https://html.duckduckgo.com", Duration::from_secs(1))
    }

    pub fn with_params(base_url: &str, min_interval: Duration) -> Self {
        Self {
            client: RateLimitedClient::new(min_interval, 2, concat!("docident/", env!("CARGO_PKG_VERSION"))),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn parse_result_page(html: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        let result_selector = parse_selector("div.result, div.web-result")?;
        let link_selector = parse_selector("a.result__a")?;
        let snippet_selector = parse_selector("a.result__snippet, div.result__snippet")?;

        let document = Html::parse_document(html);
        let mut hits = Vec::new();
        for result in document.select(&result_selector) {
            let Some(anchor) = result.select(&link_selector).next() else {
                continue;
            };
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let url = resolve_result_url(href);
            if url.is_empty() {
                continue;
            }
            let title = element_text(&anchor);
            let snippet = result
                .select(&snippet_selector)
                .next()
                .map(|el| element_text(&el))
                .unwrap_or_default();

            hits.push(SearchHit { url, title, snippet });
            if hits.len() >= max_results {
                break;
            }
        }
        Ok(hits)
    }
}

impl Default for DuckDuckGoSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        let url = format!(
            "{}/html/?q={}",
            self.base_url,
            urlencoding::encode(query)
        );
        debug!(query, max_results, "running web search");
        let html = self.client.get(&url).await?;
        Self::parse_result_page(&html, max_results)
    }
}

/// Result links come back as redirects of the form
/// `//duckduckgo.com/l/?uddg=<encoded-target>&...`; unwrap to the target.
fn resolve_result_url(href: &str) -> String {
    if let Some(caps) = UDDG_PARAM.captures(href) {
        let encoded = &caps[1];
        if let Ok(decoded) = urlencoding::decode(encoded) {
            return decoded.into_owned();
        }
    }
    if href.starts_with("//") {
        return format!("https:{href}");
    }
    href.to_string()
}

fn parse_selector(input: &str) -> Result<Selector> {
    Selector::parse(input)
        .map_err(|e| DocidentError::Parse(format!("invalid selector {input}: {e}")))
}

fn element_text(element: &scraper::ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
