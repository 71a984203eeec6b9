//! # Web Search
//!
//! Search providers (Brave, ZenSERP) and page fetching. Providers are
//! interchangeable and selected per call, defaulting to the configured one.

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::AppConfig;
use crate::error::SearchError;

const MAX_RESULTS_BRAVE: usize = 5;
const MAX_RESULTS_ZENSERP: usize = 10;
const MAX_PAGE_CHARS: usize = 5000;

/// One web search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub position: Option<u32>,
    pub title: String,
    pub link: String,
    pub snippet: String,
}

/// Supported search providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchProviderKind {
    Brave,
    ZenSerp,
}

impl SearchProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchProviderKind::Brave => "brave",
            SearchProviderKind::ZenSerp => "zenserp",
        }
    }
}

impl FromStr for SearchProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "brave" => Ok(SearchProviderKind::Brave),
            // historically called "serpapi" before the ZenSERP migration
            "zenserp" | "serpapi" => Ok(SearchProviderKind::ZenSerp),
            other => Err(format!("unknown search provider: {other}")),
        }
    }
}

/// Web search and page-fetch collaborator. Carries no session state; safe
/// to share across concurrent sessions.
pub struct SearchService {
    default_provider: SearchProviderKind,
    brave_api_key: Option<String>,
    zenserp_api_key: Option<String>,
    search_timeout: std::time::Duration,
    page_fetch_timeout: std::time::Duration,
    client: reqwest::Client,
}

impl SearchService {
    pub fn new(config: &AppConfig, client: reqwest::Client) -> Self {
        Self {
            default_provider: config.search_provider,
            brave_api_key: config.brave_api_key.clone(),
            zenserp_api_key: config.zenserp_api_key.clone(),
            search_timeout: config.search_timeout,
            page_fetch_timeout: config.page_fetch_timeout,
            client,
        }
    }

    /// Search with the given provider, or the configured default.
    pub async fn search(
        &self,
        query: &str,
        provider_override: Option<SearchProviderKind>,
    ) -> Result<Vec<SearchResult>, SearchError> {
        match provider_override.unwrap_or(self.default_provider) {
            SearchProviderKind::Brave => self.search_brave(query).await,
            SearchProviderKind::ZenSerp => self.search_zenserp(query).await,
        }
    }

    /// Brave Search API. Response shape:
    /// `{ "web": { "results": [ { "title", "url", "description" }, ... ] } }`
    pub async fn search_brave(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let api_key = self
            .brave_api_key
            .as_deref()
            .ok_or(SearchError::MissingApiKey("BRAVE_SEARCH_API_KEY"))?;

        let response = self
            .client
            .get("https://api.search.brave.com/res/v1/web/search")
            .header("Accept", "application/json")
            .header("X-Subscription-Token", api_key)
            .timeout(self.search_timeout)
            .query(&[
                ("q", query),
                ("count", &MAX_RESULTS_BRAVE.to_string()),
                ("country", "us"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let data: Value = response.json().await?;
        let results = parse_brave_results(&data);
        debug!(count = results.len(), "brave search complete");
        Ok(results)
    }

    /// ZenSERP search API.
    pub async fn search_zenserp(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let api_key = self
            .zenserp_api_key
            .as_deref()
            .ok_or(SearchError::MissingApiKey("ZENSERP_API_KEY"))?;

        let response = self
            .client
            .get("https://app.zenserp.com/api/v2/search")
            .timeout(self.search_timeout)
            .query(&[("apikey", api_key), ("q", query)])
            .send()
            .await?
            .error_for_status()?;

        let data: Value = response.json().await?;
        let results = parse_zenserp_results(&data);
        debug!(count = results.len(), "zenserp search complete");
        Ok(results)
    }

    /// Fetch a page and reduce it to plain text, capped at 5000 chars.
    ///
    /// Companion to `search` for callers that want the page behind a hit;
    /// no built-in route calls it.
    pub async fn get_web_page(&self, url: &str) -> Result<String, SearchError> {
        let response = self
            .client
            .get(url)
            .timeout(self.page_fetch_timeout)
            .send()
            .await?
            .error_for_status()?;
        let html = response.text().await?;
        Ok(html_to_text(&html))
    }
}

fn parse_brave_results(data: &Value) -> Vec<SearchResult> {
    let web_results = data["web"]["results"].as_array();
    web_results
        .map(|results| {
            results
                .iter()
                .take(MAX_RESULTS_BRAVE)
                .enumerate()
                .map(|(i, r)| SearchResult {
                    position: Some(i as u32 + 1),
                    title: str_field(r, "title"),
                    link: str_field(r, "url"),
                    snippet: str_field(r, "description"),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_zenserp_results(data: &Value) -> Vec<SearchResult> {
    let organic = data["organic"].as_array();
    organic
        .map(|results| {
            results
                .iter()
                .take(MAX_RESULTS_ZENSERP)
                .map(|r| SearchResult {
                    position: r["position"]
                        .as_u64()
                        .or_else(|| r["rank"].as_u64())
                        .map(|p| p as u32),
                    title: str_field(r, "title"),
                    link: str_field(r, "url"),
                    snippet: str_field(r, "description"),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn str_field(value: &Value, key: &str) -> String {
    value[key].as_str().unwrap_or_default().to_string()
}

/// Basic HTML-to-text: drop scripts and styles, turn remaining tags into
/// line breaks, collapse blank lines.
fn html_to_text(html: &str) -> String {
    static SCRIPT_RE: OnceLock<Regex> = OnceLock::new();
    static STYLE_RE: OnceLock<Regex> = OnceLock::new();
    static TAG_RE: OnceLock<Regex> = OnceLock::new();

    let script_re = SCRIPT_RE
        .get_or_init(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid regex"));
    let style_re =
        STYLE_RE.get_or_init(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("valid regex"));
    let tag_re = TAG_RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("valid regex"));

    let text = script_re.replace_all(html, "");
    let text = style_re.replace_all(&text, "");
    let text = tag_re.replace_all(&text, "\n");

    let cleaned: String = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    cleaned.chars().take(MAX_PAGE_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_from_str_accepts_legacy_name() {
        assert_eq!(
            "serpapi".parse::<SearchProviderKind>().unwrap(),
            SearchProviderKind::ZenSerp
        );
    }

    #[test]
    fn test_parse_brave_results() {
        let data = json!({
            "web": { "results": [
                { "title": "Alan Turing", "url": "https://example.com/turing", "description": "Mathematician" }
            ]}
        });
        let results = parse_brave_results(&data);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].position, Some(1));
        assert_eq!(results[0].link, "https://example.com/turing");
    }

    #[test]
    fn test_parse_brave_missing_web_block() {
        assert!(parse_brave_results(&json!({})).is_empty());
    }

    #[test]
    fn test_parse_zenserp_rank_fallback() {
        let data = json!({
            "organic": [
                { "rank": 3, "title": "t", "url": "u", "description": "d" }
            ]
        });
        let results = parse_zenserp_results(&data);
        assert_eq!(results[0].position, Some(3));
    }

    #[test]
    fn test_html_to_text_strips_scripts_and_tags() {
        let html = "<html><head><style>p{color:red}</style></head>\
                    <body><script>alert(1)</script><p>Hello</p>\n\n<p>World</p></body></html>";
        let text = html_to_text(html);
        assert_eq!(text, "Hello\nWorld");
    }

    #[test]
    fn test_html_to_text_caps_length() {
        let html = format!("<p>{}</p>", "x".repeat(10_000));
        assert_eq!(html_to_text(&html).len(), MAX_PAGE_CHARS);
    }
}
