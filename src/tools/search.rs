//! DuckDuckGo search tool.
//!
//! Web search via DuckDuckGo's HTML interface. No API key required.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::error::{ParleyError, Result};
use crate::tool::{Tool, ToolRegistry};
use crate::tools::truncate_snippet;

/// A single ranked search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub href: String,
    pub body: String,
}

/// Configuration for the DuckDuckGo tool.
#[derive(Clone)]
pub struct DuckDuckGoConfig {
    pub max_results: usize,
    pub timeout_secs: u64,
}

impl Default for DuckDuckGoConfig {
    fn default() -> Self {
        Self {
            max_results: 3,
            timeout_secs: 10,
        }
    }
}

/// Create a registry holding the DuckDuckGo search tool.
pub fn duckduckgo_toolkit(config: DuckDuckGoConfig) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(DuckDuckGoSearchTool { config });
    registry
}

struct DuckDuckGoSearchTool {
    config: DuckDuckGoConfig,
}

#[async_trait]
impl Tool for DuckDuckGoSearchTool {
    fn name(&self) -> &str {
        "duckduckgo_search"
    }

    fn description(&self) -> &str {
        "Search the web using DuckDuckGo. Expects {\"query\": string, \"max_results\": number (optional)}."
    }

    fn parameters(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "The search query string"},
                "max_results": {"type": "integer", "description": "Maximum number of results to return"}
            },
            "required": ["query"]
        }))
    }

    async fn call(&self, input: Value) -> Result<Value> {
        let query = input
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| ParleyError::Protocol("missing `query` for duckduckgo_search".into()))?;

        let max_results = input
            .get("max_results")
            .and_then(Value::as_u64)
            .map(|n| n as usize)
            .unwrap_or(self.config.max_results)
            .max(1);

        info!(%query, max_results, "searching DuckDuckGo");

        let results = search_duckduckgo(query, max_results, self.config.timeout_secs).await?;
        info!(found = results.len(), "search finished");
        Ok(Value::String(format_results(query, &results)))
    }
}

/// Render results as the ranked text block the model consumes.
pub(crate) fn format_results(query: &str, results: &[SearchResult]) -> String {
    if results.is_empty() {
        return format!("No search results found for query: {query}");
    }

    let mut formatted = format!("Search results for '{query}':\n\n");
    for (i, result) in results.iter().enumerate() {
        formatted.push_str(&format!("{}. {}\n", i + 1, result.title));
        formatted.push_str(&format!("   URL: {}\n", result.href));
        formatted.push_str(&format!(
            "   Description: {}\n\n",
            truncate_snippet(&result.body)
        ));
    }
    formatted
}

/// Perform a DuckDuckGo search using the HTML interface.
async fn search_duckduckgo(
    query: &str,
    max_results: usize,
    timeout_secs: u64,
) -> Result<Vec<SearchResult>> {
    use std::time::Duration;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent("Mozilla/5.0 (compatible; ParleyBot/1.0)")
        .build()
        .map_err(|e| ParleyError::ToolInvocation {
            name: "duckduckgo_search".into(),
            source: Box::new(e),
        })?;

    let url = format!(
        "https://html.duckduckgo.com/html/?q={}",
        urlencoding::encode(query)
    );

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| ParleyError::ToolInvocation {
            name: "duckduckgo_search".into(),
            source: Box::new(e),
        })?;

    let html = response
        .text()
        .await
        .map_err(|e| ParleyError::ToolInvocation {
            name: "duckduckgo_search".into(),
            source: Box::new(e),
        })?;

    Ok(parse_duckduckgo_html(&html, max_results))
}

/// Extract results from the DuckDuckGo HTML page.
///
/// Results are in `<a class="result__a" href="...">title</a>` with the
/// snippet in a following `result__snippet` anchor. Naive splitting is
/// enough for this page shape.
fn parse_duckduckgo_html(html: &str, max_results: usize) -> Vec<SearchResult> {
    let mut results = Vec::new();

    for (i, chunk) in html.split("result__a").enumerate() {
        if i == 0 || results.len() >= max_results {
            continue;
        }

        let href = chunk
            .split("href=\"")
            .nth(1)
            .and_then(|s| s.split('"').next())
            .unwrap_or("")
            .to_string();

        let title = chunk
            .split_once('>')
            .map(|(_, rest)| rest)
            .and_then(|s| s.split("</a>").next())
            .unwrap_or("")
            .to_string();

        let body = chunk
            .split("result__snippet")
            .nth(1)
            .and_then(|s| s.split_once('>').map(|(_, rest)| rest))
            .and_then(|s| s.split("</a>").next())
            .unwrap_or("")
            .replace("<b>", "")
            .replace("</b>", "");

        if !href.is_empty() && !title.is_empty() && href.starts_with("http") {
            results.push(SearchResult {
                title: html_decode(&title),
                href,
                body: html_decode(&body),
            });
        }
    }

    results
}

/// Simple HTML entity decoding.
fn html_decode(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_exposes_the_search_tool() {
        let registry = duckduckgo_toolkit(DuckDuckGoConfig::default());
        assert!(registry.contains("duckduckgo_search"));
    }

    #[test]
    fn parses_results_from_html() {
        let html = r#"
            <a class="result__a" href="https://example.com/rust">Rust &amp; systems</a>
            <a class="result__snippet" href="https://example.com/rust">A language <b>empowering</b> everyone.</a>
            <a class="result__a" href="https://example.org/tokio">Tokio</a>
            <a class="result__snippet" href="https://example.org/tokio">An async runtime.</a>
        "#;
        let results = parse_duckduckgo_html(html, 5);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Rust & systems");
        assert_eq!(results[0].href, "https://example.com/rust");
        assert_eq!(results[0].body, "A language empowering everyone.");
    }

    #[test]
    fn result_cap_is_honored() {
        let html = r#"
            <a class="result__a" href="https://a.example">One</a>
            <a class="result__a" href="https://b.example">Two</a>
            <a class="result__a" href="https://c.example">Three</a>
        "#;
        let results = parse_duckduckgo_html(html, 2);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn empty_results_format_as_a_notice() {
        let text = format_results("obscure query", &[]);
        assert_eq!(text, "No search results found for query: obscure query");
    }

    #[test]
    fn formatted_results_are_ranked_and_truncated() {
        let results = vec![SearchResult {
            title: "Long read".into(),
            href: "https://example.com".into(),
            body: "y".repeat(400),
        }];
        let text = format_results("q", &results);
        assert!(text.starts_with("Search results for 'q':"));
        assert!(text.contains("1. Long read"));
        assert!(text.contains("..."));
        assert!(!text.contains(&"y".repeat(300)));
    }
}
