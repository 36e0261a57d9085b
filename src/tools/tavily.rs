//! Tavily search tool.
//!
//! JSON API variant of web search; requires an API key.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::{ParleyError, Result};
use crate::tool::{Tool, ToolRegistry};
use crate::tools::search::{format_results, SearchResult};

const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";

#[derive(Clone)]
pub struct TavilyConfig {
    pub api_key: String,
    pub max_results: usize,
    pub timeout_secs: u64,
}

impl TavilyConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            max_results: 3,
            timeout_secs: 10,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }
}

/// Create a registry holding the Tavily search tool.
pub fn tavily_toolkit(config: TavilyConfig) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(TavilySearchTool { config });
    registry
}

struct TavilySearchTool {
    config: TavilyConfig,
}

#[async_trait]
impl Tool for TavilySearchTool {
    fn name(&self) -> &str {
        "tavily_search"
    }

    fn description(&self) -> &str {
        "Search the web using Tavily. Expects {\"query\": string, \"max_results\": number (optional)}."
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
            .ok_or_else(|| ParleyError::Protocol("missing `query` for tavily_search".into()))?;

        let max_results = input
            .get("max_results")
            .and_then(Value::as_u64)
            .map(|n| n as usize)
            .unwrap_or(self.config.max_results)
            .max(1);

        info!(%query, max_results, "searching Tavily");

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .build()
            .map_err(|e| ParleyError::ToolInvocation {
                name: "tavily_search".into(),
                source: Box::new(e),
            })?;

        let response = client
            .post(TAVILY_ENDPOINT)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&json!({
                "query": query,
                "max_results": max_results,
            }))
            .send()
            .await
            .map_err(|e| ParleyError::ToolInvocation {
                name: "tavily_search".into(),
                source: Box::new(e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ParleyError::ToolInvocation {
                name: "tavily_search".into(),
                source: format!("Tavily returned {status}: {body}").into(),
            });
        }

        let parsed: TavilyResponse =
            response
                .json()
                .await
                .map_err(|e| ParleyError::ToolInvocation {
                    name: "tavily_search".into(),
                    source: Box::new(e),
                })?;

        let results: Vec<SearchResult> = parsed
            .results
            .into_iter()
            .take(max_results)
            .map(|r| SearchResult {
                title: r.title,
                href: r.url,
                body: r.content,
            })
            .collect();

        info!(found = results.len(), "search finished");
        Ok(Value::String(format_results(query, &results)))
    }
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_exposes_the_search_tool() {
        let registry = tavily_toolkit(TavilyConfig::new("tvly-test"));
        assert!(registry.contains("tavily_search"));
    }

    #[test]
    fn response_shape_deserializes() {
        let raw = r#"{"results":[{"title":"T","url":"https://t.example","content":"body","score":0.9}]}"#;
        let parsed: TavilyResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.results.len(), 1);
        assert_eq!(parsed.results[0].url, "https://t.example");
    }
}
