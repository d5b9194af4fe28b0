//! web_search tool - Tavily web search

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::SearchConfig;
use crate::tools::traits::required_str;
use crate::tools::{Tool, ToolError, ToolResult};

/// Characters of each result's content passed back to the model
const SNIPPET_CHARS: usize = 500;

/// Search the web for current travel information
pub struct WebSearchTool {
    http: Client,
    api_key: Option<String>,
    base_url: String,
    max_results: u32,
    search_depth: String,
    include_answer: bool,
}

impl WebSearchTool {
    /// Build from config, reading the API key from the configured variable
    ///
    /// A missing key does not prevent registration; calls then fail with a
    /// message the model can relay.
    pub fn from_config(config: &SearchConfig) -> Result<Self, ToolError> {
        debug!(base_url = %config.base_url, "WebSearchTool::from_config: called");
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        if api_key.is_none() {
            warn!(env = %config.api_key_env, "web_search registered without an API key");
        }

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            http,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_results: config.max_results,
            search_depth: config.search_depth.clone(),
            include_answer: config.include_answer,
        })
    }

    fn request_body(&self, api_key: &str, query: &str, max_results: u64) -> Value {
        serde_json::json!({
            "api_key": api_key,
            "query": query,
            "max_results": max_results,
            "search_depth": self.search_depth,
            "include_answer": self.include_answer,
            "include_raw_content": false,
        })
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &'static str {
        "web_search"
    }

    fn description(&self) -> &'static str {
        "Search the web for current information about destinations, attractions, accommodations, prices, events and travel conditions."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum results to return (default: 5)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError> {
        let query = required_str(&input, "query")?;
        let max_results = input["max_results"]
            .as_u64()
            .filter(|n| *n > 0)
            .unwrap_or(self.max_results as u64);
        debug!(%query, %max_results, "WebSearchTool::execute: called");

        let api_key = self.api_key.as_deref().ok_or_else(|| ToolError::NotConfigured {
            tool: "web_search".to_string(),
            reason: "no Tavily API key is set".to_string(),
        })?;

        let response = self
            .http
            .post(format!("{}/search", self.base_url))
            .json(&self.request_body(api_key, query, max_results))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            debug!(%status, "WebSearchTool::execute: API error");
            return Err(ToolError::Api {
                service: "Tavily".to_string(),
                status,
                message,
            });
        }

        let body: Value = response.json().await.map_err(|e| ToolError::Parse(e.to_string()))?;
        Ok(ToolResult::success(format_results(&body)))
    }
}

/// Render a Tavily response as numbered plain-text results
pub fn format_results(body: &Value) -> String {
    let mut sections = Vec::new();

    if let Some(answer) = body["answer"].as_str().filter(|a| !a.trim().is_empty()) {
        sections.push(format!("Answer: {}\n", answer.trim()));
    }

    let results = body["results"].as_array().map(Vec::as_slice).unwrap_or_default();
    for (i, r) in results.iter().enumerate() {
        let title = r["title"].as_str().unwrap_or("(no title)");
        let url = r["url"].as_str().unwrap_or("");
        let content = r["content"].as_str().unwrap_or("");
        sections.push(format!("{}. {}\n   {}\n   {}\n", i + 1, title, url, truncate(content, SNIPPET_CHARS)));
    }

    if sections.is_empty() {
        return "No results found".to_string();
    }
    sections.join("\n")
}

fn truncate(s: &str, max_chars: usize) -> String {
    let s = s.trim();
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
