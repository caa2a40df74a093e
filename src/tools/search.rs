//! Search tool implementation using daedra
//!
//! Web search and page fetching via the daedra crate, which uses DuckDuckGo
//! as the search backend. Results are rendered as source blocks with the URL
//! on its own line so compression can carry citations forward verbatim.

use crate::tools::registry::Tool;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Web search tool powered by daedra
pub struct SearchTool;

impl SearchTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SearchTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for information using DuckDuckGo. Returns titles, URLs and summaries."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "num_results": {
                    "type": "integer",
                    "description": "Maximum number of results to return (default: 5)",
                    "default": 5
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let query = args
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AppError::InvalidInput("Missing 'query' parameter".to_string()))?;

        let num_results = args
            .get("num_results")
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
            .unwrap_or(5);

        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results,
                ..Default::default()
            }),
        };

        let response = daedra::tools::search::perform_search(&search_args)
            .await
            .map_err(|e| AppError::Tool(format!("Search failed: {}", e)))?;

        if response.data.is_empty() {
            return Ok(json!(format!("No search results found for '{}'.", query)));
        }

        let mut output = format!("Search results for '{}':\n\n", query);
        for (i, r) in response.data.iter().enumerate() {
            output.push_str(&format!(
                "--- SOURCE {}: {} ---\nURL: {}\n\nSUMMARY:\n{}\n\n",
                i + 1,
                r.title,
                r.url,
                r.description
            ));
        }

        Ok(json!(output))
    }
}

/// Page fetching tool powered by daedra
pub struct FetchPageTool;

impl FetchPageTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FetchPageTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for FetchPageTool {
    fn name(&self) -> &str {
        "fetch_page"
    }

    fn description(&self) -> &str {
        "Fetch a web page and convert it to markdown"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The URL of the page to fetch"
                },
                "selector": {
                    "type": "string",
                    "description": "Optional CSS selector to extract specific content"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let url = args
            .get("url")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AppError::InvalidInput("Missing 'url' parameter".to_string()))?;

        let selector = args
            .get("selector")
            .and_then(|v| v.as_str())
            .map(String::from);

        let fetch_args = daedra::VisitPageArgs {
            url: url.to_string(),
            include_images: false,
            selector,
        };

        let page = daedra::tools::fetch::fetch_page(&fetch_args)
            .await
            .map_err(|e| AppError::Tool(format!("Failed to fetch page: {}", e)))?;

        Ok(json!(format!(
            "--- PAGE: {} ---\nURL: {}\n\n{}",
            page.title, page.url, page.content
        )))
    }
}
