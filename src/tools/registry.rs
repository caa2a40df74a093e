use crate::tools::builtin::{ResearchComplete, ThinkTool};
use crate::types::{AppError, Result, ToolDefinition};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters_schema(&self) -> Value;
    async fn execute(&self, args: Value) -> Result<Value>;
}

/// Name of the reserved tool that ends a researcher's loop.
pub const RESEARCH_COMPLETE_TOOL: &str = "ResearchComplete";

#[derive(Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Registry holding the completion sentinel and the `think` reflection tool.
    ///
    /// Research tools (web search etc.) are registered on top of this.
    pub fn with_research_tools() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ResearchComplete));
        registry.register(Arc::new(ThinkTool));
        registry
    }

    /// Research tools plus the daedra-powered search and fetch tools
    #[cfg(feature = "web-search")]
    pub fn with_default_tools() -> Self {
        let mut registry = Self::with_research_tools();
        registry.register(Arc::new(crate::tools::search::SearchTool::new()));
        registry.register(Arc::new(crate::tools::search::FetchPageTool::new()));
        registry
    }

    /// Register a tool, replacing any tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Definitions in name order.
    pub fn get_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters_schema(),
            })
            .collect()
    }

    pub async fn execute(&self, name: &str, args: Value) -> Result<Value> {
        if let Some(tool) = self.tools.get(name) {
            tool.execute(args).await
        } else {
            Err(AppError::NotFound(format!("Tool not found: {}", name)))
        }
    }

    /// Execute and render the value the way it is shown to the model.
    pub async fn execute_to_string(&self, name: &str, args: Value) -> Result<String> {
        self.execute(name, args).await.map(render_tool_value)
    }

    /// Get a list of all registered tool names
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Check if a tool is registered
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// True when something other than the sentinel and `think` can be called.
    pub fn has_research_actions(&self) -> bool {
        self.tools
            .keys()
            .any(|name| name != RESEARCH_COMPLETE_TOOL && name != ThinkTool::NAME)
    }
}

/// Strings pass through untouched; other values are pretty-printed JSON.
pub fn render_tool_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => serde_json::to_string_pretty(&other).unwrap_or_else(|_| other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registry_creation() {
        let registry = ToolRegistry::new();
        assert_eq!(registry.tool_names().len(), 0);
        assert!(!registry.has_research_actions());
    }

    #[test]
    fn test_registry_with_research_tools() {
        let registry = ToolRegistry::with_research_tools();
        assert!(registry.has_tool(RESEARCH_COMPLETE_TOOL));
        assert!(registry.has_tool("think"));
        assert!(!registry.has_research_actions());
    }

    #[test]
    fn test_get_tool_definitions_are_sorted() {
        let registry = ToolRegistry::with_research_tools();
        let names: Vec<String> = registry
            .get_tool_definitions()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["ResearchComplete".to_string(), "think".to_string()]);
    }

    #[tokio::test]
    async fn test_nonexistent_tool() {
        let registry = ToolRegistry::with_research_tools();
        let result = registry.execute("nonexistent_tool", json!({})).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_render_tool_value() {
        assert_eq!(render_tool_value(json!("plain")), "plain");
        assert!(render_tool_value(json!({"url": "https://a.example"})).contains("https://a.example"));
    }
}
