//! Tools available to researchers
//!
//! Tools are injected into the pipeline through a [`ToolRegistry`]; the
//! orchestration code only knows the [`Tool`] trait and the reserved
//! `ResearchComplete` name.
//!
//! # Module Structure
//!
//! - [`registry`](crate::tools::registry) - Tool trait, registration and execution
//! - [`builtin`](crate::tools::builtin) - `ResearchComplete` sentinel and `think` reflection
//! - [`search`](crate::tools::search) - Web search and page fetch (feature `web-search`)
//!
//! # Example
//!
//! ```ignore
//! let mut registry = ToolRegistry::with_research_tools();
//! registry.register(Arc::new(MyVectorSearch::new(index)));
//! let result = registry.execute("think", json!({"reflection": "..."})).await?;
//! ```

/// Completion sentinel and reflection tool.
pub mod builtin;
/// Tool registry for managing available tools.
pub mod registry;
/// Web search tool using DuckDuckGo.
#[cfg(feature = "web-search")]
pub mod search;

pub use registry::{Tool, ToolRegistry, RESEARCH_COMPLETE_TOOL};
