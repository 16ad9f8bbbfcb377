//! # Holocron Tools
//!
//! Tools the agent may call. The Holocron has one: `search_documents`,
//! which answers from the vector index.

pub mod registry;
pub mod search_documents;

use holocron_core::traits::Tool;
use holocron_core::types::ToolDefinition;
use holocron_knowledge::QueryEngine;
use std::sync::Arc;

pub use search_documents::SearchDocumentsTool;

/// Tool registry — holds all available tools.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the document search tool over `engine`.
    pub fn with_search(engine: Arc<QueryEngine>) -> Self {
        let mut reg = Self::new();
        reg.register(Box::new(SearchDocumentsTool::new(engine)));
        reg
    }

    /// Register a tool. A tool with the same name replaces the old one.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        registry::find_tool(&self.tools, name)
    }

    /// Definitions of every registered tool, for the provider.
    pub fn list(&self) -> Vec<ToolDefinition> {
        registry::list_definitions(&self.tools)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
