//! Agent tool trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ToolDefinition, ToolResult};

/// A function the agent may call.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn definition(&self) -> ToolDefinition;

    /// Execute with the model-provided JSON `arguments`.
    async fn execute(&self, arguments: &str) -> Result<ToolResult>;
}
