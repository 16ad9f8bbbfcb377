//! Document search tool — lets the agent consult the Holocron's archives.

use async_trait::async_trait;
use holocron_core::error::{HolocronError, Result};
use holocron_core::traits::Tool;
use holocron_core::types::{ToolDefinition, ToolResult};
use holocron_knowledge::QueryEngine;
use std::sync::Arc;

use crate::registry::validate_args;

pub const TOOL_NAME: &str = "search_documents";

/// Answers a question from the indexed Star Wars corpus.
pub struct SearchDocumentsTool {
    engine: Arc<QueryEngine>,
}

impl SearchDocumentsTool {
    pub fn new(engine: Arc<QueryEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl Tool for SearchDocumentsTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: TOOL_NAME.into(),
            description: "Search the Holocron archives (Star Wars films, series, characters \
                          and planets) and return an answer grounded in them."
                .into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The question to look up in the archives"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn execute(&self, arguments: &str) -> Result<ToolResult> {
        // Small models sometimes send the bare query instead of an object.
        let args = match serde_json::from_str(arguments) {
            Ok(serde_json::Value::String(query)) => serde_json::json!({ "query": query }),
            Ok(args) => args,
            Err(_) => serde_json::json!({ "query": arguments }),
        };
        validate_args(&self.definition(), &args).map_err(HolocronError::Tool)?;
        let query = args["query"]
            .as_str()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| HolocronError::Tool("Missing required argument: query".into()))?;

        tracing::info!("📜 Searching the archives: {query}");
        let output = self.engine.query(query).await?;
        Ok(ToolResult {
            tool_call_id: String::new(),
            output,
            success: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::stub_engine;

    #[tokio::test]
    async fn test_execute_json_and_bare_query() {
        let tool = SearchDocumentsTool::new(stub_engine().await);

        let result = tool.execute(r#"{"query": "Who is Vader?"}"#).await.unwrap();
        assert!(result.success);
        assert_eq!(result.output, "answer: Who is Vader?");

        let result = tool.execute("Who is Vader?").await.unwrap();
        assert_eq!(result.output, "answer: Who is Vader?");
    }

    #[tokio::test]
    async fn test_execute_json_string_query() {
        let tool = SearchDocumentsTool::new(stub_engine().await);
        let result = tool.execute(r#""Who is Vader?""#).await.unwrap();
        assert_eq!(result.output, "answer: Who is Vader?");
    }

    #[tokio::test]
    async fn test_execute_missing_query() {
        let tool = SearchDocumentsTool::new(stub_engine().await);
        let err = tool.execute(r#"{"q": "x"}"#).await.unwrap_err();
        assert!(matches!(err, HolocronError::Tool(ref m) if m.contains("query")));
        assert!(tool.execute(r#"{"query": 42}"#).await.is_err());
        assert!(tool.execute(r#"{"query": "  "}"#).await.is_err());
    }

    #[tokio::test]
    async fn test_definition_requires_query() {
        let tool = SearchDocumentsTool::new(stub_engine().await);
        let def = tool.definition();
        assert_eq!(def.name, "search_documents");
        assert_eq!(def.parameters["required"][0], "query");
    }
}
