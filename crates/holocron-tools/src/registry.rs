//! Tool lookup and argument validation helpers.

use holocron_core::traits::Tool;
use holocron_core::types::ToolDefinition;

/// Find a tool by name from a list.
pub fn find_tool<'a>(tools: &'a [Box<dyn Tool>], name: &str) -> Option<&'a dyn Tool> {
    tools.iter().find(|t| t.name() == name).map(|t| t.as_ref())
}

/// Get all tool definitions from a list.
pub fn list_definitions(tools: &[Box<dyn Tool>]) -> Vec<ToolDefinition> {
    tools.iter().map(|t| t.definition()).collect()
}

/// Check that `args` carries every argument the definition marks required.
pub fn validate_args(definition: &ToolDefinition, args: &serde_json::Value) -> Result<(), String> {
    let required = definition
        .parameters
        .get("required")
        .and_then(|r| r.as_array())
        .into_iter()
        .flatten()
        .filter_map(|r| r.as_str());
    for key in required {
        if args.get(key).is_none() {
            return Err(format!("Missing required argument: {key}"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(parameters: serde_json::Value) -> ToolDefinition {
        ToolDefinition {
            name: "search_documents".into(),
            description: "search".into(),
            parameters,
        }
    }

    #[test]
    fn test_validate_args_missing() {
        let def = definition(serde_json::json!({
            "required": ["query"],
            "properties": { "query": { "type": "string" } }
        }));
        assert!(validate_args(&def, &serde_json::json!({})).is_err());
        assert!(validate_args(&def, &serde_json::json!({"query": "Revan"})).is_ok());
    }

    #[test]
    fn test_validate_args_no_required() {
        let def = definition(serde_json::json!({}));
        assert!(validate_args(&def, &serde_json::json!({})).is_ok());
    }
}
