//! Tool catalog adapter
//!
//! `tools/list` advertises `inputSchema`; the model interface expects
//! `input_schema`. Names and descriptions pass through verbatim.

use crate::service::mcp::protocol::MCPTool;
use crate::util::errors::{AgentError, AgentResult};
use amadeus_ai_adapters::ToolDescriptor;
use serde_json::{json, Value};
use std::collections::HashSet;

fn empty_object_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}

pub fn normalize_tool(tool: MCPTool) -> AgentResult<ToolDescriptor> {
    let name = match tool.name {
        Some(name) if !name.is_empty() => name,
        _ => {
            return Err(AgentError::Schema(format!(
                "Tool descriptor is missing a name (description: {:?})",
                tool.description
            )));
        }
    };

    Ok(ToolDescriptor {
        name,
        description: tool.description.unwrap_or_default(),
        input_schema: tool.input_schema.unwrap_or_else(empty_object_schema),
    })
}

pub fn normalize_tools(tools: Vec<MCPTool>) -> AgentResult<Vec<ToolDescriptor>> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(tools.len());

    for tool in tools {
        let descriptor = normalize_tool(tool)?;
        if !seen.insert(descriptor.name.clone()) {
            return Err(AgentError::Schema(format!(
                "Duplicate tool name in catalog: {}",
                descriptor.name
            )));
        }
        normalized.push(descriptor);
    }

    Ok(normalized)
}

/// Normalizes a raw `tools/list` result (`{"tools": [...]}`).
pub fn normalize_tools_value(result: Value) -> AgentResult<Vec<ToolDescriptor>> {
    let tools = match result {
        Value::Object(mut map) => map.remove("tools"),
        _ => None,
    }
    .ok_or_else(|| AgentError::Schema("tools/list result has no `tools` array".to_string()))?;

    let tools: Vec<MCPTool> = serde_json::from_value(tools)
        .map_err(|e| AgentError::Schema(format!("Malformed tool descriptor: {}", e)))?;
    normalize_tools(tools)
}
