//! Tool descriptors and the `tools/list` result parser

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::codec::json_kind;
use crate::logging::Logger;
use crate::rpc::{RpcError, RpcResult};

/// A tool as advertised by the server
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    name: String,
    description: Option<String>,
    input_keys: Vec<String>,
    input_schema: Value,
}

impl ToolDescriptor {
    /// Build a descriptor; parameter names come from the schema's `properties`
    pub fn new(name: impl Into<String>, description: Option<String>, input_schema: Value) -> Self {
        let input_keys = extract_schema_keys(&input_schema);
        Self {
            name: name.into(),
            description,
            input_keys,
            input_schema,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Declared parameter names, in schema order
    pub fn input_keys(&self) -> &[String] {
        &self.input_keys
    }

    /// The raw `inputSchema` (null when the server sent none)
    pub fn input_schema(&self) -> &Value {
        &self.input_schema
    }

    /// Pretty-printed `{"param": null, ...}` to pre-fill an arguments box
    pub fn params_template(&self) -> String {
        let template: Map<String, Value> = self
            .input_keys
            .iter()
            .map(|key| (key.clone(), Value::Null))
            .collect();
        serde_json::to_string_pretty(&Value::Object(template)).unwrap_or_else(|_| "{}".to_string())
    }
}

impl fmt::Display for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Keys of a JSON-Schema-like object's `properties`, in order
///
/// Anything malformed yields an empty list.
pub fn extract_schema_keys(schema: &Value) -> Vec<String> {
    match schema.get("properties") {
        Some(Value::Object(properties)) => properties.keys().cloned().collect(),
        _ => Vec::new(),
    }
}

/// Text of a scalar JSON value; `None` for null, arrays and objects
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Turn a `tools/list` result into descriptors
///
/// Accepts `{"tools": [...]}` or a bare array; any other shape lists nothing.
/// Entries without a name are skipped, later duplicates of a name are
/// dropped. A structurally broken entry fails the whole listing.
pub fn parse_tool_listing(result: &Value, logger: &dyn Logger) -> RpcResult<Vec<ToolDescriptor>> {
    let listed = result.get("tools").unwrap_or(result);
    let Some(entries) = listed.as_array() else {
        logger.debug(&format!(
            "[ToolDirectory] tools/list returned {}, no tools listed",
            json_kind(listed)
        ));
        return Ok(Vec::new());
    };

    let mut seen = HashSet::new();
    let mut tools = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let Some(object) = entry.as_object() else {
            return Err(RpcError::InvalidResponse(format!(
                "tool entry {} is {}, expected object",
                index,
                json_kind(entry)
            )));
        };

        let name = match object.get("name") {
            None | Some(Value::Null) => continue,
            Some(value) => scalar_text(value).ok_or_else(|| {
                RpcError::InvalidResponse(format!(
                    "tool entry {}: name is {}, expected string",
                    index,
                    json_kind(value)
                ))
            })?,
        };
        if name.is_empty() {
            continue;
        }

        let description = match object.get("description") {
            None | Some(Value::Null) => None,
            Some(value) => Some(scalar_text(value).ok_or_else(|| {
                RpcError::InvalidResponse(format!(
                    "tool '{}': description is {}, expected string",
                    name,
                    json_kind(value)
                ))
            })?),
        };

        if !seen.insert(name.clone()) {
            logger.warn(&format!("[ToolDirectory] Skipping duplicate tool '{}'", name));
            continue;
        }

        let schema = object.get("inputSchema").cloned().unwrap_or(Value::Null);
        tools.push(ToolDescriptor::new(name, description, schema));
    }

    Ok(tools)
}
