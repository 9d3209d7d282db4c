//! Response shape extraction.
//!
//! Instead of cutting a large JSON response off mid-token, extract its type
//! structure: field names, array lengths, and primitive samples. The result
//! is small, deterministic, and safe to persist next to a template.

use serde::{Deserialize, Serialize};
use serde_json::Value;

const MAX_DEPTH: usize = 4;
const MAX_OBJECT_FIELDS: usize = 30;
const MAX_SAMPLE_CHARS: usize = 60;

/// Structural description of a JSON value, depth- and width-capped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchemaNode {
    Null,
    Bool {
        sample: bool,
    },
    Number {
        sample: f64,
    },
    String {
        sample: String,
    },
    Array {
        len: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        element: Option<Box<SchemaNode>>,
    },
    Object {
        fields: Vec<SchemaField>,
        /// Fields beyond the width cap, counted but not described.
        #[serde(default, skip_serializing_if = "is_zero")]
        dropped: usize,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub schema: SchemaNode,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

/// Extract the shape of a JSON response body.
///
/// Tolerates the `for (;;);` anti-hijacking prefix some APIs emit. Returns
/// `None` for anything that does not parse as JSON.
pub fn extract_response_schema(body: &str) -> Option<SchemaNode> {
    let trimmed = body.trim();
    let cleaned = trimmed.strip_prefix("for (;;);").unwrap_or(trimmed);
    let value: Value = serde_json::from_str(cleaned).ok()?;
    Some(extract_node(&value, 0))
}

fn extract_node(value: &Value, depth: usize) -> SchemaNode {
    match value {
        Value::Null => SchemaNode::Null,
        Value::Bool(b) => SchemaNode::Bool { sample: *b },
        Value::Number(n) => SchemaNode::Number {
            sample: n.as_f64().unwrap_or(0.0),
        },
        Value::String(s) => SchemaNode::String {
            sample: preview(s),
        },
        Value::Array(items) => {
            let element = if depth >= MAX_DEPTH {
                None
            } else {
                items.first().map(|item| Box::new(extract_node(item, depth + 1)))
            };
            SchemaNode::Array {
                len: items.len(),
                element,
            }
        }
        Value::Object(map) => {
            if depth >= MAX_DEPTH {
                return SchemaNode::Object {
                    fields: Vec::new(),
                    dropped: map.len(),
                };
            }
            let fields = map
                .iter()
                .take(MAX_OBJECT_FIELDS)
                .map(|(name, value)| SchemaField {
                    name: name.clone(),
                    schema: extract_node(value, depth + 1),
                })
                .collect();
            SchemaNode::Object {
                fields,
                dropped: map.len().saturating_sub(MAX_OBJECT_FIELDS),
            }
        }
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= MAX_SAMPLE_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_SAMPLE_CHARS - 3).collect();
    cut.push_str("...");
    cut
}

/// Render an extracted schema as an indented human-readable description.
pub fn render_schema(schema: &SchemaNode) -> String {
    render_node(schema, 0)
}

fn render_node(node: &SchemaNode, indent: usize) -> String {
    let pad = "  ".repeat(indent);
    match node {
        SchemaNode::Null => format!("{pad}null"),
        SchemaNode::Bool { sample } => format!("{pad}bool (e.g. {sample})"),
        SchemaNode::Number { sample } => format!("{pad}number (e.g. {sample})"),
        SchemaNode::String { sample } => format!("{pad}string (e.g. {sample:?})"),
        SchemaNode::Array { len, element } => match element {
            None if *len == 0 => format!("{pad}Array[0 items] (empty)"),
            None => format!("{pad}Array[{len} items]"),
            Some(el) => format!(
                "{pad}Array[{len} items] of {}",
                render_node(el, indent).trim_start(),
            ),
        },
        SchemaNode::Object { fields, dropped } => {
            if fields.is_empty() {
                return if *dropped > 0 {
                    format!("{pad}{{ +{dropped} fields }}")
                } else {
                    format!("{pad}{{}}")
                };
            }
            let mut lines = vec![format!("{pad}{{")];
            for field in fields {
                let inner = render_node(&field.schema, indent + 1);
                let inner = inner.trim_start();
                lines.push(format!("{}{}: {}", "  ".repeat(indent + 1), field.name, inner));
            }
            if *dropped > 0 {
                lines.push(format!("{}... +{} more fields", "  ".repeat(indent + 1), dropped));
            }
            lines.push(format!("{pad}}}"));
            lines.join("\n")
        }
    }
}
