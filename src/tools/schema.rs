//! Argument validation against a tool's declared parameter schema
//!
//! Supports the subset of JSON Schema that tool catalogs use in practice:
//! top-level `type`, `required`, per-property `type` (single or list) and
//! `enum`, and `additionalProperties: false`. Unknown keywords are ignored.

use serde_json::{Map, Value};

use crate::llm::ToolDefinition;

/// Check `arguments` against `tool.parameters`.
///
/// Returns a human-readable reason on the first violation found.
pub fn validate_arguments(tool: &ToolDefinition, arguments: &Value) -> Result<(), String> {
    // Model output that failed to parse is kept as a raw string
    if let Value::String(raw) = arguments {
        return Err(format!("arguments are not a valid JSON object: {}", raw));
    }

    let schema = match tool.parameters.as_object() {
        Some(schema) => schema,
        // No usable schema, nothing to check against
        None => return Ok(()),
    };

    if let Some(expected) = schema.get("type") {
        if !matches_type(expected, arguments) {
            return Err(format!(
                "expected arguments of type {}, got {}",
                describe_type(expected),
                json_type_name(arguments)
            ));
        }
    }

    let args = match arguments.as_object() {
        Some(args) => args,
        None => return Ok(()),
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for key in required.iter().filter_map(Value::as_str) {
            if !args.contains_key(key) {
                return Err(format!("missing required argument '{}'", key));
            }
        }
    }

    let properties = schema.get("properties").and_then(Value::as_object);

    if schema.get("additionalProperties") == Some(&Value::Bool(false)) {
        let empty = Map::new();
        let known = properties.unwrap_or(&empty);
        if let Some(extra) = args.keys().find(|k| !known.contains_key(*k)) {
            return Err(format!("unexpected argument '{}'", extra));
        }
    }

    if let Some(properties) = properties {
        for (key, value) in args {
            if let Some(prop) = properties.get(key).and_then(Value::as_object) {
                validate_property(key, prop, value)?;
            }
        }
    }

    Ok(())
}

fn validate_property(key: &str, prop: &Map<String, Value>, value: &Value) -> Result<(), String> {
    if let Some(expected) = prop.get("type") {
        if !matches_type(expected, value) {
            return Err(format!(
                "argument '{}' should be {}, got {}",
                key,
                describe_type(expected),
                json_type_name(value)
            ));
        }
    }

    if let Some(allowed) = prop.get("enum").and_then(Value::as_array) {
        if !allowed.contains(value) {
            return Err(format!(
                "argument '{}' must be one of {}",
                key,
                Value::Array(allowed.clone())
            ));
        }
    }

    Ok(())
}

fn matches_type(expected: &Value, value: &Value) -> bool {
    match expected {
        Value::String(name) => matches_type_name(name, value),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .any(|name| matches_type_name(name, value)),
        _ => true,
    }
}

fn matches_type_name(name: &str, value: &Value) -> bool {
    match name {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        "number" => value.is_number(),
        "integer" => {
            value.is_i64()
                || value.is_u64()
                || value.as_f64().map_or(false, |n| n.fract() == 0.0)
        }
        _ => true,
    }
}

fn describe_type(expected: &Value) -> String {
    match expected {
        Value::String(name) => name.clone(),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" or "),
        other => other.to_string(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
