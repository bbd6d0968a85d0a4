//! YAML and JSON data handling utilities.

use provisioning_types::{ProvisionError, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Load YAML from string.
///
/// An empty document yields an empty object.
pub fn load_yaml(content: &str) -> Result<Value> {
    if content.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_yaml::from_str(content).map_err(ProvisionError::Yaml)
}

/// Load YAML from file.
pub fn load_yaml_file(path: impl AsRef<Path>) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(ProvisionError::Io)?;
    load_yaml(&content)
}

/// Deep merge two values.
/// Recursively merges objects, with overlay values taking precedence.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_val) => deep_merge(base_val, overlay_val),
                    None => overlay_val,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay_val) => overlay_val,
    }
}

/// Get value at a path in dotted notation.
pub fn get_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;

    for part in path.split('.') {
        current = current.as_object()?.get(part)?;
    }

    Some(current)
}

/// Set the value at a dotted path, creating intermediate objects.
///
/// Non-object values on the way are replaced by objects.
pub fn set_path(data: &mut Value, path: &str, value: Value) -> Result<()> {
    if path.is_empty() {
        return Err(ProvisionError::Config("Empty path".to_string()));
    }

    let mut current = data;
    let mut parts = path.split('.').peekable();

    while let Some(part) = parts.next() {
        if !current.is_object() {
            *current = Value::Object(Default::default());
        }
        let map = current
            .as_object_mut()
            .ok_or_else(|| ProvisionError::Config(format!("Cannot set {}", path)))?;

        if parts.peek().is_none() {
            map.insert(part.to_string(), value);
            return Ok(());
        }

        current = map
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Default::default()));
    }

    Ok(())
}
