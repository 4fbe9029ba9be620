//! Output schema builders
//!
//! Schemas use the OpenAPI subset accepted by structured-output model
//! endpoints (`OBJECT`, `STRING`, `ARRAY`).

use serde_json::{Map, Value, json};

/// A required string property with a description
pub fn string(description: &str) -> Value {
    json!({ "type": "STRING", "description": description })
}

/// A required array-of-strings property with a description
pub fn string_array(description: &str) -> Value {
    json!({
        "type": "ARRAY",
        "description": description,
        "items": { "type": "STRING" }
    })
}

/// An object whose listed properties are all required
pub fn object(properties: &[(&str, Value)]) -> Value {
    let mut props = Map::new();
    for (name, schema) in properties {
        props.insert((*name).to_string(), schema.clone());
    }
    let required: Vec<&str> = properties.iter().map(|(name, _)| *name).collect();
    json!({
        "type": "OBJECT",
        "properties": props,
        "required": required,
    })
}
