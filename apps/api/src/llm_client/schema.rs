//! Builders for Gemini response schemas (the OpenAPI subset accepted by
//! `generationConfig.responseSchema`).

use serde_json::{json, Map, Value};

pub fn string(description: &str) -> Value {
    json!({ "type": "STRING", "description": description })
}

/// Bounded list. Gemini treats `minItems`/`maxItems` as hard constraints.
pub fn array(items: Value, min_items: usize, max_items: usize, description: &str) -> Value {
    json!({
        "type": "ARRAY",
        "description": description,
        "items": items,
        "minItems": min_items,
        "maxItems": max_items,
    })
}

/// Object whose fields are all required and emitted in the given order.
pub fn object(fields: Vec<(&str, Value)>) -> Value {
    let order: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
    let properties: Map<String, Value> = fields
        .into_iter()
        .map(|(name, schema)| (name.to_string(), schema))
        .collect();

    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": order,
        "propertyOrdering": order,
    })
}
