//! Untyped value coercion against a schema.
//!
//! YAML and query-style inputs often carry numbers and booleans as strings.
//! When an example or default sits next to a schema that says what it is,
//! the string form is converted to that type. Values that do not convert
//! are left untouched.

use crate::{JsonSchemaType, Schema};
use serde_json::{Map, Number, Value};

/// Convert `value` to the shape `schema` describes, recursing through
/// array items and object properties.
pub fn coerce_any(value: Value, schema: Option<&Schema>) -> Value {
    let Some(schema) = schema else {
        return value;
    };
    match value {
        Value::String(text) => coerce_string(text, schema),
        Value::Array(items) => {
            let item_schema = schema.items.as_ref().and_then(|items| items.target());
            Value::Array(
                items
                    .into_iter()
                    .map(|item| coerce_any(item, item_schema.as_deref()))
                    .collect(),
            )
        }
        Value::Object(fields) => {
            let mut coerced = Map::with_capacity(fields.len());
            for (name, field) in fields {
                let property = schema
                    .properties
                    .get(&name)
                    .and_then(|property| property.target());
                coerced.insert(name, coerce_any(field, property.as_deref()));
            }
            Value::Object(coerced)
        }
        other => other,
    }
}

fn coerce_string(text: String, schema: &Schema) -> Value {
    if text == "null" && schema.is_nullable() {
        return Value::Null;
    }
    let converted = match schema.primary_type() {
        Some(JsonSchemaType::Integer) => text.trim().parse::<i64>().ok().map(Value::from),
        Some(JsonSchemaType::Number) => text
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        Some(JsonSchemaType::Boolean) => match text.trim() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    };
    converted.unwrap_or(Value::String(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars_follow_primary_type() {
        assert_eq!(coerce_any(json!("12"), Some(&Schema::integer())), json!(12));
        assert_eq!(coerce_any(json!("1.5"), Some(&Schema::number())), json!(1.5));
        assert_eq!(coerce_any(json!("true"), Some(&Schema::boolean())), json!(true));
        assert_eq!(coerce_any(json!("12"), Some(&Schema::string())), json!("12"));
        assert_eq!(coerce_any(json!("abc"), Some(&Schema::integer())), json!("abc"));
        assert_eq!(coerce_any(json!("12"), None), json!("12"));
    }

    #[test]
    fn test_nullable_accepts_null_text() {
        let mut schema = Schema::integer();
        assert_eq!(coerce_any(json!("null"), Some(&schema)), json!("null"));
        schema.nullable = true;
        assert_eq!(coerce_any(json!("null"), Some(&schema)), Value::Null);
    }

    #[test]
    fn test_recurses_through_items_and_properties() {
        let schema = Schema::object()
            .with_property("id", Schema::integer())
            .with_property("tags", Schema::array(Schema::boolean()))
            .with_property("name", Schema::string());
        let value = json!({"id": "7", "tags": ["true", "false"], "name": "10", "extra": "1"});

        assert_eq!(
            coerce_any(value, Some(&schema)),
            json!({"id": 7, "tags": [true, false], "name": "10", "extra": "1"})
        );
    }
}
