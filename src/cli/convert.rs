//! JSON <-> Value conversion

use crate::Value;

/// Convert a JSON document into a Value. Integers that fit 32 bits become
/// `Integer`, wider ones `Long`.
pub fn json_to_value(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => match i32::try_from(i) {
                Ok(small) => Value::Integer(small),
                Err(_) => Value::Long(i),
            },
            None => n.as_f64().map(Value::Double).unwrap_or(Value::Null),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::List(arr.into_iter().map(json_to_value).collect()),
        serde_json::Value::Object(obj) => {
            Value::Object(obj.into_iter().map(|(k, v)| (k, json_to_value(v))).collect())
        }
    }
}

/// Convert a Value to JSON. GUIDs and dates become strings; non-finite
/// doubles become null.
pub fn value_to_json(v: Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(b),
        Value::Integer(i) => serde_json::Value::Number(i.into()),
        Value::Long(i) => serde_json::Value::Number(i.into()),
        Value::Double(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s),
        v @ (Value::Guid(_) | Value::Date(_) | Value::DateTime(_)) => {
            serde_json::Value::String(v.to_string())
        }
        Value::List(items) => serde_json::Value::Array(items.into_iter().map(value_to_json).collect()),
        Value::Object(obj) => serde_json::Value::Object(
            obj.into_iter()
                .map(|(k, v)| (k, value_to_json(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_widths() {
        assert_eq!(json_to_value(json!(5)), Value::Integer(5));
        assert_eq!(json_to_value(json!(5_000_000_000i64)), Value::Long(5_000_000_000));
        assert_eq!(json_to_value(json!(1.5)), Value::Double(1.5));
    }

    #[test]
    fn test_nested_document() {
        let value = json_to_value(json!({"order": {"items": [1, 2]}}));
        assert_eq!(value_to_json(value), json!({"order": {"items": [1, 2]}}));
    }
}
