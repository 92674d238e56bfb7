//! Coercions for loosely typed daemon JSON. Nothing here fails: values of the
//! wrong type become `None` and callers pick the default.

use std::collections::BTreeMap;

use serde_json::Value;

/// Non-negative integer from a number or numeric string
pub fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn as_str(value: &Value) -> Option<&str> {
    value.as_str()
}

pub fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// First of `keys` present on `object`
pub fn field<'a>(object: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let map = object.as_object()?;
    keys.iter()
        .find_map(|key| map.get(*key).filter(|v| !v.is_null()))
}

pub fn string_field(object: &Value, keys: &[&str]) -> Option<String> {
    field(object, keys)
        .and_then(as_str)
        .map(str::to_string)
}

pub fn u64_field(object: &Value, keys: &[&str]) -> Option<u64> {
    field(object, keys).and_then(as_u64)
}

pub fn bool_field(object: &Value, keys: &[&str]) -> Option<bool> {
    field(object, keys).and_then(as_bool)
}

/// Flatten an object into string values; scalars are stringified and nested
/// structures dropped
pub fn string_map(value: Option<&Value>) -> BTreeMap<String, String> {
    let Some(Value::Object(map)) = value else {
        return BTreeMap::new();
    };

    map.iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((key.clone(), text))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_as_u64_coercions() {
        assert_eq!(as_u64(&json!(42)), Some(42));
        assert_eq!(as_u64(&json!(42.9)), Some(42));
        assert_eq!(as_u64(&json!(" 17 ")), Some(17));
        assert_eq!(as_u64(&json!(-5)), None);
        assert_eq!(as_u64(&json!("abc")), None);
        assert_eq!(as_u64(&json!({"a": 1})), None);
        assert_eq!(as_u64(&Value::Null), None);
    }

    #[test]
    fn test_field_takes_first_present_key() {
        let value = json!({"amountMsat": 5, "amount_msat": null});
        assert_eq!(u64_field(&value, &["amount_msat", "amountMsat"]), Some(5));
        assert_eq!(u64_field(&json!("not an object"), &["amount_msat"]), None);
    }

    #[test]
    fn test_string_map_drops_nested_values() {
        let map = string_map(Some(&json!({
            "federation_name": "Test",
            "max_balance": 100,
            "nested": {"a": 1},
            "flag": true
        })));

        assert_eq!(map.get("federation_name").map(String::as_str), Some("Test"));
        assert_eq!(map.get("max_balance").map(String::as_str), Some("100"));
        assert_eq!(map.get("flag").map(String::as_str), Some("true"));
        assert!(!map.contains_key("nested"));
        assert!(string_map(Some(&json!([1, 2]))).is_empty());
        assert!(string_map(None).is_empty());
    }
}
