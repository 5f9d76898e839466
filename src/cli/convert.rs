//! JSON <-> Value conversion utilities

use std::str::FromStr;
use std::time::UNIX_EPOCH;

use indexmap::IndexMap;
use rust_decimal::Decimal;

use crate::Value;

/// Convert serde_json::Value to a key chain Value
pub fn json_to_value(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => {
            let text = n.to_string();
            match Decimal::from_str(&text).or_else(|_| Decimal::from_scientific(&text)) {
                Ok(d) => Value::Number(d),
                Err(_) => n.as_f64().map_or(Value::Null, Value::Float),
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::list(arr.into_iter().map(json_to_value)),
        serde_json::Value::Object(obj) => Value::from(
            obj.into_iter()
                .map(|(k, v)| (k, json_to_value(v)))
                .collect::<IndexMap<String, Value>>(),
        ),
    }
}

/// Convert a key chain Value to serde_json::Value
///
/// Non-finite floats become `null`, dates their epoch milliseconds and host
/// objects their string form. A list or map nested inside itself becomes the
/// string `"(this List)"` / `"(this Map)"`.
pub fn value_to_json(v: &Value) -> serde_json::Value {
    to_json_within(v, &mut Vec::new())
}

fn to_json_within(v: &Value, open: &mut Vec<usize>) -> serde_json::Value {
    if let Some(id) = v.identity()
        && open.contains(&id)
    {
        let placeholder = if matches!(v, Value::List(_)) { "(this List)" } else { "(this Map)" };
        return serde_json::Value::String(placeholder.to_string());
    }

    match v {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => serde_json::from_str::<serde_json::Number>(&n.normalize().to_string())
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Date(t) => match t.duration_since(UNIX_EPOCH) {
            Ok(d) => serde_json::Value::from(d.as_millis() as u64),
            Err(e) => serde_json::Value::from(-(e.duration().as_millis() as i64)),
        },
        Value::List(list) => {
            open.push(list.id());
            let items = list.to_vec().iter().map(|item| to_json_within(item, open)).collect();
            open.pop();
            serde_json::Value::Array(items)
        }
        Value::Map(map) => {
            open.push(map.id());
            let entries = map
                .to_index_map()
                .iter()
                .map(|(k, item)| (k.clone(), to_json_within(item, open)))
                .collect();
            open.pop();
            serde_json::Value::Object(entries)
        }
        Value::Object(obj) => obj
            .text()
            .map_or(serde_json::Value::Null, serde_json::Value::String),
    }
}
