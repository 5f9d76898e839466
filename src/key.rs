//! Key resolution and mutation against values.
//!
//! [`get_value`] maps a `(target, key)` pair to a value for every kind of
//! [`Value`]: maps look the key up, lists answer their size, strings expose a
//! few built-in accessors and host objects answer through [`KeyObject`].
//! Property-table lookups on host objects are resolved once per
//! `(type, key)` pair and cached.

use std::any::{Any, TypeId};
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;

use crate::object::{AccessError, KeyObject, Property};
use crate::value::Value;

/// Slot of a key in a type's property table, `None` when the type has none.
static ACCESSORS: LazyLock<DashMap<(TypeId, String), Option<usize>>> = LazyLock::new(DashMap::new);

/// Returns `key` in standard form: an `is`/`get` prefix followed by an
/// uppercase letter is dropped and the first letter is capitalized.
///
/// ```
/// use keychain::key::standard_key;
///
/// assert_eq!(standard_key("getName"), "Name");
/// assert_eq!(standard_key("isVisible"), "Visible");
/// assert_eq!(standard_key("issue"), "Issue");
/// assert_eq!(standard_key("get2"), "get2");
/// ```
pub fn standard_key(key: &str) -> String {
    let mut name = key;
    for prefix in ["is", "get"] {
        if let Some(rest) = key.strip_prefix(prefix)
            && rest.chars().next().is_some_and(char::is_uppercase)
        {
            name = rest;
            break;
        }
    }

    let mut chars = name.chars();
    match chars.next() {
        None => key.to_string(),
        Some(first) if first.is_numeric() => key.to_string(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Whether `text` could be used as a key: a letter or `_`, followed by
/// letters, digits, whitespace or `_`.
pub fn is_key(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c.is_whitespace() || c == '_')
}

/// Resolves `key` on `target`. Unknown keys, and accessors that fail,
/// yield [`Value::Null`].
pub fn get_value(target: &Value, key: &str) -> Value {
    match key {
        "this" => return target.clone(),
        "idHashCode" => return target.identity().map_or(Value::Null, Value::from),
        _ => {}
    }

    match target {
        Value::Map(map) => map
            .get(key)
            .or_else(|| map.get(&standard_key(key)))
            .unwrap_or(Value::Null),
        Value::List(list) => match standard_key(key).as_str() {
            "Size" | "Count" => Value::from(list.len()),
            _ => Value::Null,
        },
        Value::String(s) => string_key(s, key),
        Value::Object(obj) => match object_value(obj, key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, type_name = obj.type_name(), error = %e, "key lookup failed");
                Value::Null
            }
        },
        _ => Value::Null,
    }
}

/// Whether `target` answers `key` with something other than null.
pub fn has_key(target: &Value, key: &str) -> bool {
    !get_value(target, key).is_null()
}

fn string_key(s: &str, key: &str) -> Value {
    match standard_key(key).as_str() {
        "Length" => Value::from(s.chars().count()),
        "Empty" => Value::from(s.is_empty()),
        "UpperCase" => Value::from(s.to_uppercase()),
        "LowerCase" => Value::from(s.to_lowercase()),
        "Trim" => Value::from(s.trim()),
        _ => Value::Null,
    }
}

fn object_value(obj: &Arc<dyn KeyObject>, key: &str) -> Result<Value, AccessError> {
    if let Some(value) = obj.get_key_value(key)? {
        return Ok(value);
    }
    match property(&**obj, key) {
        Some(prop) => {
            let any: &dyn Any = &**obj;
            (prop.get)(any)
        }
        None => Ok(Value::Null),
    }
}

/// Finds the property table entry answering `key`, through the accessor cache.
fn property(obj: &dyn KeyObject, key: &str) -> Option<Property> {
    let table = obj.properties();
    if table.is_empty() {
        return None;
    }

    let any: &dyn Any = obj;
    let cache_key = (Any::type_id(any), key.to_string());
    if let Some(slot) = ACCESSORS.get(&cache_key).map(|entry| *entry) {
        return slot.and_then(|i| table.get(i).copied());
    }

    let wanted = standard_key(key);
    let slot = table
        .iter()
        .position(|prop| prop.name == key || standard_key(prop.name) == wanted);
    tracing::debug!(key, type_name = obj.type_name(), found = slot.is_some(), "resolved accessor");
    ACCESSORS.insert(cache_key, slot);
    slot.and_then(|i| table.get(i).copied())
}

/// Stores `value` under `key` on `target`.
///
/// Lists apply the assignment to every element, maps insert (or remove the
/// key when `value` is null) and host objects go through
/// [`KeyObject::set_key_value`] and then their property table.
pub fn set_value(target: &Value, key: &str, value: Value) -> Result<(), AccessError> {
    match target {
        Value::List(list) => {
            for item in list.to_vec() {
                set_value(&item, key, value.clone())?;
            }
            Ok(())
        }
        Value::Map(map) => {
            if value.is_null() {
                map.remove(key);
            } else {
                map.insert(key, value);
            }
            Ok(())
        }
        Value::Object(obj) => {
            if obj.set_key_value(key, value.clone())? {
                return Ok(());
            }
            match property(&**obj, key) {
                Some(Property { set: Some(set), .. }) => {
                    let any: &dyn Any = &**obj;
                    set(any, value)
                }
                _ => Err(AccessError::NoSetter {
                    type_name: obj.type_name().to_string(),
                    key: key.to_string(),
                }),
            }
        }
        Value::Null => Err(AccessError::NullTarget {
            key: key.to_string(),
        }),
        other => Err(AccessError::NoSetter {
            type_name: other.type_name().to_string(),
            key: key.to_string(),
        }),
    }
}

/// [`set_value`], logging a failure instead of returning it.
pub fn set_value_safe(target: &Value, key: &str, value: Value) {
    if let Err(e) = set_value(target, key, value) {
        tracing::warn!(key, type_name = target.type_name(), error = %e, "setting key failed");
    }
}

/// [`set_value`], ignoring failure.
pub fn set_value_silent(target: &Value, key: &str, value: Value) {
    let _ = set_value(target, key, value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_lookup_falls_back_to_standard_key() {
        let map = Value::map([("Name", Value::from("ada")), ("count", Value::from(1))]);
        assert_eq!(get_value(&map, "getName"), Value::from("ada"));
        assert_eq!(get_value(&map, "count"), Value::from(1));
        assert_eq!(get_value(&map, "missing"), Value::Null);
    }

    #[test]
    fn test_reserved_keys() {
        let list = Value::list([Value::from(1)]);
        assert!(get_value(&list, "this").same_reference(&list));
        assert_eq!(get_value(&list, "idHashCode"), get_value(&list.clone(), "idHashCode"));
        assert_eq!(get_value(&Value::from(3), "idHashCode"), Value::Null);
    }

    #[test]
    fn test_string_accessors() {
        let s = Value::from(" Hi ");
        assert_eq!(get_value(&s, "length"), Value::from(4));
        assert_eq!(get_value(&s, "trim"), Value::from("Hi"));
        assert_eq!(get_value(&s, "isEmpty"), Value::from(false));
    }

    #[test]
    fn test_is_key() {
        assert!(is_key("first name"));
        assert!(is_key("_x1"));
        assert!(!is_key("1x"));
        assert!(!is_key("a.b"));
        assert!(!is_key(""));
    }

    #[test]
    fn test_set_on_null_fails() {
        assert_eq!(
            set_value(&Value::Null, "a", Value::from(1)),
            Err(AccessError::NullTarget { key: "a".to_string() })
        );
    }
}
