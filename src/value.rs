use std::fmt;
use std::sync::{Arc, LazyLock};
use std::time::{SystemTime, UNIX_EPOCH};

use indexmap::IndexMap;
use parking_lot::RwLock;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use crate::object::KeyObject;

/// A value produced or consumed by key chain evaluation.
///
/// Scalars are held by value. Lists, maps and host objects are shared
/// references: cloning a `Value::Map` clones the handle, so an assignment
/// made through an expression is visible to everyone holding the map.
///
/// # Examples
///
/// ```
/// use keychain::Value;
///
/// let order = Value::map([
///     ("id", Value::from(7)),
///     ("lines", Value::list([Value::from("pen"), Value::from("ink")])),
/// ]);
///
/// assert_eq!(keychain::value(&order, "lines.size"), Value::from(2));
/// ```
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Null,

    /// `true` / `false`
    Boolean(bool),

    /// Exact decimal number
    Number(Decimal),

    /// Floating point result that has no decimal form (infinities, NaN,
    /// out-of-range results, floored modulo)
    Float(f64),

    /// UTF-8 string
    String(String),

    /// Point in time
    Date(SystemTime),

    /// Shared, mutable list
    List(List),

    /// Shared, mutable, insertion-ordered map
    Map(Map),

    /// Opaque host object
    Object(Arc<dyn KeyObject>),
}

/// Shared handle to a list of values.
#[derive(Clone, Default)]
pub struct List(Arc<RwLock<Vec<Value>>>);

impl List {
    pub fn new(items: Vec<Value>) -> Self {
        List(Arc::new(RwLock::new(items)))
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Element at `index`, `None` when out of range.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.read().get(index).cloned()
    }

    pub fn push(&self, value: Value) {
        self.0.write().push(value);
    }

    /// Replaces the element at `index`; returns false when out of range.
    pub fn set(&self, index: usize, value: Value) -> bool {
        match self.0.write().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Copy of the current elements.
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.read().clone()
    }

    pub fn ptr_eq(&self, other: &List) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

/// Shared handle to a string-keyed map.
#[derive(Clone, Default)]
pub struct Map(Arc<RwLock<IndexMap<String, Value>>>);

impl Map {
    pub fn new(entries: IndexMap<String, Value>) -> Self {
        Map(Arc::new(RwLock::new(entries)))
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.read().get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.read().contains_key(key)
    }

    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.write().insert(key.into(), value)
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.write().shift_remove(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.read().keys().cloned().collect()
    }

    /// Copy of the current entries.
    pub fn to_index_map(&self) -> IndexMap<String, Value> {
        self.0.read().clone()
    }

    pub fn ptr_eq(&self, other: &Map) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

// Contents may refer back to the container, so both go through the
// cycle-aware natural form.
impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "List({})", Value::List(self.clone()))
    }
}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Map({})", Value::Map(self.clone()))
    }
}

static LEADING_INT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?[0-9]+").expect("integer pattern must compile"));
static LEADING_FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[-+]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][-+]?[0-9]+)?")
        .expect("float pattern must compile")
});

/// Formats a float the way it reads in source: no trailing `.0`.
pub(crate) fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{:.0}", f)
    } else {
        f.to_string()
    }
}

impl Value {
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(List::new(items.into_iter().collect()))
    }

    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Map(Map::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn object(obj: impl KeyObject) -> Self {
        Value::Object(Arc::new(obj))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Number(_) | Value::Float(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Float(f) => Decimal::from_f64(*f),
            _ => None,
        }
    }

    /// Returns a human-readable type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Object(obj) => obj.type_name(),
        }
    }

    /// Boolean coercion: numbers are true when non-zero, strings unless they
    /// read "false" (any case), everything else when non-null.
    pub fn to_bool(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => !n.is_zero(),
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.eq_ignore_ascii_case("false"),
            _ => true,
        }
    }

    /// Integer coercion: numbers truncate, strings yield their first integer,
    /// everything else zero.
    pub fn to_i64(&self) -> i64 {
        match self {
            Value::Number(n) => n.trunc().to_i64().unwrap_or(0),
            Value::Float(f) if f.is_finite() => *f as i64,
            Value::String(s) => LEADING_INT
                .find(s)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0),
            Value::Boolean(_) => 0,
            _ => 0,
        }
    }

    /// Floating point coercion: numbers convert, strings yield their first
    /// number, everything else zero.
    pub fn to_f64(&self) -> f64 {
        match self {
            Value::Number(n) => n.to_f64().unwrap_or(0.0),
            Value::Float(f) => *f,
            Value::String(s) => LEADING_FLOAT
                .find(s)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Numeric coercion: numbers as they are, strings parsed (exactly when
    /// possible), null stays null, anything else null.
    pub fn to_number(&self) -> Value {
        match self {
            Value::Number(_) | Value::Float(_) => self.clone(),
            Value::String(s) => match s.trim().parse::<Decimal>() {
                Ok(n) => Value::Number(n),
                Err(_) => Value::Float(self.to_f64()),
            },
            _ => Value::Null,
        }
    }

    /// Natural string form. Null, and host objects without one, have none.
    ///
    /// A list or map met again while it is being rendered prints as
    /// `(this List)` / `(this Map)`.
    pub fn text(&self) -> Option<String> {
        self.text_within(&mut Vec::new())
    }

    /// `open` holds the identities of the containers being rendered.
    fn text_within(&self, open: &mut Vec<usize>) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Boolean(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.normalize().to_string()),
            Value::Float(f) => Some(format_float(*f)),
            Value::String(s) => Some(s.clone()),
            Value::Date(t) => Some(match t.duration_since(UNIX_EPOCH) {
                Ok(d) => d.as_millis().to_string(),
                Err(e) => format!("-{}", e.duration().as_millis()),
            }),
            Value::List(list) => {
                if open.contains(&list.id()) {
                    return Some("(this List)".to_string());
                }
                open.push(list.id());
                let items: Vec<String> = list
                    .to_vec()
                    .iter()
                    .map(|item| item.element_text(open))
                    .collect();
                open.pop();
                Some(format!("[{}]", items.join(", ")))
            }
            Value::Map(map) => {
                if open.contains(&map.id()) {
                    return Some("(this Map)".to_string());
                }
                open.push(map.id());
                let entries: Vec<String> = map
                    .to_index_map()
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v.element_text(open)))
                    .collect();
                open.pop();
                Some(format!("{{{}}}", entries.join(", ")))
            }
            Value::Object(obj) => obj.text(),
        }
    }

    /// Form of a value nested in a list or map; never empty.
    fn element_text(&self, open: &mut Vec<usize>) -> String {
        match self.text_within(open) {
            Some(text) => text,
            None if self.is_null() => "null".to_string(),
            None => format!("<{}>", self.type_name()),
        }
    }

    /// Length of a list-like value.
    pub fn list_len(&self) -> Option<usize> {
        match self {
            Value::List(list) => Some(list.len()),
            Value::Object(obj) => obj.list_len(),
            _ => None,
        }
    }

    /// Element of a list-like value; `None` for other values and out-of-range indexes.
    pub fn list_get(&self, index: i64) -> Option<Value> {
        let index = usize::try_from(index).ok()?;
        match self {
            Value::List(list) => list.get(index),
            Value::Object(obj) => match obj.list_len() {
                Some(len) if index < len => obj.list_get(index),
                _ => None,
            },
            _ => None,
        }
    }

    /// Identity of a shared value: equal for handles to the same allocation.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::List(list) => Some(list.id()),
            Value::Map(map) => Some(map.id()),
            Value::Object(obj) => Some(Arc::as_ptr(obj) as *const () as usize),
            _ => None,
        }
    }

    /// Whether both values are handles to the same shared allocation.
    pub fn same_reference(&self, other: &Value) -> bool {
        match (self.identity(), other.identity()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// Structural equality. `open` holds the container pairs under
    /// comparison; meeting one again counts as equal.
    fn eq_within(&self, other: &Value, open: &mut Vec<(usize, usize)>) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Float(_), _) | (_, Value::Float(_)) if self.is_numeric() && other.is_numeric() => {
                self.to_f64() == other.to_f64()
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                let pair = (a.id(), b.id());
                if a.ptr_eq(b) || open.contains(&pair) {
                    return true;
                }
                let (xs, ys) = (a.to_vec(), b.to_vec());
                if xs.len() != ys.len() {
                    return false;
                }
                open.push(pair);
                let equal = xs.iter().zip(&ys).all(|(x, y)| x.eq_within(y, open));
                open.pop();
                equal
            }
            (Value::Map(a), Value::Map(b)) => {
                let pair = (a.id(), b.id());
                if a.ptr_eq(b) || open.contains(&pair) {
                    return true;
                }
                let (xs, ys) = (a.to_index_map(), b.to_index_map());
                if xs.len() != ys.len() {
                    return false;
                }
                open.push(pair);
                let equal = xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| x.eq_within(y, open)));
                open.pop();
                equal
            }
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b) || a.value_eq(b.as_ref()),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        self.eq_within(other, &mut Vec::new())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.element_text(&mut Vec::new()))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n.into())
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Decimal> for Value {
    fn from(n: Decimal) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<SystemTime> for Value {
    fn from(t: SystemTime) -> Self {
        Value::Date(t)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(List::new(items))
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(entries: IndexMap<String, Value>) -> Self {
        Value::Map(Map::new(entries))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
