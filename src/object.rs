//! Host objects: how arbitrary application types take part in key chains.
//!
//! A type becomes reachable from expressions by implementing [`KeyObject`]
//! and being wrapped with [`Value::object`](crate::Value::object). It can
//! answer keys itself ([`KeyObject::get_key_value`]), publish a static table
//! of named accessors ([`KeyObject::properties`]), or both.
//!
//! ```
//! use std::any::Any;
//! use keychain::{AccessError, KeyObject, Property, Value, object::downcast};
//!
//! #[derive(Debug)]
//! struct Account {
//!     owner: String,
//!     balance: i64,
//! }
//!
//! static ACCOUNT_PROPERTIES: &[Property] = &[
//!     Property::read_only("owner", |obj| Ok(Value::from(downcast::<Account>(obj)?.owner.as_str()))),
//!     Property::read_only("balance", |obj| Ok(Value::from(downcast::<Account>(obj)?.balance))),
//! ];
//!
//! impl KeyObject for Account {
//!     fn properties(&self) -> &'static [Property] {
//!         ACCOUNT_PROPERTIES
//!     }
//! }
//!
//! let account = Value::object(Account { owner: "ada".into(), balance: 12 });
//! assert_eq!(keychain::value(&account, "getBalance + 1"), Value::from(13));
//! ```

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;

use crate::value::Value;

/// Failures of key resolution and mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessError {
    /// Target is null
    NullTarget { key: String },

    /// Target has no writable key of this name
    NoSetter { type_name: String, key: String },

    /// Accessor was handed an object of another type
    WrongType { expected: &'static str },

    /// Value cannot be stored under this key
    InvalidValue { key: String, message: String },

    /// Assignment target is not a key or a dotted path ending in a key
    NotAssignable { target: String },

    /// Host accessor reported a failure
    Failed(String),
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessError::NullTarget { key } => write!(f, "Trying to set key {} on null", key),
            AccessError::NoSetter { type_name, key } => {
                write!(f, "No setter for key {} on {}", key, type_name)
            }
            AccessError::WrongType { expected } => {
                write!(f, "Accessor expected an object of type {}", expected)
            }
            AccessError::InvalidValue { key, message } => {
                write!(f, "Invalid value for key {}: {}", key, message)
            }
            AccessError::NotAssignable { target } => {
                write!(f, "Cannot assign to {}: last segment is not a key", target)
            }
            AccessError::Failed(msg) => write!(f, "Accessor failed: {}", msg),
        }
    }
}

impl std::error::Error for AccessError {}

pub type Getter = fn(&dyn Any) -> Result<Value, AccessError>;
pub type Setter = fn(&dyn Any, Value) -> Result<(), AccessError>;

/// A named accessor in a type's property table.
///
/// Lookup is by normalized name (see [`standard_key`](crate::key::standard_key)),
/// so a property `balance` answers `balance`, `Balance` and `getBalance`.
#[derive(Clone, Copy)]
pub struct Property {
    pub name: &'static str,
    pub get: Getter,
    pub set: Option<Setter>,
}

impl Property {
    pub const fn read_only(name: &'static str, get: Getter) -> Self {
        Property {
            name,
            get,
            set: None,
        }
    }

    pub const fn read_write(name: &'static str, get: Getter, set: Setter) -> Self {
        Property {
            name,
            get,
            set: Some(set),
        }
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("writable", &self.set.is_some())
            .finish()
    }
}

/// Downcasts the receiver handed to a [`Getter`] or [`Setter`].
pub fn downcast<T: Any>(obj: &dyn Any) -> Result<&T, AccessError> {
    obj.downcast_ref::<T>().ok_or(AccessError::WrongType {
        expected: std::any::type_name::<T>(),
    })
}

/// Capabilities a host object exposes to key chain evaluation.
///
/// Every method has a default, so an implementation only overrides what the
/// type supports. Mutating methods take `&self`: objects shared with the
/// evaluator use interior mutability.
pub trait KeyObject: Any + Send + Sync + fmt::Debug {
    /// Name used in diagnostics.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Answers `key` directly. `Ok(None)` defers to [`KeyObject::properties`].
    fn get_key_value(&self, key: &str) -> Result<Option<Value>, AccessError> {
        let _ = key;
        Ok(None)
    }

    /// Stores `value` under `key`. `Ok(false)` defers to [`KeyObject::properties`].
    fn set_key_value(&self, key: &str, value: Value) -> Result<bool, AccessError> {
        let _ = (key, value);
        Ok(false)
    }

    /// Static accessor table, consulted when [`KeyObject::get_key_value`] defers.
    fn properties(&self) -> &'static [Property] {
        &[]
    }

    /// Natural ordering against another value, if the type has one.
    fn compare_to(&self, other: &Value) -> Option<Ordering> {
        let _ = other;
        None
    }

    /// Value equality with another host object.
    fn value_eq(&self, other: &dyn KeyObject) -> bool {
        let _ = other;
        false
    }

    /// Natural string form. `None` makes string concatenation yield null.
    fn text(&self) -> Option<String> {
        None
    }

    /// Length, for list-like objects.
    fn list_len(&self) -> Option<usize> {
        None
    }

    /// Element at `index` of a list-like object.
    fn list_get(&self, index: usize) -> Option<Value> {
        let _ = index;
        None
    }
}
