//! Attribute values as seen by the plan engine.
//!
//! Every attribute value is in exactly one of three states: null, unknown or
//! known. [`Value`] spells that out as a sum type so that an empty string and
//! an absent one never look alike. Types that want a looser notion of
//! equality than byte identity implement [`SemanticEquals`].

use crate::error::{Error, Result};
use serde::de::{Deserialize, Deserializer};
use serde::ser::{self, Serialize, Serializer};
use serde_json::{Number, Value as Json};
use std::any::Any;
use std::fmt;

mod case_insensitive;

pub use case_insensitive::{fold_eq, CaseInsensitiveString};

/// Schema-level type of an attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttrType {
    String,
    Bool,
    Number,
    CaseInsensitiveString,
}

impl AttrType {
    /// Stable name of the values this type produces.
    pub fn value_type_name(self) -> &'static str {
        match self {
            AttrType::String => "basetypes.StringValue",
            AttrType::Bool => "basetypes.BoolValue",
            AttrType::Number => "basetypes.NumberValue",
            AttrType::CaseInsensitiveString => "CaseInsensitiveValue",
        }
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttrType::String => "basetypes.StringType",
            AttrType::Bool => "basetypes.BoolType",
            AttrType::Number => "basetypes.NumberType",
            AttrType::CaseInsensitiveString => "CaseInsensitiveType",
        };
        f.write_str(name)
    }
}

/// An attribute value of some concrete kind.
pub trait AttrValue: fmt::Debug + Any {
    fn attr_type(&self) -> AttrType;

    fn is_null(&self) -> bool;

    fn is_unknown(&self) -> bool;

    /// Type-erased copy of the value, used for rendering plans.
    fn to_json(&self) -> Value<Json>;

    fn as_any(&self) -> &dyn Any;

    /// Reads the value from a JSON document. An absent attribute and a JSON
    /// `null` both read as null.
    fn from_json(json: Option<&Json>) -> Result<Self>
    where
        Self: Sized;

    fn new_unknown() -> Self
    where
        Self: Sized;
}

/// Capability of deciding whether two values differ enough to plan a change.
pub trait SemanticEquals: AttrValue {
    /// Returns `Ok(true)` when `other` should be treated as unchanged.
    ///
    /// `other` must be of the same concrete kind as `self`; anything else is
    /// reported as [`Error::TypeMismatch`] and callers must treat it as "not
    /// equal".
    fn semantic_equals(&self, other: &dyn AttrValue) -> Result<bool>;

    /// The value both sides settle on: `other` when the two are semantically
    /// equal, `None` when a change has to be planned.
    fn reconcile(&self, other: &dyn AttrValue) -> Result<Option<Self>>
    where
        Self: Sized + Clone,
    {
        if !self.semantic_equals(other)? {
            return Ok(None);
        }
        Ok(same_kind(self, other).ok().cloned())
    }
}

/// Downcasts `other` to the kind of `expected`, or reports the mismatch.
pub(crate) fn same_kind<'a, V: AttrValue>(expected: &V, other: &'a dyn AttrValue) -> Result<&'a V> {
    other.as_any().downcast_ref::<V>().ok_or_else(|| {
        Error::type_mismatch(
            expected.attr_type().value_type_name(),
            other.attr_type().value_type_name(),
        )
    })
}

/// Tri-state attribute value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value<T> {
    Null,
    Unknown,
    Known(T),
}

pub type StringValue = Value<String>;
pub type BoolValue = Value<bool>;
pub type NumberValue = Value<Number>;

impl<T> Value<T> {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    pub fn as_known(&self) -> Option<&T> {
        match self {
            Value::Known(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Value<U> {
        match self {
            Value::Null => Value::Null,
            Value::Unknown => Value::Unknown,
            Value::Known(v) => Value::Known(f(v)),
        }
    }
}

impl<T> Default for Value<T> {
    fn default() -> Self {
        Value::Null
    }
}

impl<T> From<Option<T>> for Value<T> {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Value::Known)
    }
}

impl<T: fmt::Display> fmt::Display for Value<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Unknown => f.write_str("(known after apply)"),
            Value::Known(v) => fmt::Display::fmt(v, f),
        }
    }
}

// Unknown values only exist during planning and never reach state.
impl<T: Serialize> Serialize for Value<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Unknown => Err(ser::Error::custom("cannot serialize an unknown value")),
            Value::Known(v) => serializer.serialize_some(v),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Value<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Value::from)
    }
}

/// Scalars backing the base value types.
pub trait Scalar: Clone + PartialEq + fmt::Debug + 'static {
    const ATTR_TYPE: AttrType;

    fn to_json(&self) -> Json;

    fn from_json(json: &Json) -> Option<Self>;

    /// Equality of two known values.
    fn same(&self, other: &Self) -> bool {
        self == other
    }
}

impl Scalar for String {
    const ATTR_TYPE: AttrType = AttrType::String;

    fn to_json(&self) -> Json {
        Json::String(self.clone())
    }

    fn from_json(json: &Json) -> Option<Self> {
        json.as_str().map(str::to_owned)
    }
}

impl Scalar for bool {
    const ATTR_TYPE: AttrType = AttrType::Bool;

    fn to_json(&self) -> Json {
        Json::Bool(*self)
    }

    fn from_json(json: &Json) -> Option<Self> {
        json.as_bool()
    }
}

// Terraform numbers are arbitrary precision; integers compare exactly and
// anything else as f64, so `1` and `1.0` are the same number.
impl Scalar for Number {
    const ATTR_TYPE: AttrType = AttrType::Number;

    fn to_json(&self) -> Json {
        Json::Number(self.clone())
    }

    fn from_json(json: &Json) -> Option<Self> {
        match json {
            Json::Number(n) => Some(n.clone()),
            _ => None,
        }
    }

    fn same(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.as_i64(), other.as_i64()) {
            return a == b;
        }
        if let (Some(a), Some(b)) = (self.as_u64(), other.as_u64()) {
            return a == b;
        }
        self.as_f64() == other.as_f64()
    }
}

impl<T: Scalar> AttrValue for Value<T> {
    fn attr_type(&self) -> AttrType {
        T::ATTR_TYPE
    }

    fn is_null(&self) -> bool {
        Value::is_null(self)
    }

    fn is_unknown(&self) -> bool {
        Value::is_unknown(self)
    }

    fn to_json(&self) -> Value<Json> {
        self.clone().map(|v| v.to_json())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn from_json(json: Option<&Json>) -> Result<Self> {
        match json {
            None | Some(Json::Null) => Ok(Value::Null),
            Some(json) => T::from_json(json).map(Value::Known).ok_or_else(|| {
                Error::invalid_value(T::ATTR_TYPE, format!("unexpected JSON value {}", json))
            }),
        }
    }

    fn new_unknown() -> Self {
        Value::Unknown
    }
}

// Base types compare by identity: both null, both unknown, or equal values.
impl<T: Scalar> SemanticEquals for Value<T> {
    fn semantic_equals(&self, other: &dyn AttrValue) -> Result<bool> {
        let other = same_kind(self, other)?;
        Ok(match (self, other) {
            (Value::Known(a), Value::Known(b)) => a.same(b),
            (a, b) => a == b,
        })
    }
}
