//! Runtime values held by entity fields.
//!
//! A [`Value`] is what a field resolves to once an entity is materialized.
//! Strings and arrays are owned and deep-copied on clone; an embedded
//! [`Entity`] is a shared handle, so two parents holding the same child see
//! the same live record.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::Number;

use crate::entity::Entity;
use crate::error::{EntityError, Result};

/// A resolved field value.
#[derive(Debug, Clone)]
pub enum Value {
    String(String),
    Number(Number),
    /// A float with no JSON number form: NaN or an infinity. Kept as given
    /// and serialized as `null`.
    NonFinite(f64),
    Bool(bool),
    Date(DateTime<Utc>),
    Array(Vec<Value>),
    Entity(Entity),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) | Value::NonFinite(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Date(_) => "date",
            Value::Array(_) => "array",
            Value::Entity(_) => "entity",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            Value::NonFinite(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Mutable access to array items. Only affects this copy of the value.
    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Value::Entity(e) => Some(e),
            _ => None,
        }
    }

    /// Convert to a plain JSON value. Nested entities are serialized through
    /// their own field order.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::NonFinite(_) => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Date(d) => serde_json::Value::String(format_date(d)),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Entity(e) => e.to_json(),
        }
    }
}

/// Dates render as RFC 3339 in UTC with millisecond precision.
pub(crate) fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => a == b,
            },
            (Value::NonFinite(a), Value::NonFinite(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Entity(a), Value::Entity(b)) => a.same_instance(b),
            _ => false,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Number(n) => n.serialize(serializer),
            Value::NonFinite(_) => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Date(d) => serializer.serialize_str(&format_date(d)),
            Value::Array(items) => items.serialize(serializer),
            Value::Entity(e) => e.serialize(serializer),
        }
    }
}

// --- Conversions into values ---

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Date(v)
    }
}

impl From<Entity> for Value {
    fn from(v: Entity) -> Self {
        Value::Entity(v)
    }
}

impl From<Number> for Value {
    fn from(v: Number) -> Self {
        Value::Number(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

macro_rules! from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Number(Number::from(v))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f64> for Value {
    /// Integral floats are stored as integers so they serialize as `1`, not
    /// `1.0`. NaN and infinities become [`Value::NonFinite`].
    fn from(v: f64) -> Self {
        if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
            return Value::Number(Number::from(v as i64));
        }
        match Number::from_f64(v) {
            Some(n) => Value::Number(n),
            None => Value::NonFinite(v),
        }
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::from(f64::from(v))
    }
}

// --- Conversions out of values ---

/// Conversion from a stored [`Value`] into a concrete Rust type.
///
/// Implemented for the types the field constructors produce, so that
/// `Entity::get_as` can hand back `String`, `i64`, `Vec<String>` and so on.
pub trait FromValue: Sized {
    /// Name reported in [`EntityError::TypeMismatch`].
    const EXPECTED: &'static str;

    fn from_value(value: Value) -> std::result::Result<Self, Value>;
}

impl FromValue for Value {
    const EXPECTED: &'static str = "value";

    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        Ok(value)
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "string";

    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(other),
        }
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(other),
        }
    }
}

impl FromValue for i64 {
    const EXPECTED: &'static str = "integer";

    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value.as_i64() {
            Some(n) => Ok(n),
            None => Err(value),
        }
    }
}

impl FromValue for u64 {
    const EXPECTED: &'static str = "unsigned integer";

    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        let unsigned = match &value {
            Value::Number(n) => n.as_u64(),
            _ => None,
        };
        unsigned.ok_or(value)
    }
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "number";

    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value.as_f64() {
            Some(n) => Ok(n),
            None => Err(value),
        }
    }
}

impl FromValue for DateTime<Utc> {
    const EXPECTED: &'static str = "date";

    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Date(d) => Ok(d),
            other => Err(other),
        }
    }
}

impl FromValue for Entity {
    const EXPECTED: &'static str = "entity";

    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Entity(e) => Ok(e),
            other => Err(other),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const EXPECTED: &'static str = "array";

    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Array(items) => {
                // Keep the original array intact for the error path.
                let snapshot = items.clone();
                items
                    .into_iter()
                    .map(T::from_value)
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|_| Value::Array(snapshot))
            }
            other => Err(other),
        }
    }
}

/// Convert `value` for `field`, mapping failures to [`EntityError::TypeMismatch`].
pub(crate) fn convert<T: FromValue>(field: &str, value: Value) -> Result<T> {
    T::from_value(value).map_err(|found| EntityError::TypeMismatch {
        field: field.to_string(),
        expected: T::EXPECTED,
        found: found.type_name(),
    })
}
