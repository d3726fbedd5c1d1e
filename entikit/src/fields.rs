//! Field constructors.
//!
//! Each returns a fresh, required [`Field`] with no default.

use crate::field::{
    ArrayKind, BooleanKind, DateKind, EntityKind, Field, Kind, NumberKind, StringKind,
};

/// Create a new string field
pub fn string() -> Field<StringKind> {
    Field::new()
}

/// Create a new number field
pub fn number() -> Field<NumberKind> {
    Field::new()
}

/// Create a new boolean field
pub fn boolean() -> Field<BooleanKind> {
    Field::new()
}

/// Create a new date field
pub fn date() -> Field<DateKind> {
    Field::new()
}

/// Create a new array field holding items of kind `K`
pub fn array<K: Kind>() -> Field<ArrayKind<K>> {
    Field::new()
}

/// Create a new field holding a nested entity
pub fn entity() -> Field<EntityKind> {
    Field::new()
}
