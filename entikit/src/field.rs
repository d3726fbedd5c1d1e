//! Field descriptors: what a single named attribute holds, whether it must be
//! supplied, and how it is filled when it is not.
//!
//! [`FieldDescriptor`] is the type-erased form stored in a [`Schema`]. The
//! typed [`Field`] builder wraps it with a kind marker so that `default` and
//! `default_fn` only accept Rust values of the declared kind.
//!
//! [`Schema`]: crate::schema::Schema

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::value::Value;

/// The kind of a field — determines what shape the value takes.
///
/// Kinds are descriptive only. Assignments are not checked against them at
/// runtime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Date,
    Array { items: Box<FieldKind> },
    Entity,
}

/// Shared computed-default function.
pub type DefaultFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// How an absent field is filled.
#[derive(Clone, Default)]
pub enum DefaultPolicy {
    #[default]
    None,
    /// Cloned into every instance.
    Static(Value),
    /// Invoked once per entity construction.
    Computed(DefaultFn),
}

impl fmt::Debug for DefaultPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultPolicy::None => f.write_str("None"),
            DefaultPolicy::Static(v) => f.debug_tuple("Static").field(v).finish(),
            DefaultPolicy::Computed(_) => f.write_str("Computed(<fn>)"),
        }
    }
}

/// A field descriptor — requiredness and default strategy for one attribute.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    kind: FieldKind,
    required: bool,
    default: DefaultPolicy,
}

impl FieldDescriptor {
    /// A required descriptor of the given kind with no default.
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            required: true,
            default: DefaultPolicy::None,
        }
    }

    /// Absent values resolve to undefined instead of failing construction.
    pub fn not_required(mut self) -> Self {
        self.required = false;
        self
    }

    /// Replace the default policy with a static value.
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = DefaultPolicy::Static(value);
        self
    }

    /// Replace the default policy with a computed function.
    pub fn with_default_fn(mut self, f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.default = DefaultPolicy::Computed(Arc::new(f));
        self
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn has_default(&self) -> bool {
        !matches!(self.default, DefaultPolicy::None)
    }

    pub fn default_policy(&self) -> &DefaultPolicy {
        &self.default
    }

    /// Resolve the default for one construction.
    ///
    /// Static values are cloned, so arrays never alias between instances.
    pub fn resolve_default(&self) -> Option<Value> {
        match &self.default {
            DefaultPolicy::None => None,
            DefaultPolicy::Static(v) => Some(v.clone()),
            DefaultPolicy::Computed(f) => Some(f()),
        }
    }
}

// --- Kind markers ---

/// Type-level marker for a field kind.
pub trait Kind {
    fn kind() -> FieldKind;
}

/// Rust types accepted as values for fields of kind `K`.
pub trait Assign<K: Kind>: Into<Value> {}

/// Marker for `string()` fields.
#[derive(Debug, Clone, Copy)]
pub struct StringKind;

/// Marker for `number()` fields.
#[derive(Debug, Clone, Copy)]
pub struct NumberKind;

/// Marker for `boolean()` fields.
#[derive(Debug, Clone, Copy)]
pub struct BooleanKind;

/// Marker for `date()` fields.
#[derive(Debug, Clone, Copy)]
pub struct DateKind;

/// Marker for `array::<K>()` fields.
#[derive(Debug, Clone, Copy)]
pub struct ArrayKind<K>(PhantomData<K>);

/// Marker for `entity()` fields.
#[derive(Debug, Clone, Copy)]
pub struct EntityKind;

impl Kind for StringKind {
    fn kind() -> FieldKind {
        FieldKind::String
    }
}

impl Kind for NumberKind {
    fn kind() -> FieldKind {
        FieldKind::Number
    }
}

impl Kind for BooleanKind {
    fn kind() -> FieldKind {
        FieldKind::Boolean
    }
}

impl Kind for DateKind {
    fn kind() -> FieldKind {
        FieldKind::Date
    }
}

impl<K: Kind> Kind for ArrayKind<K> {
    fn kind() -> FieldKind {
        FieldKind::Array {
            items: Box::new(K::kind()),
        }
    }
}

impl Kind for EntityKind {
    fn kind() -> FieldKind {
        FieldKind::Entity
    }
}

impl Assign<StringKind> for String {}
impl Assign<StringKind> for &str {}
impl Assign<BooleanKind> for bool {}
impl Assign<DateKind> for DateTime<Utc> {}
impl Assign<EntityKind> for Entity {}
impl<K: Kind, T: Assign<K>> Assign<ArrayKind<K>> for Vec<T> {}

macro_rules! assign_number {
    ($($ty:ty),*) => {
        $(impl Assign<NumberKind> for $ty {})*
    };
}

assign_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// Typed field builder produced by the constructors in [`crate::fields`].
///
/// Each call consumes the builder and returns the updated one, so a
/// descriptor shared between schemas can never be changed underneath them.
pub struct Field<K> {
    descriptor: FieldDescriptor,
    _kind: PhantomData<fn() -> K>,
}

impl<K: Kind> Field<K> {
    pub(crate) fn new() -> Self {
        Self {
            descriptor: FieldDescriptor::new(K::kind()),
            _kind: PhantomData,
        }
    }

    /// Mark the field optional.
    pub fn not_required(self) -> Self {
        Self {
            descriptor: self.descriptor.not_required(),
            _kind: PhantomData,
        }
    }

    /// Fill absent values with `value`. Replaces any earlier default.
    pub fn default<V: Assign<K>>(self, value: V) -> Self {
        Self {
            descriptor: self.descriptor.with_default(value.into()),
            _kind: PhantomData,
        }
    }

    /// Fill absent values by calling `f` once per construction. Replaces any
    /// earlier default.
    pub fn default_fn<V, F>(self, f: F) -> Self
    where
        V: Assign<K>,
        F: Fn() -> V + Send + Sync + 'static,
    {
        Self {
            descriptor: self.descriptor.with_default_fn(move || f().into()),
            _kind: PhantomData,
        }
    }

    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    pub fn into_descriptor(self) -> FieldDescriptor {
        self.descriptor
    }
}

impl<K: Kind> Field<ArrayKind<K>> {
    /// Default to an empty array, materialized fresh for every instance.
    pub fn default_empty(self) -> Self {
        Self {
            descriptor: self.descriptor.with_default(Value::Array(Vec::new())),
            _kind: PhantomData,
        }
    }
}

impl<K> Clone for Field<K> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K> fmt::Debug for Field<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

impl<K> From<Field<K>> for FieldDescriptor {
    fn from(field: Field<K>) -> Self {
        field.descriptor
    }
}
