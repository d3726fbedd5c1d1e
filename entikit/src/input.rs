//! Caller-supplied partial value sets for entity construction.

use indexmap::IndexMap;

use crate::value::Value;

/// Partial mapping of field name to value, consumed by
/// [`EntityFactory::create`](crate::factory::EntityFactory::create).
///
/// An entry set to `None` is explicitly undefined. It is treated exactly like
/// an absent key: the field's default applies if it has one.
#[derive(Debug, Clone, Default)]
pub struct Input {
    values: IndexMap<String, Option<Value>>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply a value for `field`.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(field.into(), Some(value.into()));
        self
    }

    /// Supply an optional value for `field`. `None` marks it undefined.
    pub fn set_opt<V: Into<Value>>(mut self, field: impl Into<String>, value: Option<V>) -> Self {
        self.values.insert(field.into(), value.map(Into::into));
        self
    }

    /// In-place variant of [`Input::set`].
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(field.into(), Some(value.into()));
    }

    /// The supplied value, if present and defined.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field).and_then(Option::as_ref)
    }

    /// Whether the key was supplied at all, defined or not.
    pub fn contains_key(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Supplied keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Move the defined value for `field` out of the input.
    pub(crate) fn take(&mut self, field: &str) -> Option<Value> {
        self.values.shift_remove(field).flatten()
    }
}

impl<K, V> FromIterator<(K, V)> for Input
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        }
    }
}

/// Build an [`Input`] from `field => value` pairs.
///
/// ```rust
/// let input = entikit::input! {
///     "id" => 1,
///     "name" => "testName",
///     "isActive" => true,
/// };
/// assert_eq!(input.len(), 3);
/// ```
#[macro_export]
macro_rules! input {
    () => {
        $crate::Input::new()
    };
    ($($field:expr => $value:expr),+ $(,)?) => {
        $crate::Input::new()$(.set($field, $value))+
    };
}
