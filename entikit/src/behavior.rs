//! Behavior methods attached to entities.
//!
//! A behavior definition receives an [`Accessor`](crate::entity::Accessor)
//! bound to the instance under construction and returns the named methods
//! that instance exposes. Methods are plain closures; the state they touch is
//! whatever accessor they captured.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::value::Value;

/// A single behavior method.
///
/// Arguments arrive as a slice of [`Value`]s. A method may return a value;
/// any error it raises is handed back to the caller of
/// [`Entity::call`](crate::entity::Entity::call) unchanged.
pub type Method = Arc<dyn Fn(&[Value]) -> anyhow::Result<Option<Value>> + Send + Sync>;

/// Named methods for one entity instance, in definition order.
#[derive(Clone, Default)]
pub struct Behaviors {
    methods: IndexMap<String, Method>,
}

impl Behaviors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a method. A later method with the same name replaces the earlier one.
    pub fn method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Value]) -> anyhow::Result<Option<Value>> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(f));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl fmt::Debug for Behaviors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
