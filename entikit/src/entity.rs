//! Materialized entity instances.
//!
//! An [`Entity`] owns one value slot per schema field. External callers can
//! read every slot and serialize the record, but cannot write to it. Writes
//! go through an [`Accessor`], which only behavior definitions receive.
//!
//! `Entity` is a handle: cloning it, or storing it in another entity's field,
//! shares the same record.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::{debug, trace};

use crate::behavior::Behaviors;
use crate::config::EntikitConfig;
use crate::error::{EntityError, Result};
use crate::schema::Schema;
use crate::value::{convert, FromValue, Value};

type Slots = Arc<RwLock<Vec<Option<Value>>>>;

// Lock poisoning only means a behavior panicked mid-call; the slots are
// still a valid record.
fn read(slots: &RwLock<Vec<Option<Value>>>) -> RwLockReadGuard<'_, Vec<Option<Value>>> {
    slots.read().unwrap_or_else(PoisonError::into_inner)
}

fn write(slots: &RwLock<Vec<Option<Value>>>) -> RwLockWriteGuard<'_, Vec<Option<Value>>> {
    slots.write().unwrap_or_else(PoisonError::into_inner)
}

// Held while checking and storing a value that embeds entities, so two
// concurrent links cannot close a cycle between them.
static LINKS: Mutex<()> = Mutex::new(());

/// Whether `target` is reachable from `value` through arrays and nested
/// entity fields. Records never form cycles, so the walk terminates.
fn reaches(value: &Value, target: &Slots) -> bool {
    match value {
        Value::Array(items) => items.iter().any(|item| reaches(item, target)),
        Value::Entity(e) => {
            Arc::ptr_eq(&e.slots, target)
                || read(&e.slots).iter().flatten().any(|v| reaches(v, target))
        }
        _ => false,
    }
}

fn holds_entities(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.iter().any(holds_entities),
        Value::Entity(_) => true,
        _ => false,
    }
}

fn lookup(schema: &Schema, field: &str) -> Result<usize> {
    schema
        .index_of(field)
        .ok_or_else(|| EntityError::unknown_field(field))
}

/// Read and write capability over one entity's slots.
///
/// Handed to behavior definitions at construction time. There is no public
/// way to obtain one for an existing entity.
#[derive(Clone)]
pub struct Accessor {
    schema: Arc<Schema>,
    slots: Slots,
}

impl Accessor {
    /// Current value of `field`; `None` when undefined.
    pub fn get(&self, field: &str) -> Result<Option<Value>> {
        let idx = lookup(&self.schema, field)?;
        Ok(read(&self.slots)[idx].clone())
    }

    /// Current value of `field` converted to `T`.
    pub fn get_as<T: FromValue>(&self, field: &str) -> Result<Option<T>> {
        self.get(field)?
            .map(|value| convert(field, value))
            .transpose()
    }

    /// Replace the value of `field`.
    pub fn set(&self, field: &str, value: impl Into<Value>) -> Result<()> {
        self.set_opt(field, Some(value.into()))
    }

    /// Replace the value of `field`, or clear it with `None`.
    ///
    /// Required fields cannot be cleared. A value that contains this entity,
    /// directly or through nested entities and arrays, is rejected with
    /// [`EntityError::CyclicReference`].
    pub fn set_opt(&self, field: &str, value: Option<Value>) -> Result<()> {
        let idx = lookup(&self.schema, field)?;
        if value.is_none() && self.schema.get(field).is_some_and(|d| d.is_required()) {
            return Err(EntityError::missing(field));
        }
        let _link = match &value {
            Some(v) if holds_entities(v) => {
                let guard = LINKS.lock().unwrap_or_else(PoisonError::into_inner);
                if reaches(v, &self.slots) {
                    debug!(field, "rejected cyclic entity reference");
                    return Err(EntityError::CyclicReference {
                        field: field.to_string(),
                    });
                }
                Some(guard)
            }
            _ => None,
        };
        trace!(field, defined = value.is_some(), "entity field set");
        write(&self.slots)[idx] = value;
        Ok(())
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("fields", &self.schema.len())
            .finish_non_exhaustive()
    }
}

/// A materialized record conforming to a [`Schema`].
#[derive(Clone)]
pub struct Entity {
    schema: Arc<Schema>,
    slots: Slots,
    behaviors: Arc<Behaviors>,
    config: EntikitConfig,
}

impl Entity {
    /// Assemble an entity from resolved slots, binding behaviors through
    /// `define` once the record is complete.
    pub(crate) fn assemble(
        schema: Arc<Schema>,
        values: Vec<Option<Value>>,
        config: EntikitConfig,
        define: Option<&(dyn Fn(&Accessor) -> Behaviors + Send + Sync)>,
    ) -> Self {
        debug_assert_eq!(values.len(), schema.len());
        let slots: Slots = Arc::new(RwLock::new(values));
        let behaviors = match define {
            Some(define) => define(&Accessor {
                schema: schema.clone(),
                slots: slots.clone(),
            }),
            None => Behaviors::new(),
        };
        Self {
            schema,
            slots,
            behaviors: Arc::new(behaviors),
            config,
        }
    }

    /// Current value of `field`; `None` when undefined.
    ///
    /// The returned value is a copy: mutating it never changes the entity.
    /// Nested entities come back as handles to the same record.
    pub fn get(&self, field: &str) -> Result<Option<Value>> {
        let idx = lookup(&self.schema, field)?;
        Ok(read(&self.slots)[idx].clone())
    }

    /// Current value of `field` converted to `T`.
    pub fn get_as<T: FromValue>(&self, field: &str) -> Result<Option<T>> {
        self.get(field)?
            .map(|value| convert(field, value))
            .transpose()
    }

    /// Invoke a behavior method by name.
    pub fn call(&self, method: &str, args: &[Value]) -> Result<Option<Value>> {
        let Some(f) = self.behaviors.get(method) else {
            debug!(method, "no such behavior method");
            return Err(EntityError::UnknownMethod {
                method: method.to_string(),
            });
        };
        trace!(method, args = args.len(), "calling behavior method");
        f(args).map_err(EntityError::from)
    }

    pub fn has_method(&self, method: &str) -> bool {
        self.behaviors.contains(method)
    }

    /// Attached behavior method names, in definition order.
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.behaviors.names()
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Whether two handles refer to the same record.
    pub fn same_instance(&self, other: &Entity) -> bool {
        Arc::ptr_eq(&self.slots, &other.slots)
    }

    /// Copy of every slot in schema order, undefined entries included.
    pub fn snapshot(&self) -> IndexMap<String, Option<Value>> {
        let slots = read(&self.slots);
        slots
            .iter()
            .enumerate()
            .map(|(idx, value)| (self.schema.name_at(idx).to_string(), value.clone()))
            .collect()
    }

    /// JSON object with one key per field in schema order.
    ///
    /// Undefined fields are omitted, or written as `null` when
    /// `undefined_as_null` is configured. The result is detached from the
    /// entity.
    pub fn to_json(&self) -> serde_json::Value {
        let slots = read(&self.slots);
        let mut map = serde_json::Map::with_capacity(slots.len());
        for (idx, value) in slots.iter().enumerate() {
            let name = self.schema.name_at(idx);
            match value {
                Some(v) => {
                    map.insert(name.to_string(), v.to_json());
                }
                None if self.config.undefined_as_null => {
                    map.insert(name.to_string(), serde_json::Value::Null);
                }
                None => {}
            }
        }
        serde_json::Value::Object(map)
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let slots = read(&self.slots);
        let mut map = serializer.serialize_map(None)?;
        for (idx, value) in slots.iter().enumerate() {
            let name = self.schema.name_at(idx);
            match value {
                Some(v) => map.serialize_entry(name, v)?,
                None if self.config.undefined_as_null => {
                    map.serialize_entry(name, &Option::<Value>::None)?
                }
                None => {}
            }
        }
        map.end()
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("values", &self.snapshot())
            .field("methods", &*self.behaviors)
            .finish()
    }
}
