//! Schema — the ordered set of field descriptors defining an entity type.
//!
//! Fields keep their declaration order, which is also the order of
//! serialized output. A name index gives constant-time lookup from field name
//! to slot position. Once built, a schema is immutable and is shared between
//! every entity created from it.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::error::{EntityError, Result};
use crate::field::{FieldDescriptor, FieldKind};

/// Builder for [`Schema`]. Created by [`Schema::builder()`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<(String, FieldDescriptor)>,
}

impl SchemaBuilder {
    /// Append a field. Accepts a typed [`Field`](crate::field::Field) or a
    /// bare [`FieldDescriptor`].
    pub fn field(mut self, name: impl Into<String>, field: impl Into<FieldDescriptor>) -> Self {
        self.fields.push((name.into(), field.into()));
        self
    }

    /// Build the schema, rejecting duplicate field names.
    pub fn build(self) -> Result<Schema> {
        let mut name_index = HashMap::with_capacity(self.fields.len());
        let mut names = Vec::with_capacity(self.fields.len());
        let mut descriptors = Vec::with_capacity(self.fields.len());

        for (idx, (name, descriptor)) in self.fields.into_iter().enumerate() {
            if name_index.insert(name.clone(), idx).is_some() {
                return Err(EntityError::DuplicateField { field: name });
            }
            names.push(name);
            descriptors.push(descriptor);
        }

        debug!(fields = names.len(), "schema built");

        Ok(Schema {
            names,
            descriptors,
            name_index,
        })
    }
}

/// An immutable, ordered mapping of field name to descriptor.
#[derive(Debug, Clone)]
pub struct Schema {
    names: Vec<String>,
    descriptors: Vec<FieldDescriptor>,
    name_index: HashMap<String, usize>,
}

impl Schema {
    /// Start declaring a schema.
    ///
    /// ```rust
    /// use entikit::fields::{boolean, number, string};
    /// use entikit::Schema;
    ///
    /// let schema = Schema::builder()
    ///     .field("id", number())
    ///     .field("name", string())
    ///     .field("isActive", boolean().default(false))
    ///     .build()?;
    /// assert_eq!(schema.len(), 3);
    /// # Ok::<(), entikit::EntityError>(())
    /// ```
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Slot position of a field.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_index.get(name).copied()
    }

    /// Descriptor for a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index_of(name).map(|i| &self.descriptors[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name_index.contains_key(name)
    }

    /// Field names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// `(name, descriptor)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldDescriptor)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.descriptors.iter())
    }

    pub(crate) fn name_at(&self, idx: usize) -> &str {
        &self.names[idx]
    }

    /// Names of fields that must appear in every input.
    pub fn required_inputs(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, d)| d.is_required() && !d.has_default())
            .map(|(name, _)| name)
            .collect()
    }

    /// Serializable overview of the schema, for logs and diagnostics.
    pub fn describe(&self) -> Vec<FieldSummary> {
        self.iter()
            .map(|(name, d)| FieldSummary {
                name: name.to_string(),
                kind: d.kind().clone(),
                required: d.is_required(),
                has_default: d.has_default(),
            })
            .collect()
    }
}

/// One row of [`Schema::describe`].
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldSummary {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub required: bool,
    pub has_default: bool,
}
