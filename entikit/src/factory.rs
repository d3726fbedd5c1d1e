//! EntityFactory — turns a schema plus partial input into entities.
//!
//! For every schema field, in declaration order, `create` picks the supplied
//! value, else the descriptor's default, else leaves the field undefined. A
//! required field with no default and no supplied value fails construction.
//! Behaviors are bound only after every field is resolved.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::behavior::Behaviors;
use crate::config::EntikitConfig;
use crate::entity::{Accessor, Entity};
use crate::error::{EntityError, Result};
use crate::input::Input;
use crate::schema::Schema;
use crate::value::Value;

/// Behavior definition invoked once per created entity.
pub type DefineFn = Arc<dyn Fn(&Accessor) -> Behaviors + Send + Sync>;

/// Field summaries of `schema` as YAML, for debug output.
fn schema_yaml(schema: &Schema) -> String {
    serde_yaml_ng::to_string(&schema.describe())
        .unwrap_or_else(|err| format!("<schema summary unavailable: {err}>"))
}

/// Creates entities from one schema.
///
/// ```rust
/// use entikit::fields::{boolean, number, string};
/// use entikit::{input, Behaviors, EntityFactory, Schema};
///
/// let schema = Schema::builder()
///     .field("id", number())
///     .field("name", string())
///     .field("isActive", boolean().default(false))
///     .build()?;
///
/// let accounts = EntityFactory::with_behaviors(schema, |acc| {
///     let acc = acc.clone();
///     Behaviors::new().method("activate", move |_| {
///         acc.set("isActive", true)?;
///         Ok(None)
///     })
/// });
///
/// let account = accounts.create(input! { "id" => 1, "name" => "ada" })?;
/// account.call("activate", &[])?;
/// assert_eq!(account.get_as::<bool>("isActive")?, Some(true));
/// # Ok::<(), entikit::EntityError>(())
/// ```
#[derive(Clone)]
pub struct EntityFactory {
    schema: Arc<Schema>,
    define: Option<DefineFn>,
    config: EntikitConfig,
}

impl EntityFactory {
    /// A factory producing entities with only `get` and serialization.
    pub fn new(schema: impl Into<Arc<Schema>>) -> Self {
        let schema = schema.into();
        debug!(fields = schema.len(), "entity factory created\n{}", schema_yaml(&schema));
        Self {
            schema,
            define: None,
            config: EntikitConfig::default(),
        }
    }

    /// A factory whose entities also carry the methods returned by `define`.
    pub fn with_behaviors<F>(schema: impl Into<Arc<Schema>>, define: F) -> Self
    where
        F: Fn(&Accessor) -> Behaviors + Send + Sync + 'static,
    {
        Self {
            define: Some(Arc::new(define)),
            ..Self::new(schema)
        }
    }

    /// Replace the configuration used for subsequently created entities.
    pub fn with_config(mut self, config: EntikitConfig) -> Self {
        self.config = config;
        self
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn config(&self) -> &EntikitConfig {
        &self.config
    }

    /// Materialize one entity from `input`.
    pub fn create(&self, input: Input) -> Result<Entity> {
        let values = self.resolve(input)?;
        let entity = Entity::assemble(
            self.schema.clone(),
            values,
            self.config.clone(),
            self.define.as_deref(),
        );
        trace!(methods = entity.methods().count(), "entity created");
        Ok(entity)
    }

    /// Resolve every field's effective value in schema order.
    fn resolve(&self, mut input: Input) -> Result<Vec<Option<Value>>> {
        for key in input.keys().filter(|k| !self.schema.contains(k)) {
            if self.config.reject_unknown_input {
                return Err(EntityError::unknown_field(key));
            }
            debug!(field = key, "ignoring input for field outside schema");
        }

        let mut values = Vec::with_capacity(self.schema.len());
        for (name, descriptor) in self.schema.iter() {
            let value = match input.take(name) {
                Some(v) => Some(v),
                None if descriptor.has_default() => descriptor.resolve_default(),
                None if descriptor.is_required() => {
                    debug!(field = name, "required field missing from input");
                    return Err(EntityError::missing(name));
                }
                None => None,
            };
            values.push(value);
        }
        Ok(values)
    }
}

impl fmt::Debug for EntityFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityFactory")
            .field("schema", &self.schema)
            .field("behaviors", &self.define.is_some())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::StringKind;
    use crate::fields::{array, boolean, date, number, string};
    use crate::input;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};

    fn account_schema() -> Schema {
        Schema::builder()
            .field("id", number())
            .field("name", string())
            .field("isActive", boolean())
            .field("email", string().not_required())
            .field("level", number().default(1))
            .field("tags", array::<StringKind>().default_empty())
            .field(
                "createdAt",
                date().default_fn(|| Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn schema_yaml_lists_fields_in_order() {
        let yaml = schema_yaml(&account_schema());
        assert!(yaml.contains("name: id"));
        assert!(yaml.contains("kind: number"));
        assert!(yaml.contains("required: false"));
        let id = yaml.find("name: id").unwrap();
        let created = yaml.find("name: createdAt").unwrap();
        assert!(id < created);
    }

    #[test]
    fn supplied_values_win() {
        let factory = EntityFactory::new(account_schema());
        let entity = factory
            .create(input! {
                "id" => 1,
                "name" => "testName",
                "isActive" => true,
                "email" => "test@test.example",
                "level" => 2,
            })
            .unwrap();

        assert_eq!(entity.get_as::<i64>("id").unwrap(), Some(1));
        assert_eq!(entity.get_as::<i64>("level").unwrap(), Some(2));
        assert_eq!(
            entity.get_as::<String>("email").unwrap().as_deref(),
            Some("test@test.example")
        );
    }

    #[test]
    fn defaults_fill_absent_fields() {
        let factory = EntityFactory::new(account_schema());
        let entity = factory
            .create(input! { "id" => 1, "name" => "testName", "isActive" => true })
            .unwrap();

        assert_eq!(entity.get("email").unwrap(), None);
        assert_eq!(entity.get_as::<i64>("level").unwrap(), Some(1));
        assert_eq!(entity.get_as::<Vec<String>>("tags").unwrap(), Some(vec![]));
        assert_eq!(
            entity.get_as::<chrono::DateTime<Utc>>("createdAt").unwrap(),
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn missing_required_field_fails() {
        let factory = EntityFactory::new(account_schema());
        let err = factory
            .create(input! { "id" => 1, "isActive" => true })
            .unwrap_err();
        assert!(matches!(err, EntityError::MissingRequiredField { ref field } if field == "name"));
    }

    #[test]
    fn first_missing_field_in_schema_order_is_reported() {
        let factory = EntityFactory::new(account_schema());
        let err = factory.create(Input::new()).unwrap_err();
        assert_eq!(err.to_string(), "missing required field: id");
    }

    #[test]
    fn explicit_undefined_uses_default() {
        let factory = EntityFactory::new(account_schema());
        let entity = factory
            .create(
                input! { "id" => 1, "name" => "n", "isActive" => false }
                    .set_opt::<i64>("level", None),
            )
            .unwrap();
        assert_eq!(entity.get_as::<i64>("level").unwrap(), Some(1));
    }

    #[test]
    fn explicit_undefined_on_required_field_fails() {
        let factory = EntityFactory::new(account_schema());
        let err = factory
            .create(input! { "id" => 1, "isActive" => false }.set_opt::<&str>("name", None))
            .unwrap_err();
        assert!(matches!(err, EntityError::MissingRequiredField { .. }));
    }

    #[test]
    fn unknown_input_is_ignored_by_default() {
        let factory = EntityFactory::new(account_schema());
        let entity = factory
            .create(input! { "id" => 1, "name" => "n", "isActive" => true, "nickname" => "x" })
            .unwrap();
        assert!(!entity.snapshot().contains_key("nickname"));
    }

    #[test]
    fn unknown_input_rejected_when_configured() {
        let factory = EntityFactory::new(account_schema()).with_config(EntikitConfig {
            reject_unknown_input: true,
            ..Default::default()
        });
        let err = factory
            .create(input! { "id" => 1, "name" => "n", "isActive" => true, "nickname" => "x" })
            .unwrap_err();
        assert!(matches!(err, EntityError::UnknownField { ref field } if field == "nickname"));
    }

    #[test]
    fn computed_default_runs_per_create() {
        let seq = Arc::new(AtomicU64::new(0));
        let next = seq.clone();
        let factory = EntityFactory::new(
            Schema::builder()
                .field("id", number().default_fn(move || next.fetch_add(1, Ordering::SeqCst)))
                .build()
                .unwrap(),
        );

        let first = factory.create(Input::new()).unwrap();
        let second = factory.create(Input::new()).unwrap();
        assert_eq!(first.get_as::<u64>("id").unwrap(), Some(0));
        assert_eq!(second.get_as::<u64>("id").unwrap(), Some(1));
    }

    #[test]
    fn computed_default_skipped_when_value_supplied() {
        let seq = Arc::new(AtomicU64::new(0));
        let next = seq.clone();
        let factory = EntityFactory::new(
            Schema::builder()
                .field("id", number().default_fn(move || next.fetch_add(1, Ordering::SeqCst)))
                .build()
                .unwrap(),
        );

        factory.create(input! { "id" => 42 }).unwrap();
        assert_eq!(seq.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn define_runs_once_per_entity() {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();
        let factory = EntityFactory::with_behaviors(account_schema(), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Behaviors::new()
        });

        factory
            .create(input! { "id" => 1, "name" => "a", "isActive" => true })
            .unwrap();
        factory
            .create(input! { "id" => 2, "name" => "b", "isActive" => true })
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn define_not_run_when_construction_fails() {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();
        let factory = EntityFactory::with_behaviors(account_schema(), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Behaviors::new()
        });

        assert!(factory.create(Input::new()).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn define_sees_resolved_values() {
        let factory = EntityFactory::with_behaviors(account_schema(), |acc| {
            let level = acc.get_as::<i64>("level").ok().flatten().unwrap_or(-1);
            Behaviors::new().method("initialLevel", move |_| Ok(Some(Value::from(level))))
        });
        let entity = factory
            .create(input! { "id" => 1, "name" => "a", "isActive" => true })
            .unwrap();
        assert_eq!(entity.call("initialLevel", &[]).unwrap(), Some(Value::from(1)));
    }

    #[test]
    fn factory_shares_schema_with_entities() {
        let factory = EntityFactory::new(account_schema());
        let entity = factory
            .create(input! { "id" => 1, "name" => "a", "isActive" => true })
            .unwrap();
        assert!(Arc::ptr_eq(factory.schema(), entity.schema()));
    }
}
