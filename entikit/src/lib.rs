//! Declarative entities from field descriptors
//!
//! `entikit` builds typed records from a schema of named field descriptors.
//! Each descriptor says whether its field must be supplied and how it is
//! filled when it is not: a static default cloned per instance, or a function
//! called per instance. Entities expose read access and JSON serialization;
//! mutation happens only inside behavior methods attached by the factory.
//!
//! # Architecture
//!
//! - **Descriptors**: [`fields`] constructors return typed [`Field`] builders
//! - **Schema**: ordered, immutable, shared by every entity built from it
//! - **Factory**: [`EntityFactory::create`] resolves each field in schema order
//! - **Encapsulation**: [`Entity`] is read-only; [`Accessor`] writes, and only
//!   behavior definitions receive one
//!
//! ```rust
//! use entikit::field::StringKind;
//! use entikit::fields::{array, boolean, number, string};
//! use entikit::{input, Behaviors, EntityFactory, Schema};
//!
//! let schema = Schema::builder()
//!     .field("id", number())
//!     .field("name", string())
//!     .field("isActive", boolean())
//!     .field("email", string().not_required())
//!     .field("level", number().default(1))
//!     .field("tags", array::<StringKind>().default_empty())
//!     .build()?;
//!
//! let accounts = EntityFactory::with_behaviors(schema, |acc| {
//!     let acc = acc.clone();
//!     Behaviors::new().method("disable", move |_| {
//!         acc.set("isActive", false)?;
//!         Ok(None)
//!     })
//! });
//!
//! let account = accounts.create(input! {
//!     "id" => 1,
//!     "name" => "testName",
//!     "isActive" => true,
//! })?;
//! account.call("disable", &[])?;
//!
//! assert_eq!(
//!     serde_json::to_string(&account).unwrap(),
//!     r#"{"id":1,"name":"testName","isActive":false,"level":1,"tags":[]}"#
//! );
//! # Ok::<(), entikit::EntityError>(())
//! ```

pub mod behavior;
pub mod config;
pub mod entity;
pub mod error;
pub mod factory;
pub mod field;
pub mod fields;
pub mod input;
pub mod schema;
pub mod value;

pub use behavior::{Behaviors, Method};
pub use config::EntikitConfig;
pub use entity::{Accessor, Entity};
pub use error::{EntityError, Result};
pub use factory::{DefineFn, EntityFactory};
pub use field::{DefaultPolicy, Field, FieldDescriptor, FieldKind};
pub use input::Input;
pub use schema::{FieldSummary, Schema, SchemaBuilder};
pub use value::{FromValue, Value};
