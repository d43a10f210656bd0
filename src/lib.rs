//! # serializable
//!
//! Self-describing serialization for entities with a declared attribute
//! contract.
//!
//! ## Core Concepts
//!
//! - **EntityDescriptor**: the attributes a type declares, their optional
//!   schema types and default values
//! - **Entity**: one instance; all reads and writes are checked against the
//!   descriptor
//! - **Document**: the serialized form, `{ "object_type", "data" }`, with
//!   nested entities embedded as nested documents
//! - **TypeRegistry**: resolves a document's qualified type name to a
//!   factory when rebuilding nested entities
//!
//! ## Usage
//!
//! ```rust
//! use serializable::{
//!     Entity, EntityDescriptor, FieldType, Serializable, SerializeOptions, TypeRegistry, Value,
//! };
//!
//! let user = EntityDescriptor::builder("pkg.User")
//!     .attribute("name")
//!     .typed("age", FieldType::Int)
//!     .build()?;
//! let team = EntityDescriptor::builder("pkg.Team")
//!     .nested("lead", &user)
//!     .build()?;
//!
//! let mut registry = TypeRegistry::new();
//! registry.register(&team);
//!
//! let bo = Entity::with_fields(user, [("name", Value::from("Bo")), ("age", Value::Int(22))])?;
//! let original = Entity::with_fields(team.clone(), [("lead", bo)])?;
//!
//! let document = original.serialize(&SerializeOptions::default())?;
//! let mut restored = Entity::new(team)?;
//! restored.deserialize(&document, &registry)?;
//! assert_eq!(restored, original);
//! # Ok::<(), serializable::SerializableError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod descriptor;
pub mod document;
pub mod entity;
pub mod error;
pub mod hash;
pub mod path;
pub mod registry;
pub mod value;

mod macros;

// Re-export primary types at crate root for convenience
pub use config::{DeserializeMode, DeserializeOptions, SerializeOptions};
pub use descriptor::{AttributeDef, EntityDescriptor, EntityDescriptorBuilder, FieldType, SerializeHook};
pub use document::{Document, DocumentData, DATA_KEY, OBJECT_TYPE_KEY};
pub use entity::{Entity, Fields, Serializable};
pub use error::{Result, SerializableError};
pub use hash::content_hash;
pub use path::{qualify, Qualified, QualifiedName};
pub use registry::{Factory, Registration, TypeRegistry};
pub use value::{FieldValue, Value};
