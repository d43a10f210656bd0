//! Entities and the serializable contract.
//!
//! An [`Entity`] holds the private state of one instance of a described type.
//! Every read and write goes through [`Entity::get`] and [`Entity::set`],
//! which enforce the descriptor's attribute list and schema.
//!
//! Concrete types adopt the contract by wrapping an `Entity` and implementing
//! [`Serializable`]; they get `get`/`set`/`serialize`/`deserialize` for free
//! and may override `serialize` or `to_hash`.
//!
//! Entities carry no internal locking. `deserialize` takes `&mut self`, so a
//! concurrent mutation of the same entity cannot compile; callers that share
//! entities across threads must provide their own exclusion.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::{DeserializeMode, DeserializeOptions, SerializeOptions};
use crate::descriptor::EntityDescriptor;
use crate::document::{Document, DocumentData};
use crate::error::{Result, SerializableError};
use crate::path::{qualify, Qualified, QualifiedName};
use crate::registry::TypeRegistry;
use crate::value::Value;

/// Constructor arguments: attribute name and value pairs.
pub type Fields = Vec<(String, Value)>;

/// One instance of a described entity type.
///
/// # Examples
///
/// ```
/// use serializable::{Entity, EntityDescriptor, FieldType, Serializable, SerializeOptions, Value};
///
/// let user = EntityDescriptor::builder("pkg.User")
///     .attribute("name")
///     .typed("age", FieldType::Int)
///     .build()
///     .unwrap();
///
/// let ann = Entity::with_fields(user, [("name", Value::from("Ann")), ("age", Value::Int(30))]).unwrap();
/// let doc = ann.serialize(&SerializeOptions::default()).unwrap();
///
/// assert_eq!(doc.object_type(), "pkg.User");
/// assert_eq!(doc.field("age"), Some(&serde_json::json!(30)));
/// ```
#[derive(Debug, Clone)]
pub struct Entity {
    descriptor: Arc<EntityDescriptor>,
    state: BTreeMap<String, Value>,
}

impl Entity {
    /// Constructs an instance with no explicit arguments: schema attributes
    /// hold their zero value, then declared defaults are applied.
    ///
    /// # Errors
    ///
    /// As [`Entity::with_fields`].
    pub fn new(descriptor: Arc<EntityDescriptor>) -> Result<Self> {
        Self::with_fields(descriptor, Fields::new())
    }

    /// Constructs an instance.
    ///
    /// Schema attributes start at their field type's zero value and untyped
    /// attributes at `Null`; declared defaults are applied next, then
    /// `fields`. Defaults and fields go through the same validation as
    /// [`Entity::set`].
    ///
    /// # Errors
    ///
    /// [`SerializableError::UnknownAttribute`] for an undeclared field name,
    /// [`SerializableError::SchemaTypeMismatch`] for a value of the wrong type.
    pub fn with_fields<I, K, V>(descriptor: Arc<EntityDescriptor>, fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut state = BTreeMap::new();
        for attribute in descriptor.attributes() {
            let initial = match attribute.field_type() {
                Some(field_type) => field_type.zero_value()?,
                None => Value::Null,
            };
            state.insert(attribute.name().to_string(), initial);
        }

        let mut entity = Self {
            descriptor: Arc::clone(&descriptor),
            state,
        };
        for attribute in descriptor.attributes() {
            if let Some(default) = attribute.default_value() {
                entity.set(attribute.name(), default.clone())?;
            }
        }
        for (name, value) in fields {
            entity.set(name.as_ref(), value)?;
        }
        Ok(entity)
    }

    /// The descriptor this entity was built from.
    #[must_use]
    pub const fn descriptor(&self) -> &Arc<EntityDescriptor> {
        &self.descriptor
    }

    /// Returns the current value of `name`.
    ///
    /// # Errors
    ///
    /// [`SerializableError::UnknownAttribute`] if `name` is not declared.
    pub fn get(&self, name: &str) -> Result<&Value> {
        self.state.get(name).ok_or_else(|| self.unknown(name))
    }

    /// Validates and stores `value` under `name`, returning the entity for
    /// chaining.
    ///
    /// # Errors
    ///
    /// [`SerializableError::UnknownAttribute`] if `name` is not declared,
    /// [`SerializableError::SchemaTypeMismatch`] if `value` does not match
    /// the schema type of `name`.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self> {
        let value = value.into();
        self.descriptor.check(name, &value)?;
        self.state.insert(name.to_string(), value);
        Ok(self)
    }

    /// Attribute values in declaration order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.descriptor
            .attribute_names()
            .filter_map(|name| self.state.get(name).map(|value| (name, value)))
    }

    fn unknown(&self, name: &str) -> SerializableError {
        SerializableError::unknown_attribute(self.descriptor.qualified_name().to_string(), name)
    }

    fn to_document(&self, options: &SerializeOptions) -> Result<Document> {
        let object_type = qualify(self);
        let mut data = DocumentData::new();
        for name in self.descriptor.attribute_names() {
            let json = match self.get(name)? {
                Value::Entity(nested) => nested.serialize(options)?.into_value(),
                other => other.to_json().ok_or_else(|| SerializableError::SchemaTypeMismatch {
                    attribute: name.to_string(),
                    expected: "JSON value".to_string(),
                    actual: other.to_string(),
                })?,
            };
            data.insert(name.to_string(), json);
        }
        tracing::trace!(object_type = %object_type, fields = data.len(), "serialized entity");
        let document = Document::new(object_type.to_string(), data);
        match self.descriptor.serialize_hook() {
            Some(hook) => hook(self, document, options),
            None => Ok(document),
        }
    }

    fn load_document(
        &mut self,
        document: &Document,
        registry: &TypeRegistry,
        options: &DeserializeOptions,
    ) -> Result<()> {
        let expected = qualify(&*self).to_string();
        if document.object_type() != expected {
            return Err(SerializableError::ObjectTypeMismatch {
                expected,
                actual: document.object_type().to_string(),
            });
        }
        tracing::debug!(
            object_type = %expected,
            fields = document.data().len(),
            mode = ?options.mode,
            "deserializing document"
        );

        match options.mode {
            DeserializeMode::Atomic => {
                let mut staged = self.state.clone();
                for (name, json) in document.data() {
                    let value = reconstruct(json, registry)?;
                    self.descriptor.check(name, &value)?;
                    staged.insert(name.clone(), value);
                }
                self.state = staged;
            }
            DeserializeMode::Eager => {
                for (name, json) in document.data() {
                    let value = reconstruct(json, registry)?;
                    self.set(name, value)?;
                }
            }
        }
        Ok(())
    }
}

/// Converts one document field to a value, building nested entities from
/// embedded documents through the registry.
fn reconstruct(json: &serde_json::Value, registry: &TypeRegistry) -> Result<Value> {
    if !Document::looks_like_document(json) {
        return Ok(Value::from_json(json));
    }
    let nested = Document::from_value(json.clone())?;
    let fields = nested
        .data()
        .iter()
        .map(|(name, value)| Ok((name.clone(), reconstruct(value, registry)?)))
        .collect::<Result<Fields>>()?;
    let entity = registry.construct(nested.object_type(), fields)?;
    Ok(Value::from(entity))
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor.qualified_name() == other.descriptor.qualified_name()
            && self.state == other.state
    }
}

impl Qualified for Entity {
    fn qualified_name(&self) -> &QualifiedName {
        self.descriptor.qualified_name()
    }
}

/// The serializable contract.
///
/// Implementors expose their underlying [`Entity`]; every other operation has
/// a provided implementation. `to_hash` has no meaningful default and fails
/// with [`SerializableError::NotImplemented`] unless overridden.
pub trait Serializable {
    /// The underlying entity state.
    fn entity(&self) -> &Entity;

    /// Mutable access to the underlying entity state.
    fn entity_mut(&mut self) -> &mut Entity;

    /// Reads an attribute. See [`Entity::get`].
    fn get(&self, name: &str) -> Result<&Value> {
        self.entity().get(name)
    }

    /// Writes an attribute and returns `self` for chaining. See [`Entity::set`].
    fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self>
    where
        Self: Sized,
    {
        self.entity_mut().set(name, value)?;
        Ok(self)
    }

    /// Builds a new document from the declared attributes, in declaration
    /// order. Nested entities are serialized recursively with the same
    /// options, each through its own descriptor's serialize hook.
    ///
    /// # Errors
    ///
    /// Whatever a serialize hook returns.
    fn serialize(&self, options: &SerializeOptions) -> Result<Document> {
        self.entity().to_document(options)
    }

    /// Repopulates this entity from `document` with default options
    /// (atomic).
    fn deserialize(&mut self, document: &Document, registry: &TypeRegistry) -> Result<()> {
        self.deserialize_with(document, registry, &DeserializeOptions::default())
    }

    /// Repopulates this entity from `document`.
    ///
    /// The document's `object_type` must name this entity's own type; this
    /// is checked before any field is touched. Fields holding embedded
    /// documents are resolved through `registry` and constructed from their
    /// `data`; other fields are assigned as plain values.
    ///
    /// # Errors
    ///
    /// [`SerializableError::ObjectTypeMismatch`] for a foreign document,
    /// resolution errors for nested types, and the usual assignment errors.
    fn deserialize_with(
        &mut self,
        document: &Document,
        registry: &TypeRegistry,
        options: &DeserializeOptions,
    ) -> Result<()> {
        self.entity_mut().load_document(document, registry, options)
    }

    /// Validates the shape of an untyped JSON document, then deserializes it.
    ///
    /// # Errors
    ///
    /// [`SerializableError::InvalidDocumentShape`] before any state is
    /// touched, otherwise as [`Serializable::deserialize`].
    fn deserialize_value(&mut self, json: &serde_json::Value, registry: &TypeRegistry) -> Result<()> {
        let document = Document::from_value(json.clone())?;
        self.deserialize(&document, registry)
    }

    /// Content hash of the entity's state.
    ///
    /// # Errors
    ///
    /// [`SerializableError::NotImplemented`] unless the implementor overrides
    /// it, usually with [`crate::hash::content_hash`].
    fn to_hash(&self, options: &SerializeOptions) -> Result<String> {
        let _ = options;
        Err(SerializableError::NotImplemented { operation: "to_hash" })
    }
}

impl Serializable for Entity {
    fn entity(&self) -> &Entity {
        self
    }

    fn entity_mut(&mut self) -> &mut Entity {
        self
    }
}
