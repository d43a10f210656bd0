//! Entity descriptors: the attribute contract of one entity type.
//!
//! A descriptor lists the attributes an entity declares (in order), the
//! optional schema type of each attribute, and optional default values. It is
//! built once and shared by every instance of the type.

use std::fmt;
use std::sync::Arc;

use crate::config::SerializeOptions;
use crate::document::Document;
use crate::entity::Entity;
use crate::error::{Result, SerializableError};
use crate::path::{Qualified, QualifiedName};
use crate::value::Value;

/// Declared type of a schema-constrained attribute.
#[derive(Debug, Clone)]
pub enum FieldType {
    /// `true` or `false`.
    Bool,
    /// A signed 64-bit integer.
    Int,
    /// A finite 64-bit float.
    Float,
    /// A UTF-8 string.
    String,
    /// A nested entity of the described type.
    Entity(Arc<EntityDescriptor>),
}

impl FieldType {
    /// Returns true if `value` is an instance of this type.
    ///
    /// `Null` is never an instance. A nested entity matches when its
    /// qualified name equals the declared descriptor's.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Bool, Value::Bool(_))
            | (Self::Int, Value::Int(_))
            | (Self::Float, Value::Float(_))
            | (Self::String, Value::String(_)) => true,
            (Self::Entity(descriptor), Value::Entity(entity)) => {
                entity.descriptor().qualified_name() == descriptor.qualified_name()
            }
            _ => false,
        }
    }

    /// The value a schema attribute holds before defaults and arguments are
    /// applied: `false`, `0`, `0.0`, `""`, or an argument-less nested entity.
    ///
    /// # Errors
    ///
    /// Propagates construction errors of a nested entity.
    pub fn zero_value(&self) -> Result<Value> {
        Ok(match self {
            Self::Bool => Value::Bool(false),
            Self::Int => Value::Int(0),
            Self::Float => Value::Float(0.0),
            Self::String => Value::String(String::new()),
            Self::Entity(descriptor) => Value::from(Entity::new(Arc::clone(descriptor))?),
        })
    }

    /// Returns true for nested entity types.
    #[must_use]
    pub const fn is_entity(&self) -> bool {
        matches!(self, Self::Entity(_))
    }
}

impl PartialEq for FieldType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Entity(a), Self::Entity(b)) => a.qualified_name() == b.qualified_name(),
            (Self::Bool, Self::Bool)
            | (Self::Int, Self::Int)
            | (Self::Float, Self::Float)
            | (Self::String, Self::String) => true,
            _ => false,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::String => write!(f, "string"),
            Self::Entity(descriptor) => write!(f, "{}", descriptor.qualified_name()),
        }
    }
}

/// One declared attribute.
#[derive(Debug, Clone)]
pub struct AttributeDef {
    name: String,
    field_type: Option<FieldType>,
    default: Option<Value>,
}

impl AttributeDef {
    /// Attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schema type, if the attribute is schema-constrained.
    #[must_use]
    pub const fn field_type(&self) -> Option<&FieldType> {
        self.field_type.as_ref()
    }

    /// Declared default, applied at construction.
    #[must_use]
    pub const fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

/// Rewrites the document built for an entity before `serialize` returns it.
///
/// Runs for every entity of the type, at the top level and when nested, with
/// the caller's options.
pub type SerializeHook =
    Arc<dyn Fn(&Entity, Document, &SerializeOptions) -> Result<Document> + Send + Sync>;

/// The attribute contract of an entity type.
pub struct EntityDescriptor {
    qualified_name: QualifiedName,
    attributes: Vec<AttributeDef>,
    on_serialize: Option<SerializeHook>,
}

impl EntityDescriptor {
    /// Starts a descriptor for the type with the given dotted path.
    #[must_use]
    pub fn builder(qualified_name: impl Into<String>) -> EntityDescriptorBuilder {
        EntityDescriptorBuilder {
            qualified_name: qualified_name.into(),
            attributes: Vec::new(),
            on_serialize: None,
        }
    }

    /// Declared attribute names, in declaration order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.name.as_str())
    }

    /// Declared attributes, in declaration order.
    #[must_use]
    pub fn attributes(&self) -> &[AttributeDef] {
        &self.attributes
    }

    /// Looks up one declared attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Returns true if `name` is declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Schema type of `name`, if declared.
    #[must_use]
    pub fn field_type(&self, name: &str) -> Option<&FieldType> {
        self.attribute(name).and_then(AttributeDef::field_type)
    }

    /// The serialize hook, if one was declared.
    #[must_use]
    pub fn serialize_hook(&self) -> Option<&SerializeHook> {
        self.on_serialize.as_ref()
    }

    /// Validates an assignment of `value` to `name`.
    ///
    /// # Errors
    ///
    /// [`SerializableError::UnknownAttribute`] if `name` is not declared,
    /// [`SerializableError::SchemaTypeMismatch`] if `value` is a non-finite
    /// float (JSON cannot carry it), or if `name` has a schema type and
    /// `value` is not an instance of it.
    pub fn check(&self, name: &str, value: &Value) -> Result<()> {
        let Some(attribute) = self.attribute(name) else {
            return Err(SerializableError::unknown_attribute(
                self.qualified_name.to_string(),
                name,
            ));
        };
        if let Value::Float(v) = value {
            if !v.is_finite() {
                return Err(SerializableError::SchemaTypeMismatch {
                    attribute: name.to_string(),
                    expected: "finite float".to_string(),
                    actual: v.to_string(),
                });
            }
        }
        if let Some(field_type) = &attribute.field_type {
            if !field_type.accepts(value) {
                return Err(SerializableError::SchemaTypeMismatch {
                    attribute: name.to_string(),
                    expected: field_type.to_string(),
                    actual: actual_type_name(value),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for EntityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDescriptor")
            .field("qualified_name", &self.qualified_name)
            .field("attributes", &self.attributes)
            .field("on_serialize", &self.on_serialize.is_some())
            .finish()
    }
}

impl Qualified for EntityDescriptor {
    fn qualified_name(&self) -> &QualifiedName {
        &self.qualified_name
    }
}

impl Qualified for Arc<EntityDescriptor> {
    fn qualified_name(&self) -> &QualifiedName {
        &self.qualified_name
    }
}

fn actual_type_name(value: &Value) -> String {
    match value {
        Value::Entity(entity) => entity.descriptor().qualified_name().to_string(),
        other => other.type_name().to_string(),
    }
}

/// Builder for [`EntityDescriptor`].
///
/// ```
/// use serializable::{EntityDescriptor, FieldType};
///
/// let user = EntityDescriptor::builder("pkg.User")
///     .attribute("name")
///     .typed("age", FieldType::Int)
///     .default("name", "anonymous")
///     .build()
///     .unwrap();
///
/// assert_eq!(user.attribute_names().collect::<Vec<_>>(), ["name", "age"]);
/// ```
#[must_use]
pub struct EntityDescriptorBuilder {
    qualified_name: String,
    attributes: Vec<AttributeDef>,
    on_serialize: Option<SerializeHook>,
}

impl fmt::Debug for EntityDescriptorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDescriptorBuilder")
            .field("qualified_name", &self.qualified_name)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

impl EntityDescriptorBuilder {
    fn entry(&mut self, name: &str) -> &mut AttributeDef {
        let idx = match self.attributes.iter().position(|a| a.name == name) {
            Some(idx) => idx,
            None => {
                self.attributes.push(AttributeDef {
                    name: name.to_string(),
                    field_type: None,
                    default: None,
                });
                self.attributes.len() - 1
            }
        };
        &mut self.attributes[idx]
    }

    /// Declares an attribute without a schema type.
    pub fn attribute(mut self, name: &str) -> Self {
        self.entry(name);
        self
    }

    /// Declares a schema-constrained attribute. Declaring a name twice keeps
    /// its original position and replaces the type.
    pub fn typed(mut self, name: &str, field_type: FieldType) -> Self {
        self.entry(name).field_type = Some(field_type);
        self
    }

    /// Declares a nested entity attribute.
    pub fn nested(self, name: &str, descriptor: &Arc<EntityDescriptor>) -> Self {
        self.typed(name, FieldType::Entity(Arc::clone(descriptor)))
    }

    /// Sets the default value of an attribute. The attribute is declared if
    /// it was not already.
    pub fn default(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.entry(name).default = Some(value.into());
        self
    }

    /// Installs a hook that rewrites every serialized document of this type.
    ///
    /// The hook receives the entity, the document built from its attributes
    /// and the caller's [`SerializeOptions`]. Nested entities of this type go
    /// through it too, so options reach them at any depth.
    pub fn on_serialize<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Entity, Document, &SerializeOptions) -> Result<Document> + Send + Sync + 'static,
    {
        self.on_serialize = Some(Arc::new(hook));
        self
    }

    /// Finishes the descriptor.
    ///
    /// # Errors
    ///
    /// [`SerializableError::UnresolvableType`] for a malformed qualified name,
    /// [`SerializableError::SchemaTypeMismatch`] for a default value that does
    /// not match its attribute's schema type.
    pub fn build(self) -> Result<Arc<EntityDescriptor>> {
        let descriptor = EntityDescriptor {
            qualified_name: QualifiedName::parse(&self.qualified_name)?,
            attributes: self.attributes,
            on_serialize: self.on_serialize,
        };
        for attribute in &descriptor.attributes {
            if let Some(default) = &attribute.default {
                descriptor.check(&attribute.name, default)?;
            }
        }
        Ok(Arc::new(descriptor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> Arc<EntityDescriptor> {
        EntityDescriptor::builder("pkg.User")
            .attribute("name")
            .typed("age", FieldType::Int)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_keeps_declaration_order() {
        let d = EntityDescriptor::builder("pkg.Order")
            .attribute("id")
            .typed("total", FieldType::Float)
            .attribute("note")
            .typed("id", FieldType::String)
            .build()
            .unwrap();
        assert_eq!(d.attribute_names().collect::<Vec<_>>(), ["id", "total", "note"]);
        assert_eq!(d.field_type("id"), Some(&FieldType::String));
        assert_eq!(d.field_type("note"), None);
    }

    #[test]
    fn test_check_unknown_attribute() {
        let err = user().check("email", &Value::from("a@b.c")).unwrap_err();
        assert!(matches!(err, SerializableError::UnknownAttribute { ref attribute, .. } if attribute == "email"));
    }

    #[test]
    fn test_check_schema_mismatch() {
        let err = user().check("age", &Value::from("thirty")).unwrap_err();
        match err {
            SerializableError::SchemaTypeMismatch { attribute, expected, actual } => {
                assert_eq!(attribute, "age");
                assert_eq!(expected, "int");
                assert_eq!(actual, "string");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_check_rejects_null_for_typed_attribute() {
        assert!(user().check("age", &Value::Null).is_err());
        assert!(user().check("name", &Value::Null).is_ok());
    }

    #[test]
    fn test_untyped_attribute_accepts_anything() {
        let d = user();
        assert!(d.check("name", &Value::Int(1)).is_ok());
        assert!(d.check("name", &Value::Structured(serde_json::json!([1, 2]))).is_ok());
    }

    #[test]
    fn test_nested_type_matches_by_qualified_name() {
        let user = user();
        let team = EntityDescriptor::builder("pkg.Team")
            .nested("lead", &user)
            .build()
            .unwrap();
        let other = EntityDescriptor::builder("pkg.Robot").build().unwrap();

        let lead = Entity::new(Arc::clone(&user)).unwrap();
        assert!(team.check("lead", &Value::from(lead)).is_ok());

        let robot = Entity::new(other).unwrap();
        let err = team.check("lead", &Value::from(robot)).unwrap_err();
        assert!(format!("{err}").contains("pkg.Robot"));
    }

    #[test]
    fn test_check_rejects_non_finite_floats() {
        let d = EntityDescriptor::builder("pkg.Reading")
            .typed("value", FieldType::Float)
            .attribute("raw")
            .build()
            .unwrap();
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = d.check("value", &Value::Float(bad)).unwrap_err();
            assert!(matches!(err, SerializableError::SchemaTypeMismatch { ref expected, .. } if expected == "finite float"));
            assert!(d.check("raw", &Value::Float(bad)).is_err());
        }
        assert!(d.check("value", &Value::Float(1.5)).is_ok());
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(FieldType::Bool.zero_value().unwrap(), Value::Bool(false));
        assert_eq!(FieldType::Int.zero_value().unwrap(), Value::Int(0));
        assert_eq!(FieldType::Float.zero_value().unwrap(), Value::Float(0.0));
        assert_eq!(FieldType::String.zero_value().unwrap(), Value::from(""));

        let nested = FieldType::Entity(user()).zero_value().unwrap();
        let entity = nested.as_entity().unwrap();
        assert_eq!(entity.get("age").unwrap(), &Value::Int(0));
    }

    #[test]
    fn test_build_rejects_bad_default() {
        let err = EntityDescriptor::builder("pkg.User")
            .typed("age", FieldType::Int)
            .default("age", "old")
            .build()
            .unwrap_err();
        assert!(matches!(err, SerializableError::SchemaTypeMismatch { .. }));
    }

    #[test]
    fn test_build_rejects_bad_name() {
        let err = EntityDescriptor::builder("User").build().unwrap_err();
        assert!(matches!(err, SerializableError::UnresolvableType { .. }));
    }
}
