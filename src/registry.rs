//! Type registry: resolves qualified names to entity factories.
//!
//! Nested documents name their type by qualified name. Reconstruction looks
//! that name up here instead of searching any ambient namespace, so only
//! explicitly registered types can be built from a document.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::descriptor::{EntityDescriptor, FieldType};
use crate::entity::{Entity, Fields};
use crate::error::{Result, SerializableError};
use crate::path::{Qualified, QualifiedName};

/// Builds an entity from constructor arguments.
pub type Factory = Arc<dyn Fn(Fields) -> Result<Entity> + Send + Sync>;

/// One resolvable type.
#[derive(Clone)]
pub struct Registration {
    name: QualifiedName,
    factory: Factory,
}

impl Registration {
    /// The registered type name.
    #[must_use]
    pub const fn name(&self) -> &QualifiedName {
        &self.name
    }

    /// Invokes the factory.
    ///
    /// # Errors
    ///
    /// Whatever the factory returns, typically construction errors.
    pub fn construct(&self, fields: Fields) -> Result<Entity> {
        (self.factory)(fields)
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Closed mapping from qualified type name to factory, grouped by namespace.
///
/// ```
/// use serializable::{EntityDescriptor, FieldType, TypeRegistry};
///
/// let user = EntityDescriptor::builder("pkg.User")
///     .attribute("name")
///     .typed("age", FieldType::Int)
///     .build()
///     .unwrap();
///
/// let mut registry = TypeRegistry::new();
/// registry.register(&user);
///
/// assert!(registry.resolve("pkg.User").is_ok());
/// assert!(registry.resolve("pkg.Team").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    namespaces: BTreeMap<String, BTreeMap<String, Registration>>,
}

impl TypeRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor with the default factory (plain construction).
    ///
    /// Descriptors of nested entity attributes are registered as well unless
    /// their name is already taken. Re-registering a name replaces the entry.
    pub fn register(&mut self, descriptor: &Arc<EntityDescriptor>) -> &mut Self {
        self.insert(descriptor_registration(descriptor));
        self.register_nested(descriptor);
        self
    }

    fn register_nested(&mut self, descriptor: &EntityDescriptor) {
        for attribute in descriptor.attributes() {
            if let Some(FieldType::Entity(nested)) = attribute.field_type() {
                if !self.contains(nested.qualified_name()) {
                    self.insert(descriptor_registration(nested));
                    self.register_nested(nested);
                }
            }
        }
    }

    /// Registers a custom factory under `name`.
    pub fn register_factory<F>(&mut self, name: QualifiedName, factory: F) -> &mut Self
    where
        F: Fn(Fields) -> Result<Entity> + Send + Sync + 'static,
    {
        self.insert(Registration {
            name,
            factory: Arc::new(factory),
        });
        self
    }

    fn insert(&mut self, registration: Registration) {
        tracing::debug!(object_type = %registration.name, "registering type");
        self.namespaces
            .entry(registration.name.namespace().to_string())
            .or_default()
            .insert(registration.name.name().to_string(), registration);
    }

    /// Resolves a dotted path to its registration.
    ///
    /// # Errors
    ///
    /// [`SerializableError::UnresolvableType`] if the path is malformed, the
    /// namespace is unknown, or the namespace has no such member.
    pub fn resolve(&self, name: &str) -> Result<&Registration> {
        let qualified = QualifiedName::parse(name)?;
        let Some(members) = self.namespaces.get(qualified.namespace()) else {
            return Err(SerializableError::unresolvable(
                name,
                format!("no namespace '{}'", qualified.namespace()),
            ));
        };
        members.get(qualified.name()).ok_or_else(|| {
            SerializableError::unresolvable(
                name,
                format!(
                    "namespace '{}' has no member '{}'",
                    qualified.namespace(),
                    qualified.name()
                ),
            )
        })
    }

    /// Resolves `name` and constructs an instance from `fields`.
    ///
    /// # Errors
    ///
    /// Resolution errors, then construction errors.
    pub fn construct(&self, name: &str, fields: Fields) -> Result<Entity> {
        let registration = self.resolve(name)?;
        tracing::trace!(object_type = name, fields = fields.len(), "constructing entity");
        registration.construct(fields)
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &QualifiedName) -> bool {
        self.namespaces
            .get(name.namespace())
            .is_some_and(|members| members.contains_key(name.name()))
    }
}

fn descriptor_registration(descriptor: &Arc<EntityDescriptor>) -> Registration {
    let descriptor = Arc::clone(descriptor);
    Registration {
        name: descriptor.qualified_name().clone(),
        factory: Arc::new(move |fields| Entity::with_fields(Arc::clone(&descriptor), fields)),
    }
}
