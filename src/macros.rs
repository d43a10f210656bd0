//! Typed accessor generation.

/// Generates one typed getter and setter per listed attribute on a type that
/// implements [`Serializable`](crate::Serializable).
///
/// Each pair delegates to the runtime `get`/`set`, so membership and schema
/// checks are the same as for name-based access. Getters return
/// [`SerializableError::SchemaTypeMismatch`](crate::SerializableError) when
/// the stored value is not of the requested Rust type (for example an
/// untyped attribute still holding `Null`).
///
/// ```
/// use serializable::{entity_accessors, Entity, EntityDescriptor, FieldType, Serializable};
///
/// struct User(Entity);
///
/// impl Serializable for User {
///     fn entity(&self) -> &Entity { &self.0 }
///     fn entity_mut(&mut self) -> &mut Entity { &mut self.0 }
/// }
///
/// entity_accessors!(User {
///     name / set_name: String,
///     age / set_age: i64,
/// });
///
/// let descriptor = EntityDescriptor::builder("pkg.User")
///     .typed("name", FieldType::String)
///     .typed("age", FieldType::Int)
///     .build()
///     .unwrap();
/// let mut user = User(Entity::new(descriptor).unwrap());
/// user.set_name("Ann".to_string()).unwrap().set_age(30).unwrap();
/// assert_eq!(user.age().unwrap(), 30);
/// ```
#[macro_export]
macro_rules! entity_accessors {
    ($ty:ty { $($field:ident / $setter:ident : $fty:ty),* $(,)? }) => {
        impl $ty {
            $(
                #[doc = concat!("Reads `", stringify!($field), "` as `", stringify!($fty), "`.")]
                #[allow(dead_code)]
                pub fn $field(&self) -> $crate::Result<$fty> {
                    let value = $crate::Serializable::get(self, stringify!($field))?;
                    <$fty as $crate::FieldValue>::from_value(value).ok_or_else(|| {
                        $crate::SerializableError::SchemaTypeMismatch {
                            attribute: stringify!($field).to_string(),
                            expected: <$fty as $crate::FieldValue>::TYPE_NAME.to_string(),
                            actual: value.type_name().to_string(),
                        }
                    })
                }

                #[doc = concat!("Assigns `", stringify!($field), "`.")]
                #[allow(dead_code)]
                pub fn $setter(&mut self, value: $fty) -> $crate::Result<&mut Self> {
                    $crate::Serializable::set(
                        self,
                        stringify!($field),
                        <$fty as $crate::FieldValue>::into_value(value),
                    )
                }
            )*
        }
    };
}
