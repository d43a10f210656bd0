//! Attribute values.
//!
//! Values cover the scalar types a schema can declare, nested entities, and
//! free-form JSON for attributes that carry no schema entry.

use crate::entity::Entity;
use crate::path::Qualified;

/// Possible values an entity attribute can hold.
///
/// # Examples
///
/// ```
/// use serializable::Value;
///
/// let int_val = Value::Int(30);
/// let string_val = Value::from("Ann");
///
/// assert!(int_val.is_int());
/// assert_eq!(string_val.as_string(), Some("Ann"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number. Attributes only ever store finite values.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Arbitrary JSON, only storable in attributes without a schema entry.
    Structured(serde_json::Value),
    /// A nested serializable entity.
    Entity(Box<Entity>),
    /// Absence of a value; the initial state of untyped attributes.
    Null,
}

impl Value {
    /// Returns true if this is a bool value.
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(_))
    }

    /// Returns true if this is an int value.
    #[must_use]
    pub const fn is_int(&self) -> bool {
        matches!(self, Self::Int(_))
    }

    /// Returns true if this is a float value.
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float(_))
    }

    /// Returns true if this is a string value.
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    /// Returns true if this is a structured value.
    #[must_use]
    pub const fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }

    /// Returns true if this is an entity value.
    #[must_use]
    pub const fn is_entity(&self) -> bool {
        matches!(self, Self::Entity(_))
    }

    /// Returns true if this is `Null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the bool payload, if this is a bool value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the int payload, if this is an int value.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the float payload, if this is a float value.
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string payload, if this is a string value.
    #[must_use]
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the structured payload, if this is a structured value.
    #[must_use]
    pub const fn as_structured(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Structured(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the entity payload, if this is an entity value.
    #[must_use]
    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Self::Entity(v) => Some(v),
            _ => None,
        }
    }

    /// Returns a human-readable type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Structured(_) => "structured",
            Self::Entity(_) => "entity",
            Self::Null => "null",
        }
    }

    /// Converts a plain JSON value.
    ///
    /// Integers that fit in `i64` become [`Value::Int`], other numbers become
    /// [`Value::Float`]; arrays and objects are kept as [`Value::Structured`].
    /// Embedded documents are not recognised here, the entity layer handles
    /// them before falling back to this conversion.
    #[must_use]
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(v) => Self::Bool(*v),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if n.is_u64() {
                    // Out of i64 range: keep it exact rather than rounding.
                    Self::Structured(json.clone())
                } else {
                    n.as_f64().map_or(Self::Null, Self::Float)
                }
            }
            serde_json::Value::String(v) => Self::String(v.clone()),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                Self::Structured(json.clone())
            }
        }
    }

    /// Converts a non-entity value to JSON.
    ///
    /// Returns `None` for [`Value::Entity`]: nested entities are serialized as
    /// documents, which needs the serialize options of the caller. Also
    /// `None` for non-finite floats, which JSON cannot represent.
    #[must_use]
    pub fn to_json(&self) -> Option<serde_json::Value> {
        let json = match self {
            Self::Bool(v) => serde_json::Value::Bool(*v),
            Self::Int(v) => serde_json::Value::from(*v),
            Self::Float(v) => serde_json::Value::Number(serde_json::Number::from_f64(*v)?),
            Self::String(v) => serde_json::Value::String(v.clone()),
            Self::Structured(v) => v.clone(),
            Self::Entity(_) => return None,
            Self::Null => serde_json::Value::Null,
        };
        Some(json)
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::Null
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v:?}"),
            Self::Structured(v) => write!(f, "{v}"),
            Self::Entity(v) => write!(f, "entity:{}", v.descriptor().qualified_name()),
            Self::Null => write!(f, "null"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<Entity> for Value {
    fn from(v: Entity) -> Self {
        Self::Entity(Box::new(v))
    }
}

/// Goes through [`Value::from_json`], so JSON scalars land in their scalar
/// variant and read back equal after a round-trip.
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Self::from_json(&v)
    }
}

/// Conversion between Rust field types and [`Value`], used by the typed
/// accessors that `entity_accessors!` generates.
pub trait FieldValue: Sized {
    /// Type name reported in mismatch errors.
    const TYPE_NAME: &'static str;

    /// Extracts the Rust value, or `None` if the variant does not match.
    fn from_value(value: &Value) -> Option<Self>;

    /// Wraps the Rust value.
    fn into_value(self) -> Value;
}

macro_rules! impl_field_value {
    ($ty:ty, $name:literal, $variant:ident) => {
        impl FieldValue for $ty {
            const TYPE_NAME: &'static str = $name;

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }
    };
}

impl_field_value!(bool, "bool", Bool);
impl_field_value!(i64, "int", Int);
impl_field_value!(f64, "float", Float);
impl_field_value!(String, "string", String);

/// JSON view of any non-entity value.
impl FieldValue for serde_json::Value {
    const TYPE_NAME: &'static str = "json";

    fn from_value(value: &Value) -> Option<Self> {
        value.to_json()
    }

    fn into_value(self) -> Value {
        Value::from(self)
    }
}

impl FieldValue for Entity {
    const TYPE_NAME: &'static str = "entity";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_entity().cloned()
    }

    fn into_value(self) -> Value {
        Value::Entity(Box::new(self))
    }
}
