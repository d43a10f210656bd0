//! Qualified type names.
//!
//! A qualified name is a dotted path: everything before the last `.` is the
//! namespace, the final segment is the type name (`"pkg.models.User"` has
//! namespace `"pkg.models"` and name `"User"`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SerializableError;

/// Fully-qualified, namespace-prefixed type identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QualifiedName {
    namespace: String,
    name: String,
}

impl QualifiedName {
    /// Builds a qualified name from its two parts.
    ///
    /// # Errors
    ///
    /// Returns [`SerializableError::UnresolvableType`] if either part is empty
    /// or the type name itself contains a `.`.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Result<Self, SerializableError> {
        let namespace = namespace.into();
        let name = name.into();
        let full = format!("{namespace}.{name}");
        if namespace.is_empty() || namespace.starts_with('.') || namespace.ends_with('.') {
            return Err(SerializableError::unresolvable(full, "namespace is empty"));
        }
        if name.is_empty() || name.contains('.') {
            return Err(SerializableError::unresolvable(full, "type name is empty or dotted"));
        }
        Ok(Self { namespace, name })
    }

    /// Splits a dotted path on its last `.`.
    ///
    /// # Errors
    ///
    /// Returns [`SerializableError::UnresolvableType`] if the path has no
    /// namespace portion or no final segment.
    pub fn parse(path: &str) -> Result<Self, SerializableError> {
        let Some((namespace, name)) = path.rsplit_once('.') else {
            return Err(SerializableError::unresolvable(path, "missing namespace"));
        };
        Self::new(namespace, name)
    }

    /// The namespace portion (everything before the final segment).
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The final segment.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

impl FromStr for QualifiedName {
    type Err = SerializableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for QualifiedName {
    type Error = SerializableError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<QualifiedName> for String {
    fn from(name: QualifiedName) -> Self {
        name.to_string()
    }
}

/// Anything that knows the qualified name of its type: descriptors describe a
/// type, entities are instances of one.
pub trait Qualified {
    /// The qualified name of this type, or of this instance's type.
    fn qualified_name(&self) -> &QualifiedName;
}

impl Qualified for QualifiedName {
    fn qualified_name(&self) -> &QualifiedName {
        self
    }
}

/// Returns the qualified name of a type or of an instance's type.
#[must_use]
pub fn qualify<T: Qualified + ?Sized>(obj_or_type: &T) -> &QualifiedName {
    obj_or_type.qualified_name()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_on_last_dot() {
        let name = QualifiedName::parse("pkg.models.User").unwrap();
        assert_eq!(name.namespace(), "pkg.models");
        assert_eq!(name.name(), "User");
        assert_eq!(name.to_string(), "pkg.models.User");
    }

    #[test]
    fn test_parse_rejects_bare_name() {
        let err = QualifiedName::parse("User").unwrap_err();
        assert!(matches!(err, SerializableError::UnresolvableType { .. }));
    }

    #[test]
    fn test_parse_rejects_empty_segments() {
        assert!(QualifiedName::parse(".User").is_err());
        assert!(QualifiedName::parse("pkg.").is_err());
        assert!(QualifiedName::parse("pkg..User").is_err());
        assert!(QualifiedName::parse("").is_err());
    }

    #[test]
    fn test_new_rejects_dotted_type_name() {
        assert!(QualifiedName::new("pkg", "a.B").is_err());
        assert!(QualifiedName::new("pkg.sub", "B").is_ok());
    }

    #[test]
    fn test_serde_as_string() {
        let name: QualifiedName = "pkg.User".parse().unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"pkg.User\"");
        let back: QualifiedName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
        assert!(serde_json::from_str::<QualifiedName>("\"User\"").is_err());
    }

    #[test]
    fn test_qualify_name_is_identity() {
        let name = QualifiedName::parse("pkg.User").unwrap();
        assert_eq!(qualify(&name), &name);
    }
}
