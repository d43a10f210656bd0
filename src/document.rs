//! The serialized form of an entity.
//!
//! A document is a two-field record: `object_type` names the entity's type and
//! `data` maps attribute names to JSON values. Nested entities appear in
//! `data` as nested documents:
//!
//! ```json
//! { "object_type": "pkg.Team",
//!   "data": { "lead": { "object_type": "pkg.User", "data": { "name": "Bo", "age": 22 } } } }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, SerializableError};

/// Key holding the qualified type name.
pub const OBJECT_TYPE_KEY: &str = "object_type";

/// Key holding the attribute map.
pub const DATA_KEY: &str = "data";

/// Attribute map of a document, in attribute declaration order.
pub type DocumentData = serde_json::Map<String, serde_json::Value>;

/// A self-describing serialized entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    object_type: String,
    data: DocumentData,
}

impl Document {
    /// Wraps a type name and an attribute map. The type name is not checked
    /// here; deserialization compares it against the target entity.
    #[must_use]
    pub fn new(object_type: impl Into<String>, data: DocumentData) -> Self {
        Self {
            object_type: object_type.into(),
            data,
        }
    }

    /// Qualified name of the serialized entity's type.
    #[must_use]
    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    /// Attribute map.
    #[must_use]
    pub const fn data(&self) -> &DocumentData {
        &self.data
    }

    /// Value stored for one attribute, if present.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.data.get(name)
    }

    /// Consumes the document, returning its attribute map.
    #[must_use]
    pub fn into_data(self) -> DocumentData {
        self.data
    }

    /// Returns true if `json` is an object with exactly the `object_type` and
    /// `data` keys. Field values shaped like this are reconstructed as nested
    /// entities during deserialization.
    #[must_use]
    pub fn looks_like_document(json: &serde_json::Value) -> bool {
        json.as_object().is_some_and(|map| {
            map.len() == 2 && map.contains_key(OBJECT_TYPE_KEY) && map.contains_key(DATA_KEY)
        })
    }

    /// Validates the shape of an untyped JSON value and converts it.
    ///
    /// # Errors
    ///
    /// [`SerializableError::InvalidDocumentShape`] unless `json` is an object
    /// holding exactly a string `object_type` and an object `data`.
    pub fn from_value(json: serde_json::Value) -> Result<Self> {
        let mut map = match json {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(SerializableError::invalid_shape(format!(
                    "expected an object, got {}",
                    json_kind(&other)
                )))
            }
        };

        for key in [OBJECT_TYPE_KEY, DATA_KEY] {
            if !map.contains_key(key) {
                return Err(SerializableError::invalid_shape(format!("missing '{key}'")));
            }
        }
        if map.len() != 2 {
            let extra: Vec<&str> = map
                .keys()
                .map(String::as_str)
                .filter(|k| *k != OBJECT_TYPE_KEY && *k != DATA_KEY)
                .collect();
            return Err(SerializableError::invalid_shape(format!(
                "unexpected keys: {}",
                extra.join(", ")
            )));
        }

        let object_type = match map.remove(OBJECT_TYPE_KEY) {
            Some(serde_json::Value::String(s)) => s,
            Some(other) => {
                return Err(SerializableError::invalid_shape(format!(
                    "'{OBJECT_TYPE_KEY}' must be a string, got {}",
                    json_kind(&other)
                )))
            }
            None => return Err(SerializableError::invalid_shape(format!("missing '{OBJECT_TYPE_KEY}'"))),
        };
        let data = match map.remove(DATA_KEY) {
            Some(serde_json::Value::Object(data)) => data,
            Some(other) => {
                return Err(SerializableError::invalid_shape(format!(
                    "'{DATA_KEY}' must be an object, got {}",
                    json_kind(&other)
                )))
            }
            None => return Err(SerializableError::invalid_shape(format!("missing '{DATA_KEY}'"))),
        };

        Ok(Self { object_type, data })
    }

    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// [`SerializableError::Json`] for malformed JSON, otherwise as
    /// [`Document::from_value`].
    pub fn from_json(s: &str) -> Result<Self> {
        let json: serde_json::Value = serde_json::from_str(s)?;
        Self::from_value(json)
    }

    /// The document as a JSON object.
    #[must_use]
    pub fn to_value(&self) -> serde_json::Value {
        self.clone().into_value()
    }

    /// Consumes the document, returning it as a JSON object.
    #[must_use]
    pub fn into_value(self) -> serde_json::Value {
        let mut map = serde_json::Map::with_capacity(2);
        map.insert(OBJECT_TYPE_KEY.to_string(), serde_json::Value::String(self.object_type));
        map.insert(DATA_KEY.to_string(), serde_json::Value::Object(self.data));
        serde_json::Value::Object(map)
    }

    /// Serialize to compact JSON.
    ///
    /// # Errors
    ///
    /// [`SerializableError::Json`] if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// [`SerializableError::Json`] if encoding fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl From<Document> for serde_json::Value {
    fn from(document: Document) -> Self {
        document.into_value()
    }
}

impl TryFrom<serde_json::Value> for Document {
    type Error = SerializableError;

    fn try_from(json: serde_json::Value) -> Result<Self> {
        Self::from_value(json)
    }
}

const fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shape_error(json: serde_json::Value) -> String {
        match Document::from_value(json) {
            Err(SerializableError::InvalidDocumentShape { reason }) => reason,
            other => panic!("expected shape error, got {other:?}"),
        }
    }

    #[test]
    fn from_value_accepts_well_formed() {
        let doc = Document::from_value(json!({
            "object_type": "pkg.User",
            "data": {"name": "Ann", "age": 30}
        }))
        .unwrap();
        assert_eq!(doc.object_type(), "pkg.User");
        assert_eq!(doc.field("age"), Some(&json!(30)));
        assert_eq!(doc.data().len(), 2);
    }

    #[test]
    fn from_value_rejects_missing_keys() {
        assert!(shape_error(json!({"data": {}})).contains("object_type"));
        assert!(shape_error(json!({"object_type": "pkg.User"})).contains("data"));
    }

    #[test]
    fn from_value_rejects_extra_keys() {
        let reason = shape_error(json!({"object_type": "pkg.User", "data": {}, "version": 2}));
        assert!(reason.contains("version"));
    }

    #[test]
    fn from_value_rejects_wrong_types() {
        assert!(shape_error(json!([1, 2])).contains("array"));
        assert!(shape_error(json!({"object_type": 1, "data": {}})).contains("string"));
        assert!(shape_error(json!({"object_type": "pkg.User", "data": []})).contains("object"));
    }

    #[test]
    fn looks_like_document_requires_exact_keys() {
        assert!(Document::looks_like_document(&json!({"object_type": "a.B", "data": {}})));
        assert!(!Document::looks_like_document(&json!({"object_type": "a.B"})));
        assert!(!Document::looks_like_document(&json!({"object_type": "a.B", "data": {}, "x": 1})));
        assert!(!Document::looks_like_document(&json!("a.B")));
    }

    #[test]
    fn serde_denies_unknown_fields() {
        let err = serde_json::from_value::<Document>(json!({
            "object_type": "pkg.User", "data": {}, "extra": true
        }));
        assert!(err.is_err());
    }

    #[test]
    fn json_text_roundtrip_keeps_field_order() {
        let mut data = DocumentData::new();
        data.insert("zeta".to_string(), json!(1));
        data.insert("alpha".to_string(), json!(2));
        let doc = Document::new("pkg.Order", data);

        let text = doc.to_json().unwrap();
        assert!(text.find("zeta").unwrap() < text.find("alpha").unwrap());
        assert_eq!(Document::from_json(&text).unwrap(), doc);
    }

    #[test]
    fn from_json_reports_syntax_errors() {
        let err = Document::from_json("{not json").unwrap_err();
        assert!(matches!(err, SerializableError::Json(_)));
    }
}
