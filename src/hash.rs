//! Stable content hashing of documents.
//!
//! Entities have no default hash (`Serializable::to_hash` fails unless
//! overridden). Types that want one usually hash their serialized document
//! with [`content_hash`].

use blake3::Hasher;

use crate::document::Document;
use crate::error::Result;

/// Hex-encoded BLAKE3 hash of a document.
///
/// Object keys are sorted at every level before hashing, so two documents
/// that compare equal hash equally regardless of field order.
///
/// # Errors
///
/// [`crate::SerializableError::Json`] if the document cannot be encoded.
pub fn content_hash(document: &Document) -> Result<String> {
    let canonical = canonicalize(&document.to_value());
    let bytes = serde_json::to_vec(&canonical)?;

    let mut h = Hasher::new();
    h.update(&bytes);
    Ok(h.finalize().to_hex().to_string())
}

fn canonicalize(json: &serde_json::Value) -> serde_json::Value {
    match json {
        serde_json::Value::Object(map) => {
            let mut entries: Vec<(&String, &serde_json::Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            serde_json::Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), canonicalize(v)))
                    .collect(),
            )
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(canonicalize).collect())
        }
        other => other.clone(),
    }
}
