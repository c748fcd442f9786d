//! Content-level diff between two documents.
//!
//! Only content keys take part: `_id`, `_rev`, `creation_time` and
//! `modification_time` are ignored, and a key that is missing on one side
//! compares as `null`.

use std::collections::BTreeMap;

use sdb_types::Document;
use serde_json::Value;

/// The result of comparing the content of two documents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentDiff {
    /// Changes ordered by key.
    pub changes: Vec<FieldChange>,
}

impl DocumentDiff {
    /// Returns `true` if the documents have the same content.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Keys that differ, in order.
    pub fn keys(&self) -> Vec<&str> {
        self.changes.iter().map(FieldChange::key).collect()
    }
}

/// A single content key that differs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldChange {
    /// Present (non-null) only in the new document.
    Added { key: String, value: Value },
    /// Present (non-null) only in the old document.
    Removed { key: String, value: Value },
    /// Present in both with different values.
    Modified { key: String, old: Value, new: Value },
}

impl FieldChange {
    pub fn key(&self) -> &str {
        match self {
            Self::Added { key, .. } | Self::Removed { key, .. } | Self::Modified { key, .. } => key,
        }
    }
}

/// Content keys of a document with their values, bookkeeping excluded.
fn content(doc: &Document) -> BTreeMap<&str, Value> {
    let mut map: BTreeMap<&str, Value> = doc
        .fields
        .iter()
        .map(|(k, v)| (k.as_str(), v.clone()))
        .collect();
    map.insert(
        "entity_type",
        doc.entity_type
            .as_ref()
            .map_or(Value::Null, |t| Value::String(t.as_str().to_string())),
    );
    map.insert("name", doc.name.clone().map_or(Value::Null, Value::String));
    map
}

/// Compute the content diff from `old` to `new`.
pub fn diff_documents(old: &Document, new: &Document) -> DocumentDiff {
    let old_content = content(old);
    let new_content = content(new);

    let mut keys: Vec<&str> = old_content.keys().chain(new_content.keys()).copied().collect();
    keys.sort_unstable();
    keys.dedup();

    let changes = keys
        .into_iter()
        .filter_map(|key| {
            let old_val = old_content.get(key).unwrap_or(&Value::Null);
            let new_val = new_content.get(key).unwrap_or(&Value::Null);
            if old_val == new_val {
                return None;
            }
            Some(match (old_val, new_val) {
                (Value::Null, value) => FieldChange::Added {
                    key: key.to_string(),
                    value: value.clone(),
                },
                (value, Value::Null) => FieldChange::Removed {
                    key: key.to_string(),
                    value: value.clone(),
                },
                (old, new) => FieldChange::Modified {
                    key: key.to_string(),
                    old: old.clone(),
                    new: new.clone(),
                },
            })
        })
        .collect();

    DocumentDiff { changes }
}
