//! Recursive merge of nested mappings.

use sdb_types::{Document, TypeError};
use serde_json::{Map, Value};

/// Merge `source` into `target`, recursing where both sides hold a mapping.
///
/// Any other collision is resolved in favour of `source`, including a
/// mapping in `source` replacing a scalar in `target`. Keys only present in
/// `target` are left alone. Inputs are trees, never graphs.
pub fn deep_merge(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, incoming) in source {
        if let (Some(Value::Object(existing)), Value::Object(nested)) = (target.get_mut(key), incoming)
        {
            deep_merge(existing, nested);
            continue;
        }
        target.insert(key.clone(), incoming.clone());
    }
}

/// Fold `candidate` over `existing`: the candidate's values win, fields only
/// the stored document has are carried over.
pub fn merge_documents(existing: &Document, candidate: &Document) -> Result<Document, TypeError> {
    let mut merged = existing.to_map()?;
    deep_merge(&mut merged, &candidate.to_map()?);
    Document::from_map(merged)
}
