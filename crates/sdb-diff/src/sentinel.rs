//! Legacy correction for `project_summary` documents.
//!
//! A scrape that could not find a sample's source document writes the
//! placeholder `doc_not_found` into the sample's `status` and
//! `m_reads_sequenced`. The correction keeps a previously stored value in
//! place of the placeholder, and drops the key when nothing better is known.
//! Applies to `project_summary` only; see [`crate::comp_obj`].

use serde_json::{Map, Value};

/// Placeholder written by a failed scrape.
pub const DOC_NOT_FOUND: &str = "doc_not_found";

const GUARDED_FIELDS: [&str; 2] = ["status", "m_reads_sequenced"];

fn is_sentinel(value: &Value) -> bool {
    value.as_str() == Some(DOC_NOT_FOUND)
}

/// Rewrite the candidate's `samples` in place against the stored ones.
///
/// For every sample present on both sides, a guarded field holding the
/// placeholder takes the stored value when the stored sample has that
/// field. Afterwards, any candidate sample whose guarded field is still the
/// placeholder or `null` loses that field. Does nothing unless both
/// documents carry a `samples` mapping.
pub fn suppress_not_found_sentinels(candidate: &mut Map<String, Value>, stored: &Map<String, Value>) {
    let (Some(Value::Object(candidate_samples)), Some(Value::Object(stored_samples))) =
        (candidate.get_mut("samples"), stored.get("samples"))
    else {
        return;
    };

    for (name, sample) in candidate_samples.iter_mut() {
        let Value::Object(sample) = sample else {
            continue;
        };

        if let Some(Value::Object(stored_sample)) = stored_samples.get(name) {
            for field in GUARDED_FIELDS {
                if !sample.get(field).is_some_and(is_sentinel) {
                    continue;
                }
                if let Some(previous) = stored_sample.get(field) {
                    sample.insert(field.to_string(), previous.clone());
                }
            }
        }

        for field in GUARDED_FIELDS {
            if sample.get(field).is_some_and(|v| v.is_null() || is_sentinel(v)) {
                sample.remove(field);
            }
        }
    }
}
