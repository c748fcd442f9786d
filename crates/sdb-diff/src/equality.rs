//! Document equality.
//!
//! Two flavours exist. [`documents_equal`] is the loose content comparison
//! used by name-indexed upserts. [`comp_obj`] is the strict comparison used
//! by identity-indexed saves: it also demands the same number of keys and
//! applies the `project_summary` placeholder correction first.

use sdb_types::{Document, EntityType, TypeError};

use crate::document_diff::diff_documents;
use crate::sentinel::suppress_not_found_sentinels;

/// Content equality: bookkeeping fields are ignored and a missing key
/// equals `null`.
pub fn documents_equal(a: &Document, b: &Document) -> bool {
    diff_documents(a, b).is_empty()
}

/// Strict equality of `candidate` against `stored`.
///
/// When `stored` is a `project_summary`, `candidate` is rewritten in place
/// by [`suppress_not_found_sentinels`] before comparing, so the corrected
/// document is what the caller goes on to persist. Every key is compared,
/// bookkeeping included; callers align `_id`, `_rev` and the timestamps
/// beforehand.
pub fn comp_obj(candidate: &mut Document, stored: &Document) -> Result<bool, TypeError> {
    if stored.is(&EntityType::ProjectSummary) {
        let stored_map = stored.to_map()?;
        let mut candidate_map = candidate.to_map()?;
        suppress_not_found_sentinels(&mut candidate_map, &stored_map);
        *candidate = Document::from_map(candidate_map)?;
    }

    if candidate.key_count() != stored.key_count() {
        return Ok(false);
    }

    let candidate_map = candidate.to_map()?;
    let stored_map = stored.to_map()?;
    Ok(candidate_map
        .iter()
        .all(|(key, value)| stored_map.get(key) == Some(value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sdb_types::{Revision, Timestamp};
    use serde_json::{json, Value};

    fn stamp(s: &str) -> Timestamp {
        Timestamp::new(format!("2024-01-0{s}T00:00:00.000000Z"))
    }

    fn project(samples: Value) -> Document {
        Document::new(EntityType::ProjectSummary, stamp("1"))
            .with_name("J.Doe_11_01")
            .with_field("project_id", json!("P1234"))
            .with_field("samples", samples)
    }

    /// Align the bookkeeping of `candidate` with `stored` the way an
    /// identity save does before comparing.
    fn aligned(mut candidate: Document, stored: &Document) -> Document {
        candidate.id = stored.id.clone();
        candidate.revision = stored.revision.clone();
        candidate.creation_time = stored.creation_time.clone();
        candidate.modification_time = stored.modification_time.clone();
        candidate
    }

    // -----------------------------------------------------------------------
    // Loose equality
    // -----------------------------------------------------------------------

    #[test]
    fn loose_equality_ignores_bookkeeping() {
        let a = project(json!({"P1234_101": {"status": "complete"}}));
        let mut b = a.clone();
        b.id = "another".into();
        b.revision = Some(Revision::new("3-ff"));
        b.creation_time = Some(stamp("5"));
        b.modification_time = None;
        assert!(documents_equal(&a, &b));
    }

    #[test]
    fn loose_equality_is_deep() {
        let a = project(json!({"P1234_101": {"status": "complete"}}));
        let b = project(json!({"P1234_101": {"status": "aborted"}}));
        assert!(!documents_equal(&a, &b));
    }

    #[test]
    fn loose_equality_ignores_key_order() {
        let a = project(json!({})).with_field("x", json!(1)).with_field("y", json!(2));
        let mut b = project(json!({}));
        b.id = a.id.clone();
        b.set("y", json!(2));
        b.set("x", json!(1));
        assert!(documents_equal(&a, &b));
    }

    // -----------------------------------------------------------------------
    // Strict equality
    // -----------------------------------------------------------------------

    #[test]
    fn strict_equality_counts_keys() {
        let mut stored = project(json!({}));
        stored.revision = Some(Revision::new("1-aa"));
        let mut candidate = aligned(project(json!({})).with_field("extra", Value::Null), &stored);
        assert!(!comp_obj(&mut candidate, &stored).unwrap());
    }

    #[test]
    fn strict_equality_sees_bookkeeping() {
        let stored = project(json!({}));
        let mut candidate = project(json!({}));
        assert!(!comp_obj(&mut candidate, &stored).unwrap());

        let mut candidate = aligned(project(json!({})), &stored);
        assert!(comp_obj(&mut candidate, &stored).unwrap());
    }

    #[test]
    fn placeholder_status_is_corrected_for_project_summary() {
        let stored = project(json!({"P1234_101": {"status": "complete"}}));
        let mut candidate = aligned(project(json!({"P1234_101": {"status": "doc_not_found"}})), &stored);

        assert!(comp_obj(&mut candidate, &stored).unwrap());
        assert_eq!(
            candidate.get("samples").unwrap()["P1234_101"]["status"],
            json!("complete")
        );
    }

    #[test]
    fn placeholder_without_stored_value_is_stripped() {
        let stored = project(json!({"P1234_101": {}}));
        let mut candidate = aligned(
            project(json!({"P1234_101": {"m_reads_sequenced": "doc_not_found"}})),
            &stored,
        );
        assert!(comp_obj(&mut candidate, &stored).unwrap());
        assert_eq!(candidate.get("samples").unwrap()["P1234_101"], json!({}));
    }

    #[test]
    fn placeholder_is_kept_for_other_entity_types() {
        let mut stored = Document::new(EntityType::Analysis, stamp("1"))
            .with_name("J.Doe_11_01")
            .with_field("samples", json!({"P1234_101": {"status": "complete"}}));
        stored.revision = Some(Revision::new("1-aa"));
        let candidate = stored
            .clone()
            .with_field("samples", json!({"P1234_101": {"status": "doc_not_found"}}));
        let mut candidate = aligned(candidate, &stored);

        assert!(!comp_obj(&mut candidate, &stored).unwrap());
        assert_eq!(
            candidate.get("samples").unwrap()["P1234_101"]["status"],
            json!("doc_not_found")
        );
    }

    fn scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i32>().prop_map(Value::from),
            "[a-z]{0,6}".prop_map(Value::from),
        ]
    }

    proptest! {
        #[test]
        fn volatile_fields_never_matter(
            fields in prop::collection::btree_map("[a-z]{1,4}", scalar(), 0..6),
            rev in "[0-9]{1,2}-[a-f0-9]{4}",
            day in 1u8..9,
        ) {
            let mut a = Document::new(EntityType::SampleRunMetrics, stamp("1")).with_name("1_120101_FC1_ACGT");
            for (k, v) in &fields {
                a.set(k.clone(), v.clone());
            }
            let mut b = a.clone();
            b.id = sdb_types::DocumentId::generate();
            b.revision = Some(Revision::new(rev));
            b.creation_time = Some(stamp(&day.to_string()));
            b.modification_time = Some(stamp(&day.to_string()));
            prop_assert!(documents_equal(&a, &b));
        }
    }
}
