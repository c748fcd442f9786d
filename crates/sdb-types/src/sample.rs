use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A project's samples, keyed by canonical project sample name, in the order
/// they appear in the project document.
pub type ProjectSamples = IndexMap<String, ProjectSample>;

/// One entry of a project document's `samples` mapping.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectSample {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub customer_name: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub scilife_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m_reads_sequenced: Option<Value>,

    /// Per library-prep metrics, keyed by prep id (`A`, `B`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_prep: Option<IndexMap<String, LibraryPrep>>,

    /// Flat metrics mapping used by samples without library preps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_run_metrics: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectSample {
    /// A sample carrying only a customer name.
    pub fn with_customer_name(name: impl Into<String>) -> Self {
        Self {
            customer_name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// One library prep of a project sample.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryPrep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_run_metrics: Option<Map<String, Value>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Accepts strings and numbers (customer names such as `101` are sometimes
/// stored unquoted); anything else reads as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_customer_names_read_as_strings() {
        let sample: ProjectSample = serde_json::from_value(json!({"customer_name": 101})).unwrap();
        assert_eq!(sample.customer_name.as_deref(), Some("101"));
    }

    #[test]
    fn null_customer_name_is_absent() {
        let sample: ProjectSample =
            serde_json::from_value(json!({"customer_name": null})).unwrap();
        assert_eq!(sample.customer_name, None);
    }

    #[test]
    fn library_preps_keep_order_and_metrics() {
        let sample: ProjectSample = serde_json::from_value(json!({
            "library_prep": {
                "B": {"sample_run_metrics": {"1_120101_FC2_ACGT": "id2"}},
                "A": {"sample_run_metrics": {"1_120101_FC1_ACGT": "id1"}, "prep_status": "PASSED"},
            }
        }))
        .unwrap();
        let preps = sample.library_prep.unwrap();
        let ids: Vec<_> = preps.keys().cloned().collect();
        assert_eq!(ids, vec!["B", "A"]);
        assert_eq!(preps["A"].extra["prep_status"], json!("PASSED"));
    }

    #[test]
    fn unknown_fields_are_kept() {
        let sample: ProjectSample =
            serde_json::from_value(json!({"incoming_QC_status": "P", "status": "doc_not_found"}))
                .unwrap();
        assert_eq!(sample.extra["incoming_QC_status"], json!("P"));
        assert_eq!(sample.status, Some(json!("doc_not_found")));
    }
}
