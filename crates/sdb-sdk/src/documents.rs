//! Constructors for the standard document kinds.
//!
//! Each kind starts from a fixed set of default fields (`null` for scalar
//! fields, `{}` for mapping fields) and deep-merges the caller's fields over
//! them, so anything the caller passes wins.

use sdb_diff::deep_merge;
use sdb_match::project_id_of;
use sdb_types::{find_or_make_key, Document, EntityType, Timestamp, TypeError};
use serde_json::{json, Map, Value};

struct Template {
    entity_type: EntityType,
    fields: &'static [&'static str],
    dict_fields: &'static [&'static str],
}

const STATUS_DOCUMENT: Template = Template {
    entity_type: EntityType::StatusDocument,
    fields: &[],
    dict_fields: &[],
};

const PROJECT_SUMMARY: Template = Template {
    entity_type: EntityType::ProjectSummary,
    fields: &[
        "application",
        "customer_reference",
        "min_m_reads_per_sample_ordered",
        "no_of_samples",
        "project_id",
        "project_name",
        "source",
    ],
    dict_fields: &["samples"],
};

const FLOWCELL_RUN_METRICS: Template = Template {
    entity_type: EntityType::FlowcellRunMetrics,
    fields: &[],
    dict_fields: &["run_info_yaml", "illumina", "samplesheet_csv"],
};

const SAMPLE_RUN_METRICS: Template = Template {
    entity_type: EntityType::SampleRunMetrics,
    fields: &[
        "barcode_id",
        "barcode_name",
        "barcode_type",
        "bc_count",
        "date",
        "flowcell",
        "lane",
        "sample_prj",
        "sequence",
        "genomes_filter_out",
        "project_sample_name",
        "project_id",
    ],
    dict_fields: &["fastqc", "fastq_scr", "picard_metrics", "bcbb_checkpoints"],
};

const ANALYSIS: Template = Template {
    entity_type: EntityType::Analysis,
    fields: &["project_name"],
    dict_fields: &["samples"],
};

/// Number of lanes on a flowcell.
pub const LANES: u8 = 8;

fn build(
    template: &Template,
    defaults: Map<String, Value>,
    fields: &Map<String, Value>,
    now: &Timestamp,
) -> Result<Document, TypeError> {
    let mut map = Map::new();
    let id = find_or_make_key(fields.get("_id").and_then(Value::as_str));
    map.insert("_id".into(), Value::String(id));
    map.insert("entity_type".into(), json!(template.entity_type.as_str()));
    map.insert("name".into(), Value::Null);
    map.insert("creation_time".into(), json!(now.as_str()));
    map.insert("modification_time".into(), json!(now.as_str()));
    for field in template.fields {
        map.insert((*field).to_string(), Value::Null);
    }
    for field in template.dict_fields {
        map.insert((*field).to_string(), Value::Object(Map::new()));
    }
    deep_merge(&mut map, &defaults);
    deep_merge(&mut map, fields);
    Document::from_map(map)
}

/// A generic status document.
pub fn status_document(fields: &Map<String, Value>, now: &Timestamp) -> Result<Document, TypeError> {
    build(&STATUS_DOCUMENT, Map::new(), fields, now)
}

pub fn project_summary(fields: &Map<String, Value>, now: &Timestamp) -> Result<Document, TypeError> {
    build(&PROJECT_SUMMARY, Map::new(), fields, now)
}

/// A flowcell document with empty metrics for lanes 1 to 8, named
/// `{fc_date}_{fc_name}` when both parts are given.
pub fn flowcell_run_metrics(
    fc_date: Option<&str>,
    fc_name: Option<&str>,
    fields: &Map<String, Value>,
    now: &Timestamp,
) -> Result<Document, TypeError> {
    let lanes: Map<String, Value> = (1..=LANES)
        .map(|lane| {
            let lane = lane.to_string();
            let entry = json!({"lane": lane, "filter_metrics": {}, "bc_metrics": {}});
            (lane, entry)
        })
        .collect();
    let mut defaults = Map::new();
    defaults.insert("lanes".into(), Value::Object(lanes));

    let mut doc = build(&FLOWCELL_RUN_METRICS, defaults, fields, now)?;
    if let (Some(date), Some(name)) = (fc_date, fc_name) {
        doc.name = Some(format!("{date}_{name}"));
    }
    Ok(doc)
}

/// A sample run document named `{lane}_{date}_{flowcell}_{sequence}`.
///
/// Missing name parts render as empty strings. `project_id` is taken from
/// the barcode name's `P<digits>` prefix unless the caller supplies one.
pub fn sample_run_metrics(fields: &Map<String, Value>, now: &Timestamp) -> Result<Document, TypeError> {
    let mut doc = build(&SAMPLE_RUN_METRICS, Map::new(), fields, now)?;
    let part = |key: &str| doc.get(key).map(name_part).unwrap_or_default();
    let name = format!(
        "{}_{}_{}_{}",
        part("lane"),
        part("date"),
        part("flowcell"),
        part("sequence")
    );
    doc.name = Some(name);

    let has_project_id = !matches!(doc.get("project_id"), None | Some(Value::Null));
    if !has_project_id {
        let derived = doc
            .get_str("barcode_name")
            .and_then(project_id_of)
            .map(str::to_string);
        if let Some(project_id) = derived {
            doc.set("project_id", Value::String(project_id));
        }
    }
    Ok(doc)
}

pub fn analysis(fields: &Map<String, Value>, now: &Timestamp) -> Result<Document, TypeError> {
    build(&ANALYSIS, Map::new(), fields, now)
}

fn name_part(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> Timestamp {
        Timestamp::new("2024-01-01T00:00:00.000000Z")
    }

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn project_summary_defaults() {
        let doc = project_summary(&fields(json!({"project_name": "J.Doe_13_01"})), &now()).unwrap();
        assert!(doc.is(&EntityType::ProjectSummary));
        assert_eq!(doc.get("project_name"), Some(&json!("J.Doe_13_01")));
        assert_eq!(doc.get("source"), Some(&Value::Null));
        assert_eq!(doc.get("samples"), Some(&json!({})));
        assert_eq!(doc.creation_time, Some(now()));
        assert_eq!(doc.id.as_str().len(), 32);
    }

    #[test]
    fn caller_fields_override_defaults() {
        let doc = project_summary(
            &fields(json!({"_id": "abc", "samples": {"P1_101": {"status": "ok"}}})),
            &now(),
        )
        .unwrap();
        assert_eq!(doc.id.as_str(), "abc");
        assert_eq!(doc.get("samples"), Some(&json!({"P1_101": {"status": "ok"}})));
    }

    #[test]
    fn flowcell_lanes_and_name() {
        let doc = flowcell_run_metrics(Some("120924"), Some("AC003CCCXX"), &Map::new(), &now()).unwrap();
        assert_eq!(doc.name.as_deref(), Some("120924_AC003CCCXX"));
        let lanes = doc.get("lanes").and_then(Value::as_object).unwrap();
        assert_eq!(lanes.len(), 8);
        assert_eq!(lanes["3"], json!({"lane": "3", "filter_metrics": {}, "bc_metrics": {}}));
        assert_eq!(doc.get("illumina"), Some(&json!({})));

        let unnamed = flowcell_run_metrics(Some("120924"), None, &Map::new(), &now()).unwrap();
        assert_eq!(unnamed.name, None);
    }

    #[test]
    fn flowcell_lane_metrics_merge_into_defaults() {
        let doc = flowcell_run_metrics(
            None,
            None,
            &fields(json!({"lanes": {"1": {"filter_metrics": {"reads": 10}}}})),
            &now(),
        )
        .unwrap();
        let lanes = doc.get("lanes").unwrap();
        assert_eq!(lanes["1"]["filter_metrics"], json!({"reads": 10}));
        assert_eq!(lanes["1"]["lane"], json!("1"));
    }

    #[test]
    fn sample_run_metrics_name_and_project() {
        let doc = sample_run_metrics(
            &fields(json!({
                "lane": 1,
                "date": "120924",
                "flowcell": "AC003CCCXX",
                "sequence": "ACAGTG",
                "barcode_name": "P1234_101B_index3",
            })),
            &now(),
        )
        .unwrap();
        assert_eq!(doc.name.as_deref(), Some("1_120924_AC003CCCXX_ACAGTG"));
        assert_eq!(doc.get_str("project_id"), Some("P1234"));
        assert_eq!(doc.get("fastqc"), Some(&json!({})));
    }

    #[test]
    fn explicit_project_id_is_kept() {
        let doc = sample_run_metrics(
            &fields(json!({"barcode_name": "P1234_101", "project_id": "P9999"})),
            &now(),
        )
        .unwrap();
        assert_eq!(doc.get_str("project_id"), Some("P9999"));
        assert_eq!(doc.name.as_deref(), Some("___"));
    }

    #[test]
    fn unprefixed_barcode_has_no_project_id() {
        let doc = sample_run_metrics(&fields(json!({"barcode_name": "1234_101"})), &now()).unwrap();
        assert_eq!(doc.get("project_id"), Some(&Value::Null));
    }

    #[test]
    fn analysis_and_status_documents() {
        let doc = analysis(&fields(json!({"name": "J.Doe_13_01"})), &now()).unwrap();
        assert!(doc.is(&EntityType::Analysis));
        assert_eq!(doc.name.as_deref(), Some("J.Doe_13_01"));
        assert_eq!(doc.get("project_name"), Some(&Value::Null));

        let status = status_document(&Map::new(), &now()).unwrap();
        assert!(status.is(&EntityType::StatusDocument));
        assert!(status.fields.is_empty());
    }
}
