//! The databases of a StatusDB server and the views each one carries.

use std::fmt;
use std::str::FromStr;

use sdb_store::InMemoryDocumentStore;
use sdb_types::{Document, EntityType};
use serde_json::{json, Value};

use crate::error::SdkError;

/// View every database carries: document name to document.
pub const NAMES: &str = "names/name";
pub const PROJECT_NAME: &str = "project/project_name";
pub const PROJECT_ID: &str = "project/project_id";
pub const NAME_FLOWCELL: &str = "names/name_fc";
pub const NAME_PROJECT: &str = "names/name_proj";
pub const STORAGE_STATUS: &str = "info/storage_status";
pub const RUN_ID: &str = "info/id";
pub const BARCODE_LANE_STATS: &str = "names/Barcode_lane_stat";

/// One of the standard databases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Database {
    Projects,
    Samples,
    Flowcells,
    Analysis,
}

impl Database {
    pub const ALL: [Database; 4] = [
        Database::Projects,
        Database::Samples,
        Database::Flowcells,
        Database::Analysis,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Samples => "samples",
            Self::Flowcells => "flowcells",
            Self::Analysis => "analysis",
        }
    }

    /// Kind of document the database holds.
    pub fn entity_type(self) -> EntityType {
        match self {
            Self::Projects => EntityType::ProjectSummary,
            Self::Samples => EntityType::SampleRunMetrics,
            Self::Flowcells => EntityType::FlowcellRunMetrics,
            Self::Analysis => EntityType::Analysis,
        }
    }

    /// Register this database's views on `store`.
    pub fn register_views(self, store: &InMemoryDocumentStore) {
        store.register_view(NAMES, |doc: &Document| emit_name(doc, Value::Null));
        match self {
            Self::Projects => {
                store.register_view(PROJECT_NAME, |doc: &Document| {
                    emit_field(doc, &EntityType::ProjectSummary, "project_name", Value::Null)
                });
                store.register_view(PROJECT_ID, |doc: &Document| {
                    emit_field(doc, &EntityType::ProjectSummary, "project_id", Value::Null)
                });
            }
            Self::Samples => {
                store.register_view(NAME_FLOWCELL, |doc: &Document| {
                    emit_name(doc, field_or_null(doc, "flowcell"))
                });
                store.register_view(NAME_PROJECT, |doc: &Document| {
                    emit_name(doc, field_or_null(doc, "sample_prj"))
                });
            }
            Self::Flowcells => {
                store.register_view(STORAGE_STATUS, |doc: &Document| {
                    emit_name(doc, json!({"storage_status": field_or_null(doc, "storage_status")}))
                });
                store.register_view(RUN_ID, |doc: &Document| {
                    let run_id = doc
                        .get("RunInfo")
                        .and_then(|info| info.get("Id"))
                        .and_then(Value::as_str);
                    match run_id {
                        Some(run_id) => vec![(run_id.to_string(), json!(doc.id.as_str()))],
                        None => Vec::new(),
                    }
                });
                store.register_view(BARCODE_LANE_STATS, |doc: &Document| {
                    let stats = doc
                        .get("illumina")
                        .and_then(|i| i.get("Demultiplex_Stats"))
                        .and_then(|d| d.get("Barcode_lane_statistics"));
                    match stats {
                        Some(stats) => emit_name(doc, stats.clone()),
                        None => Vec::new(),
                    }
                });
            }
            Self::Analysis => {}
        }
    }
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Database {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|db| db.name() == s)
            .ok_or_else(|| SdkError::UnknownDatabase(s.to_string()))
    }
}

fn emit_name(doc: &Document, value: Value) -> Vec<(String, Value)> {
    match &doc.name {
        Some(name) => vec![(name.clone(), value)],
        None => Vec::new(),
    }
}

fn emit_field(doc: &Document, kind: &EntityType, field: &str, value: Value) -> Vec<(String, Value)> {
    if !doc.is(kind) {
        return Vec::new();
    }
    match doc.get_str(field) {
        Some(key) => vec![(key.to_string(), value)],
        None => Vec::new(),
    }
}

fn field_or_null(doc: &Document, field: &str) -> Value {
    doc.get(field).cloned().unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdb_store::DocumentStore;
    use sdb_types::Timestamp;

    fn doc(kind: EntityType, name: &str, fields: Value) -> Document {
        let mut doc = Document::new(kind, Timestamp::new("t")).with_name(name);
        if let Value::Object(map) = fields {
            doc.fields = map;
        }
        doc
    }

    #[test]
    fn database_names_roundtrip() {
        for db in Database::ALL {
            assert_eq!(db.name().parse::<Database>().unwrap(), db);
        }
        assert!(matches!(
            "worksets".parse::<Database>(),
            Err(SdkError::UnknownDatabase(name)) if name == "worksets"
        ));
    }

    #[test]
    fn project_views() {
        let store = InMemoryDocumentStore::new("projects");
        Database::Projects.register_views(&store);
        let project = doc(
            EntityType::ProjectSummary,
            "J.Doe_13_01",
            json!({"project_name": "J.Doe_13_01", "project_id": "P1234"}),
        );
        store.load_documents([project.clone()]).unwrap();

        assert_eq!(store.index(PROJECT_NAME).unwrap().id_of("J.Doe_13_01"), Some(&project.id));
        assert_eq!(store.index(PROJECT_ID).unwrap().id_of("P1234"), Some(&project.id));
        assert_eq!(store.index(NAMES).unwrap().len(), 1);
        assert!(store.index(NAME_FLOWCELL).is_err());
    }

    #[test]
    fn sample_views_carry_values() {
        let store = InMemoryDocumentStore::new("samples");
        Database::Samples.register_views(&store);
        store
            .load_documents([doc(
                EntityType::SampleRunMetrics,
                "1_120924_FC1_ACAGTG",
                json!({"flowcell": "FC1", "sample_prj": "J.Doe_13_01"}),
            )])
            .unwrap();
        let fc = store.index(NAME_FLOWCELL).unwrap();
        assert_eq!(fc.value_of("1_120924_FC1_ACAGTG"), Some(&json!("FC1")));
        let prj = store.index(NAME_PROJECT).unwrap();
        assert_eq!(prj.value_of("1_120924_FC1_ACAGTG"), Some(&json!("J.Doe_13_01")));
    }

    #[test]
    fn flowcell_views() {
        let store = InMemoryDocumentStore::new("flowcells");
        Database::Flowcells.register_views(&store);
        let run = doc(
            EntityType::FlowcellRunMetrics,
            "120924_FC1",
            json!({
                "RunInfo": {"Id": "120924_SN1_0001_AFC1"},
                "storage_status": "on disk",
                "illumina": {"Demultiplex_Stats": {"Barcode_lane_statistics": [{"Lane": "1"}]}},
            }),
        );
        let bare = doc(EntityType::FlowcellRunMetrics, "120925_FC2", json!({}));
        store.load_documents([run.clone(), bare]).unwrap();

        let status = store.index(STORAGE_STATUS).unwrap();
        assert_eq!(status.value_of("120924_FC1"), Some(&json!({"storage_status": "on disk"})));
        assert_eq!(status.value_of("120925_FC2"), Some(&json!({"storage_status": null})));

        let ids = store.index(RUN_ID).unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(ids.id_of("120924_SN1_0001_AFC1"), Some(&run.id));

        let stats = store.index(BARCODE_LANE_STATS).unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats.value_of("120924_FC1"), Some(&json!([{"Lane": "1"}])));
    }
}
