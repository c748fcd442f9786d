use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::TypeError;
use crate::identity::{DocumentId, Revision};
use crate::sample::{ProjectSample, ProjectSamples};
use crate::temporal::Timestamp;

/// Bookkeeping fields that change on every write and never take part in
/// content comparison.
pub const VOLATILE_FIELDS: [&str; 4] = ["_id", "_rev", "creation_time", "modification_time"];

/// Discriminates the shape of a [`Document`].
///
/// Unknown tags are preserved verbatim so documents written by other tools
/// survive a read-modify-write cycle.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityType {
    StatusDocument,
    ProjectSummary,
    FlowcellRunMetrics,
    SampleRunMetrics,
    Analysis,
    Other(String),
}

impl EntityType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::StatusDocument => "status_document",
            Self::ProjectSummary => "project_summary",
            Self::FlowcellRunMetrics => "flowcell_run_metrics",
            Self::SampleRunMetrics => "sample_run_metrics",
            Self::Analysis => "bp_analysis",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for EntityType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "status_document" => Self::StatusDocument,
            "project_summary" => Self::ProjectSummary,
            "flowcell_run_metrics" => Self::FlowcellRunMetrics,
            "sample_run_metrics" => Self::SampleRunMetrics,
            "bp_analysis" => Self::Analysis,
            _ => Self::Other(tag),
        }
    }
}

impl From<EntityType> for String {
    fn from(kind: EntityType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An open-schema record held by the document store.
///
/// The bookkeeping fields are typed; everything else lives in `fields`,
/// which keeps its insertion order so that nested mappings such as a
/// project's `samples` are iterated in the order they were written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: DocumentId,

    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<Revision>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<EntityType>,

    /// Logical secondary key, expected unique within its entity type.
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modification_time: Option<Timestamp>,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// A fresh document of the given kind: new id, no revision, both
    /// timestamps set to `now`.
    pub fn new(entity_type: EntityType, now: Timestamp) -> Self {
        Self {
            id: DocumentId::generate(),
            revision: None,
            entity_type: Some(entity_type),
            name: None,
            creation_time: Some(now.clone()),
            modification_time: Some(now),
            fields: Map::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Look up an open field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Look up an open field that holds a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(key.into(), value)
    }

    pub fn field_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.fields.get_mut(key)
    }

    /// Returns `true` when the entity type tag equals `kind`.
    pub fn is(&self, kind: &EntityType) -> bool {
        self.entity_type.as_ref() == Some(kind)
    }

    /// Number of top-level keys the store would see for this document.
    pub fn key_count(&self) -> usize {
        2 + usize::from(self.revision.is_some())
            + usize::from(self.entity_type.is_some())
            + usize::from(self.creation_time.is_some())
            + usize::from(self.modification_time.is_some())
            + self.fields.len()
    }

    /// The document as one flat mapping, bookkeeping fields included.
    pub fn to_map(&self) -> Result<Map<String, Value>, TypeError> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Err(TypeError::NotAnObject),
        }
    }

    /// Rebuild a document from a flat mapping produced by [`Self::to_map`]
    /// or read from the store.
    pub fn from_map(map: Map<String, Value>) -> Result<Self, TypeError> {
        Ok(serde_json::from_value(Value::Object(map))?)
    }

    pub fn from_value(value: Value) -> Result<Self, TypeError> {
        match value {
            Value::Object(map) => Self::from_map(map),
            _ => Err(TypeError::NotAnObject),
        }
    }

    /// Typed view over the `samples` mapping, if the document has one.
    ///
    /// Entries that are not valid samples are skipped with a warning; the
    /// rest keep their order.
    pub fn project_samples(&self) -> Result<Option<ProjectSamples>, TypeError> {
        let samples = match self.fields.get("samples") {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Object(samples)) => samples,
            Some(_) => return Err(TypeError::NotAnObject),
        };
        let mut typed = ProjectSamples::with_capacity(samples.len());
        for (name, entry) in samples {
            match ProjectSample::deserialize(entry) {
                Ok(sample) => {
                    typed.insert(name.clone(), sample);
                }
                Err(err) => warn!(doc = %self, sample = %name, "skipping malformed project sample: {err}"),
            }
        }
        Ok(Some(typed))
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.entity_type.as_ref().map_or("document", EntityType::as_str);
        match &self.name {
            Some(name) => write!(f, "<{kind} {name}>"),
            None => write!(f, "<{kind} {}>", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stamp() -> Timestamp {
        Timestamp::new("2024-01-01T00:00:00.000000Z")
    }

    #[test]
    fn new_document_has_bookkeeping() {
        let doc = Document::new(EntityType::ProjectSummary, stamp());
        assert!(doc.revision.is_none());
        assert_eq!(doc.creation_time, Some(stamp()));
        assert_eq!(doc.modification_time, Some(stamp()));
        assert!(doc.is(&EntityType::ProjectSummary));
    }

    #[test]
    fn wire_names_are_store_names() {
        let mut doc = Document::new(EntityType::SampleRunMetrics, stamp()).with_name("s1");
        doc.revision = Some(Revision::new("1-abc"));
        let map = doc.to_map().unwrap();
        assert_eq!(map["_rev"], json!("1-abc"));
        assert_eq!(map["entity_type"], json!("sample_run_metrics"));
        assert!(map.contains_key("_id"));
        assert_eq!(doc.key_count(), map.len());
    }

    #[test]
    fn map_roundtrip_keeps_open_fields_in_order() {
        let raw = json!({
            "_id": "abc",
            "_rev": "3-ff",
            "entity_type": "project_summary",
            "name": "J.Doe_13_01",
            "zeta": 1,
            "alpha": {"nested": true},
        });
        let doc = Document::from_value(raw).unwrap();
        let keys: Vec<_> = doc.fields.keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
        let back = Document::from_map(doc.to_map().unwrap()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn missing_name_counts_as_a_key() {
        let doc = Document::from_value(json!({"_id": "x"})).unwrap();
        assert_eq!(doc.name, None);
        assert_eq!(doc.key_count(), 2);
    }

    #[test]
    fn unknown_entity_types_survive() {
        let doc = Document::from_value(json!({"_id": "x", "entity_type": "worksets"})).unwrap();
        assert_eq!(doc.entity_type, Some(EntityType::Other("worksets".into())));
        assert_eq!(doc.to_map().unwrap()["entity_type"], json!("worksets"));
    }

    #[test]
    fn non_object_is_rejected() {
        assert_eq!(Document::from_value(json!([1, 2])), Err(TypeError::NotAnObject));
    }

    #[test]
    fn project_samples_keep_insertion_order() {
        let doc = Document::new(EntityType::ProjectSummary, stamp()).with_field(
            "samples",
            json!({"P1_102": {}, "P1_101": {"customer_name": "a"}}),
        );
        let samples = doc.project_samples().unwrap().unwrap();
        let names: Vec<_> = samples.keys().cloned().collect();
        assert_eq!(names, vec!["P1_102", "P1_101"]);
    }

    #[test]
    fn malformed_project_sample_is_skipped() {
        let doc = Document::new(EntityType::ProjectSummary, stamp()).with_field(
            "samples",
            json!({
                "P1_101": {"customer_name": "a"},
                "P1_102": "not a sample",
                "P1_103": {"library_prep": 7},
                "P1_104": {},
            }),
        );
        let samples = doc.project_samples().unwrap().unwrap();
        let names: Vec<_> = samples.keys().cloned().collect();
        assert_eq!(names, vec!["P1_101", "P1_104"]);
        assert_eq!(samples["P1_101"].customer_name.as_deref(), Some("a"));
    }

    #[test]
    fn samples_must_be_a_mapping() {
        let doc = Document::new(EntityType::ProjectSummary, stamp()).with_field("samples", json!([1]));
        assert_eq!(doc.project_samples(), Err(TypeError::NotAnObject));
        let none = Document::new(EntityType::ProjectSummary, stamp());
        assert_eq!(none.project_samples(), Ok(None));
    }

    #[test]
    fn display_uses_name_when_present() {
        let doc = Document::new(EntityType::Analysis, stamp()).with_name("J.Doe_13_01");
        assert_eq!(doc.to_string(), "<bp_analysis J.Doe_13_01>");
    }
}
