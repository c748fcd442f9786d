use std::sync::Arc;

use indexmap::IndexMap;
use sdb_gate::ConfirmationGate;
use sdb_match::{MatchOptions, MatchResult, NameMatcher};
use sdb_store::DocumentStore;
use sdb_types::{Clock, ProjectSample, ProjectSamples};
use serde_json::{Map, Value};
use tracing::{info_span, warn};

use crate::connection::{Connection, DatabaseConnection};
use crate::error::SdkResult;
use crate::views;

/// Sample run name to the library prep it belongs to, per project sample.
pub type LatestLibraryPreps = IndexMap<String, IndexMap<String, String>>;

/// Connection to the `projects` database of project summaries.
///
/// Entries are looked up by project name; the id view is keyed by
/// project id.
#[derive(Debug)]
pub struct ProjectSummaryConnection {
    conn: Connection,
    matcher: NameMatcher,
}

impl ProjectSummaryConnection {
    pub fn open(
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
        gate: Arc<ConfirmationGate>,
    ) -> SdkResult<Self> {
        let conn = Connection::open(store, clock, views::PROJECT_NAME, Some(views::PROJECT_ID))?;
        let matcher =
            NameMatcher::new(gate).with_span(info_span!(parent: conn.span(), "name_matcher"));
        Ok(Self { conn, matcher })
    }

    /// The samples of project `project_name`, in document order.
    pub fn project_samples(&self, project_name: &str) -> SdkResult<Option<ProjectSamples>> {
        match self.conn.get_entry(project_name)? {
            Some(project) => Ok(project.project_samples()?),
            None => Ok(None),
        }
    }

    /// Map `barcode_name` onto one of the samples of `project_name`.
    ///
    /// Relaxed matches are confirmed interactively; force mode is never
    /// used here.
    pub fn get_project_sample(
        &self,
        project_name: &str,
        barcode_name: Option<&str>,
        extensive_matching: bool,
    ) -> SdkResult<Option<MatchResult>> {
        let Some(barcode_name) = barcode_name else {
            return Ok(None);
        };
        let Some(samples) = self.project_samples(project_name)? else {
            return Ok(None);
        };
        let options = MatchOptions {
            extensive: extensive_matching,
            force: false,
        };
        Ok(self.matcher.match_barcode(barcode_name, &samples, options)?)
    }

    /// Like [`Self::get_project_sample`] with explicit options, for batch
    /// runs that may force relaxed matches.
    pub fn match_project_sample(
        &self,
        project_name: &str,
        barcode_name: &str,
        options: MatchOptions,
    ) -> SdkResult<Option<MatchResult>> {
        let Some(samples) = self.project_samples(project_name)? else {
            return Ok(None);
        };
        Ok(self.matcher.match_barcode(barcode_name, &samples, options)?)
    }

    /// Ordered amount of reads in millions: the first sample's
    /// `details.reads_min`, else the project's
    /// `min_m_reads_per_sample_ordered`.
    pub fn get_ordered_amount(
        &self,
        project_name: &str,
        samples: &ProjectSamples,
    ) -> SdkResult<Option<Value>> {
        let from_sample = samples
            .values()
            .next()
            .and_then(|sample| sample.details.as_ref())
            .and_then(|details| details.get("reads_min"))
            .cloned();
        match from_sample {
            Some(amount) => Ok(Some(amount)),
            None => self.conn.get_field(project_name, "min_m_reads_per_sample_ordered"),
        }
    }

    /// For each sample with library preps: the sample runs of its latest
    /// prep (greatest prep id), mapped to that prep id.
    pub fn get_latest_library_prep(&self, project_name: &str) -> SdkResult<Option<LatestLibraryPreps>> {
        let Some(samples) = self.project_samples(project_name)? else {
            return Ok(None);
        };
        let _entered = self.conn.span().enter();
        let mut latest = LatestLibraryPreps::new();
        for (sample_name, sample) in &samples {
            let newest = sample
                .library_prep
                .as_ref()
                .and_then(|preps| preps.iter().max_by(|a, b| a.0.cmp(b.0)));
            let Some((prep_id, prep)) = newest else {
                warn!("no library_prep information for project sample {sample_name}");
                continue;
            };
            let runs = prep
                .sample_run_metrics
                .iter()
                .flat_map(|metrics| metrics.keys())
                .map(|run| (run.clone(), prep_id.clone()))
                .collect();
            latest.insert(sample_name.clone(), runs);
        }
        Ok(Some(latest))
    }

    /// Where the project's information comes from (`source`).
    pub fn get_info_source(&self, project_name: &str) -> SdkResult<Option<Value>> {
        self.conn.get_field(project_name, "source")
    }
}

impl DatabaseConnection for ProjectSummaryConnection {
    fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// The sample run metrics of a project sample: the union over its library
/// preps, or its flat `sample_run_metrics` when it has none.
pub fn sample_run_metrics(sample: &ProjectSample) -> Option<Map<String, Value>> {
    match &sample.library_prep {
        Some(preps) if !preps.is_empty() => Some(
            preps
                .values()
                .filter_map(|prep| prep.sample_run_metrics.as_ref())
                .flat_map(|metrics| metrics.iter().map(|(k, v)| (k.clone(), v.clone())))
                .collect(),
        ),
        _ => sample.sample_run_metrics.clone(),
    }
}

/// Connection to the `analysis` database.
#[derive(Debug)]
pub struct AnalysisConnection {
    conn: Connection,
}

impl AnalysisConnection {
    pub fn open(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> SdkResult<Self> {
        Ok(Self {
            conn: Connection::open(store, clock, views::NAMES, None)?,
        })
    }
}

impl DatabaseConnection for AnalysisConnection {
    fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdb_gate::{GateConfig, ScriptedPrompt};
    use sdb_store::InMemoryDocumentStore;
    use sdb_types::{Document, EntityType, FixedClock, Timestamp};
    use serde_json::json;

    use crate::views::Database;

    fn project(samples: Value, extra: Value) -> Document {
        let mut doc = Document::new(EntityType::ProjectSummary, Timestamp::new("t"))
            .with_name("J.Doe_13_01")
            .with_field("project_name", json!("J.Doe_13_01"))
            .with_field("project_id", json!("P1234"))
            .with_field("samples", samples);
        if let Value::Object(map) = extra {
            doc.fields.extend(map);
        }
        doc
    }

    fn connection(doc: Document, answers: &[bool]) -> (ProjectSummaryConnection, Arc<ScriptedPrompt>) {
        let store = Arc::new(InMemoryDocumentStore::new("projects"));
        Database::Projects.register_views(&store);
        store.load_documents([doc]).unwrap();
        let prompt = Arc::new(ScriptedPrompt::new(answers.iter().copied()));
        let gate = Arc::new(ConfirmationGate::new(prompt.clone(), GateConfig::default()));
        let conn = ProjectSummaryConnection::open(store, Arc::new(FixedClock::new("t")), gate).unwrap();
        (conn, prompt)
    }

    #[test]
    fn project_sample_by_barcode() {
        let (conn, prompt) = connection(
            project(json!({"P1234_101": {"customer_name": "c1"}, "P1234_102": {}}), json!({})),
            &[],
        );
        let result = conn
            .get_project_sample("J.Doe_13_01", Some("P1234_102B_index7"), false)
            .unwrap()
            .unwrap();
        assert_eq!(result.sample_name, "P1234_102");
        assert!(prompt.asked().is_empty());

        assert!(conn.get_project_sample("J.Doe_13_01", None, false).unwrap().is_none());
        assert!(conn
            .get_project_sample("X.Nobody_00_00", Some("P1234_101"), false)
            .unwrap()
            .is_none());
    }

    #[test]
    fn relaxed_match_is_confirmed_unless_forced() {
        let (conn, prompt) = connection(project(json!({"P1234_101": {}}), json!({})), &[false]);
        let result = conn
            .get_project_sample("J.Doe_13_01", Some("1234_101_index3"), true)
            .unwrap();
        assert!(result.is_none());
        assert_eq!(prompt.asked().len(), 1);

        let forced = conn
            .match_project_sample(
                "J.Doe_13_01",
                "1234_101_index3",
                MatchOptions {
                    extensive: true,
                    force: true,
                },
            )
            .unwrap();
        assert_eq!(forced.map(|r| r.sample_name).as_deref(), Some("P1234_101"));
    }

    #[test]
    fn entry_by_project_id() {
        let (conn, _) = connection(project(json!({}), json!({})), &[]);
        let doc = conn.get_entry_by_id_view("P1234").unwrap().unwrap();
        assert_eq!(doc.get_str("project_name"), Some("J.Doe_13_01"));
    }

    #[test]
    fn ordered_amount_prefers_sample_details() {
        let (conn, _) = connection(
            project(json!({}), json!({"min_m_reads_per_sample_ordered": 10})),
            &[],
        );
        let mut samples = ProjectSamples::new();
        samples.insert("P1234_101".into(), ProjectSample::default());
        assert_eq!(
            conn.get_ordered_amount("J.Doe_13_01", &samples).unwrap(),
            Some(json!(10))
        );

        let mut detailed = ProjectSample::default();
        let mut details = Map::new();
        details.insert("reads_min".into(), json!(25));
        detailed.details = Some(details);
        let mut reordered = ProjectSamples::new();
        reordered.insert("P1234_100".into(), detailed);
        reordered.extend(samples);
        assert_eq!(
            conn.get_ordered_amount("J.Doe_13_01", &reordered).unwrap(),
            Some(json!(25))
        );
    }

    #[test]
    fn latest_library_prep() {
        let (conn, _) = connection(
            project(
                json!({
                    "P1234_101": {"library_prep": {
                        "A": {"sample_run_metrics": {"1_120924_FC1_AAA": "id1"}},
                        "B": {"sample_run_metrics": {"2_120925_FC2_AAA": "id2", "3_120925_FC2_AAA": "id3"}},
                    }},
                    "P1234_102": {},
                }),
                json!({}),
            ),
            &[],
        );
        let latest = conn.get_latest_library_prep("J.Doe_13_01").unwrap().unwrap();
        assert_eq!(latest.len(), 1);
        let runs = &latest["P1234_101"];
        assert_eq!(runs.get("2_120925_FC2_AAA").map(String::as_str), Some("B"));
        assert_eq!(runs.get("3_120925_FC2_AAA").map(String::as_str), Some("B"));
        assert!(!runs.contains_key("1_120924_FC1_AAA"));
    }

    #[test]
    fn info_source() {
        let (conn, _) = connection(project(json!({}), json!({"source": "lims"})), &[]);
        assert_eq!(conn.get_info_source("J.Doe_13_01").unwrap(), Some(json!("lims")));
        assert_eq!(conn.get_info_source("X.Nobody_00_00").unwrap(), None);
    }

    #[test]
    fn flattened_sample_run_metrics() {
        let with_preps: ProjectSample = serde_json::from_value(json!({"library_prep": {
            "A": {"sample_run_metrics": {"r1": "id1"}},
            "B": {"sample_run_metrics": {"r2": "id2"}},
            "C": {},
        }}))
        .unwrap();
        let metrics = sample_run_metrics(&with_preps).unwrap();
        assert_eq!(metrics.keys().collect::<Vec<_>>(), vec!["r1", "r2"]);

        let flat: ProjectSample =
            serde_json::from_value(json!({"sample_run_metrics": {"r3": "id3"}})).unwrap();
        assert_eq!(sample_run_metrics(&flat).unwrap()["r3"], json!("id3"));
        assert!(sample_run_metrics(&ProjectSample::default()).is_none());
    }
}
