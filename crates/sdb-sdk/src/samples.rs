use std::sync::Arc;

use sdb_store::{DocumentStore, IndexSnapshot};
use sdb_types::{Clock, Document, DocumentId};
use serde_json::Value;
use tracing::{debug, warn};

use crate::connection::{Connection, DatabaseConnection};
use crate::error::{SdkError, SdkResult};
use crate::views;

/// Connection to the `samples` database of sample run documents.
#[derive(Debug)]
pub struct SampleRunMetricsConnection {
    conn: Connection,
    name_fc: IndexSnapshot,
    name_proj: IndexSnapshot,
}

impl SampleRunMetricsConnection {
    pub fn open(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> SdkResult<Self> {
        let snapshot = |view: &str| {
            store.index(view).map_err(|source| SdkError::Connection {
                database: store.name().to_string(),
                source,
            })
        };
        let name_fc = snapshot(views::NAME_FLOWCELL)?;
        let name_proj = snapshot(views::NAME_PROJECT)?;
        Ok(Self {
            conn: Connection::open(store, clock, views::NAMES, None)?,
            name_fc,
            name_proj,
        })
    }

    /// Ids of the sample runs on flowcell `fc_id` and/or of project
    /// `sample_prj`.
    ///
    /// With both filters the result is their intersection, and empty (with
    /// a warning) if either filter matches nothing. With one filter it is
    /// that filter's matches; with none it is empty.
    pub fn get_sample_ids(&self, fc_id: Option<&str>, sample_prj: Option<&str>) -> Vec<DocumentId> {
        let _entered = self.conn.span().enter();
        debug!(?fc_id, ?sample_prj, "retrieving sample ids");
        let fc_ids = fc_id.map(|fc| matching_ids(&self.name_fc, fc)).unwrap_or_default();
        let prj_ids = sample_prj
            .map(|prj| matching_ids(&self.name_proj, prj))
            .unwrap_or_default();

        let sample_ids = match (fc_id, sample_prj) {
            (Some(fc), Some(prj)) if fc_ids.is_empty() => {
                warn!("no such flowcell '{fc}' for project '{prj}'");
                Vec::new()
            }
            (Some(fc), Some(prj)) if prj_ids.is_empty() => {
                warn!("no such project '{prj}' for flowcell '{fc}'");
                Vec::new()
            }
            (Some(_), Some(_)) => fc_ids
                .iter()
                .filter(|id| prj_ids.contains(id))
                .cloned()
                .collect(),
            _ => {
                let mut ids = fc_ids.clone();
                for id in &prj_ids {
                    if !ids.contains(id) {
                        ids.push(id.clone());
                    }
                }
                ids
            }
        };
        debug!(
            samples = sample_ids.len(),
            fc_samples = fc_ids.len(),
            project_samples = prj_ids.len(),
            "retrieved sample ids"
        );
        sample_ids
    }

    /// The sample run documents selected by [`Self::get_sample_ids`].
    pub fn get_samples(&self, fc_id: Option<&str>, sample_prj: Option<&str>) -> SdkResult<Vec<Document>> {
        let mut samples = Vec::new();
        for id in self.get_sample_ids(fc_id, sample_prj) {
            if let Some(doc) = self.conn.get_by_id(&id)? {
                samples.push(doc);
            }
        }
        Ok(samples)
    }

    /// Sample runs whose `project_sample_name` is `prj_sample_name`.
    pub fn get_project_sample(
        &self,
        prj_sample_name: &str,
        sample_prj: Option<&str>,
        fc_id: Option<&str>,
    ) -> SdkResult<Vec<Document>> {
        Ok(self
            .get_samples(fc_id, sample_prj)?
            .into_iter()
            .filter(|doc| doc.get_str("project_sample_name") == Some(prj_sample_name))
            .collect())
    }
}

impl DatabaseConnection for SampleRunMetricsConnection {
    fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn matching_ids(view: &IndexSnapshot, wanted: &str) -> Vec<DocumentId> {
    let mut ids: Vec<DocumentId> = Vec::new();
    for row in view.iter() {
        if row.value == Value::from(wanted) && !ids.contains(&row.id) {
            ids.push(row.id.clone());
        }
    }
    ids
}
