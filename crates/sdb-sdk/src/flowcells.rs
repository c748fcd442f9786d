use std::sync::Arc;

use indexmap::IndexMap;
use sdb_reconcile::SaveStatus;
use sdb_store::{DocumentStore, IndexSnapshot};
use sdb_types::{Clock, DocumentId};
use serde_json::Value;
use tracing::{error, info};

use crate::connection::{path, value_text, Connection, DatabaseConnection};
use crate::error::{SdkError, SdkResult};
use crate::views;

/// Demultiplexing quality of one sample on one lane.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BarcodeLaneStatistics {
    /// `Mean Quality Score (PF)`
    pub mean_quality_score: Option<String>,
    /// `% of >= Q30 Bases (PF)`
    pub q30_bases_percent: Option<String>,
}

/// Connection to the `flowcells` database of run documents.
#[derive(Debug)]
pub struct FlowcellRunMetricsConnection {
    conn: Connection,
    storage_status: IndexSnapshot,
    lane_stats: IndexSnapshot,
}

impl FlowcellRunMetricsConnection {
    pub fn open(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> SdkResult<Self> {
        let snapshot = |view: &str| {
            store.index(view).map_err(|source| SdkError::Connection {
                database: store.name().to_string(),
                source,
            })
        };
        let storage_status = snapshot(views::STORAGE_STATUS)?;
        let lane_stats = snapshot(views::BARCODE_LANE_STATS)?;
        Ok(Self {
            conn: Connection::open(store, clock, views::NAMES, Some(views::RUN_ID))?,
            storage_status,
            lane_stats,
        })
    }

    /// Demultiplexing statistics of `sample_id` of project `project_id` on
    /// `lane` of `flowcell`.
    ///
    /// Rows are keyed `{Project}-{Sample ID}-{Lane}`, with `__` in the
    /// project name read as `.` (`J__Doe_00_01` is `J.Doe_00_01`).
    pub fn get_barcode_lane_statistics(
        &self,
        project_id: &str,
        sample_id: &str,
        flowcell: &str,
        lane: &str,
    ) -> Option<BarcodeLaneStatistics> {
        let rows = self.lane_stats.value_of(flowcell)?.as_array()?;
        let wanted = format!("{project_id}-{sample_id}-{lane}");
        let row = rows.iter().find(|row| {
            let field = |key: &str| row.get(key).and_then(value_text).unwrap_or_default();
            let project = field("Project").replace("__", ".");
            format!("{project}-{}-{}", field("Sample ID"), field("Lane")) == wanted
        })?;
        Some(BarcodeLaneStatistics {
            mean_quality_score: row.get("Mean Quality Score (PF)").and_then(value_text),
            q30_bases_percent: row.get("% of >= Q30 Bases (PF)").and_then(value_text),
        })
    }

    /// Mean PhiX error rate of the non-index reads on `lane`, or `-1.0` if
    /// it cannot be determined.
    ///
    /// Reads the `illumina.Summary` layout first and falls back to the
    /// `illumina.run_summary` layout. Only positive rates count.
    pub fn get_phix_error_rate(&self, name: &str, lane: &str) -> SdkResult<f64> {
        let Some(run) = self.conn.get_entry(name)? else {
            return Ok(-1.0);
        };
        let illumina = run.get("illumina").cloned().unwrap_or(Value::Null);

        let mut rates: Vec<f64> = Vec::new();
        if let Some(summary) = illumina.get("Summary").and_then(Value::as_object) {
            for read in summary.values() {
                let read_type = read.get("ReadType").and_then(Value::as_str).unwrap_or("");
                if read_type.trim() == "(Index)" {
                    continue;
                }
                let rate = path(read, &[lane, "ErrRatePhiX"])
                    .and_then(number)
                    .unwrap_or(-1.0);
                if rate > 0.0 {
                    rates.push(rate);
                }
            }
        }

        if rates.is_empty() {
            if let Some(data) = path(&illumina, &["run_summary", lane]).and_then(Value::as_object) {
                rates = data
                    .iter()
                    .filter(|(key, _)| key.starts_with("% Error Rate"))
                    .filter_map(|(_, value)| number(value))
                    .filter(|rate| *rate > 0.0)
                    .collect();
            }
        }

        if rates.is_empty() {
            return Ok(-1.0);
        }
        Ok(rates.iter().sum::<f64>() / rates.len() as f64)
    }

    /// `RunInfo.Instrument`, or the scanner id from the run parameters.
    pub fn get_instrument(&self, name: &str) -> SdkResult<Option<String>> {
        let Some(run) = self.conn.get_entry(name)? else {
            return Ok(None);
        };
        let value = Value::Object(run.fields);
        let instrument = path(&value, &["RunInfo", "Instrument"])
            .and_then(value_text)
            .or_else(|| path(&value, &["RunParameters", "Setup", "ScannerID"]).and_then(value_text));
        Ok(instrument)
    }

    pub fn get_run_mode(&self, name: &str) -> SdkResult<Option<String>> {
        let Some(run) = self.conn.get_entry(name)? else {
            return Ok(None);
        };
        let value = Value::Object(run.fields);
        Ok(path(&value, &["RunParameters", "Setup", "RunMode"]).and_then(value_text))
    }

    /// `true` when the run has exactly two non-index reads.
    pub fn is_paired_end(&self, name: &str) -> SdkResult<Option<bool>> {
        let Some(run) = self.conn.get_entry(name)? else {
            return Ok(None);
        };
        let reads = run
            .get("RunInfo")
            .and_then(|info| info.get("Reads"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let data_reads = reads
            .iter()
            .filter(|read| read.get("IsIndexedRead").and_then(Value::as_str).unwrap_or("N") == "N")
            .count();
        Ok(Some(data_reads == 2))
    }

    /// Runs whose storage status is `status`, with their view values.
    pub fn get_storage_status(&self, status: &str) -> IndexMap<String, Value> {
        let _entered = self.conn.span().enter();
        info!("fetching all flowcells with storage status \"{status}\"");
        self.storage_status
            .iter()
            .filter(|row| row.value.get("storage_status").and_then(Value::as_str) == Some(status))
            .map(|row| (row.key.clone(), row.value.clone()))
            .collect()
    }

    /// Set the storage status of the run with id `doc_id` and save it.
    ///
    /// Returns `None` (and logs an error) if there is no such run.
    pub fn set_storage_status(&self, doc_id: &DocumentId, status: &str) -> SdkResult<Option<SaveStatus>> {
        let Some(mut run) = self.conn.store().get(doc_id)? else {
            let _entered = self.conn.span().enter();
            error!("document with id {doc_id} not found, could not update the storage status");
            return Ok(None);
        };
        {
            let _entered = self.conn.span().enter();
            let run_id = run
                .get("RunInfo")
                .and_then(|info| info.get("Id"))
                .and_then(value_text)
                .unwrap_or_default();
            let previous = run.get("storage_status").and_then(value_text).unwrap_or_default();
            info!("updating storage status of run {run_id} from {previous} to {status}");
        }
        run.set("storage_status", Value::from(status));
        Ok(Some(self.conn.save_by_id(&mut run)?))
    }
}

impl DatabaseConnection for FlowcellRunMetricsConnection {
    fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// A metric stored as a number or as text.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
