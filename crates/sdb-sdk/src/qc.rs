//! Quality-control summaries over sample runs and projects.

use indexmap::IndexMap;
use sdb_types::Document;
use serde::Serialize;
use serde_json::Value;

use crate::connection::{path, value_text, DatabaseConnection};
use crate::error::SdkResult;
use crate::projects::ProjectSummaryConnection;
use crate::samples::SampleRunMetricsConnection;

/// Mean FastQC quality of a sample run, weighting each quality value by
/// its read count and rounding to one decimal.
///
/// Returns `None` when the `Per sequence quality scores` table is missing
/// or unreadable, or holds no reads.
pub fn calc_avg_qv(sample_run: &Document) -> Option<f64> {
    let table = path(sample_run.get("fastqc")?, &["stats", "Per sequence quality scores"])?;
    let counts = table.get("Count")?.as_array()?;
    let qualities = table.get("Quality")?.as_array()?;

    let mut weighted = 0.0;
    let mut total = 0.0;
    for (count, quality) in counts.iter().zip(qualities) {
        let count = float(count)?;
        let quality = integer(quality)? as f64;
        weighted += count * quality;
        total += count;
    }
    if total == 0.0 {
        return None;
    }
    Some((weighted / total * 10.0).round() / 10.0)
}

/// QC figures of one sample run. Percentages are scaled to 0-100; metrics
/// the run lacks are `None`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct QcRecord {
    pub sample: Option<String>,
    pub project: Option<String>,
    pub lane: Option<String>,
    pub flowcell: Option<String>,
    pub date: Option<String>,
    pub application: Option<String>,
    #[serde(rename = "TOTAL_READS")]
    pub total_reads: Option<i64>,
    #[serde(rename = "PERCENT_DUPLICATION")]
    pub percent_duplication: Option<f64>,
    #[serde(rename = "MEAN_INSERT_SIZE")]
    pub mean_insert_size: Option<f64>,
    #[serde(rename = "GENOME_SIZE")]
    pub genome_size: Option<i64>,
    #[serde(rename = "FOLD_ENRICHMENT")]
    pub fold_enrichment: Option<f64>,
    #[serde(rename = "PCT_USABLE_BASES_ON_TARGET")]
    pub pct_usable_bases_on_target: Option<f64>,
    #[serde(rename = "PCT_TARGET_BASES_10X")]
    pub pct_target_bases_10x: Option<f64>,
    #[serde(rename = "PCT_PF_READS_ALIGNED")]
    pub pct_pf_reads_aligned: Option<f64>,
    #[serde(rename = "PERCENT_ON_TARGET", skip_serializing_if = "Option::is_none")]
    pub percent_on_target: Option<f64>,
}

impl QcRecord {
    /// Extract the figures of `sample_run` (`picard_metrics` sections
    /// `AL_PAIR`, `DUP_metrics`, `INS_metrics` and `HS_metrics`).
    pub fn from_sample_run(sample_run: &Document, application: Option<String>) -> Self {
        let picard = sample_run.get("picard_metrics").cloned().unwrap_or(Value::Null);
        let metric = |section: &str, key: &str| path(&picard, &[section, key]);
        let percent = |section: &str, key: &str| metric(section, key).and_then(float).map(|v| v * 100.0);

        let genome_size = metric("HS_metrics", "GENOME_SIZE").and_then(integer);
        let fold_enrichment = metric("HS_metrics", "FOLD_ENRICHMENT").and_then(float);
        let target_territory = metric("HS_metrics", "TARGET_TERRITORY").and_then(float);
        let percent_on_target = match (fold_enrichment, genome_size, target_territory) {
            (Some(fold), Some(genome), Some(territory))
                if fold != 0.0 && genome != 0 && territory != 0.0 =>
            {
                Some(fold / (genome as f64 / territory) * 100.0)
            }
            _ => None,
        };

        let text = |key: &str| sample_run.get(key).and_then(value_text);
        Self {
            sample: text("barcode_name"),
            project: text("sample_prj"),
            lane: text("lane"),
            flowcell: text("flowcell"),
            date: text("date"),
            application,
            total_reads: metric("AL_PAIR", "TOTAL_READS").and_then(integer),
            percent_duplication: percent("DUP_metrics", "PERCENT_DUPLICATION"),
            mean_insert_size: metric("INS_metrics", "MEAN_INSERT_SIZE").and_then(float),
            genome_size,
            fold_enrichment,
            pct_usable_bases_on_target: percent("HS_metrics", "PCT_USABLE_BASES_ON_TARGET"),
            pct_target_bases_10x: percent("HS_metrics", "PCT_TARGET_BASES_10X"),
            pct_pf_reads_aligned: percent("AL_PAIR", "PCT_PF_READS_ALIGNED"),
            percent_on_target,
        }
    }
}

/// QC records of the sample runs of `project`, optionally only those on
/// flowcell `fc_id`, keyed by sample run name.
pub fn get_qc_data(
    project: &str,
    p_con: &ProjectSummaryConnection,
    s_con: &SampleRunMetricsConnection,
    fc_id: Option<&str>,
) -> SdkResult<IndexMap<String, QcRecord>> {
    let application = p_con
        .get_field(project, "application")?
        .as_ref()
        .and_then(value_text);
    let mut records = IndexMap::new();
    for sample_run in s_con.get_samples(fc_id, Some(project))? {
        let Some(name) = sample_run.name.clone() else {
            continue;
        };
        records.insert(name, QcRecord::from_sample_run(&sample_run, application.clone()));
    }
    Ok(records)
}

/// How one barcode name of a project is known in-house and by the
/// customer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SampleNames {
    pub scilife_name: String,
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode_seq: Option<String>,
}

/// In-house and customer names for every barcode name run in `project`,
/// optionally with the barcode sequence.
///
/// Barcodes that match no project sample keep their barcode name as
/// in-house name and have no customer name.
pub fn get_scilife_to_customer_name(
    project: &str,
    p_con: &ProjectSummaryConnection,
    s_con: &SampleRunMetricsConnection,
    barcode_seq: bool,
) -> SdkResult<IndexMap<String, SampleNames>> {
    let mut names = IndexMap::new();
    for sample_run in s_con.get_samples(None, Some(project))? {
        let Some(barcode_name) = sample_run.get_str("barcode_name") else {
            continue;
        };
        let matched = p_con.get_project_sample(project, Some(barcode_name), false)?;
        let sample = matched.map(|m| m.project_sample);
        let entry = SampleNames {
            scilife_name: sample
                .as_ref()
                .and_then(|s| s.scilife_name.clone())
                .unwrap_or_else(|| barcode_name.to_string()),
            customer_name: sample.and_then(|s| s.customer_name),
            barcode_seq: barcode_seq
                .then(|| sample_run.get("sequence").and_then(value_text))
                .flatten(),
        };
        names.insert(barcode_name.to_string(), entry);
    }
    Ok(names)
}

/// A metric stored as a number or as text, decimal commas allowed.
fn float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
