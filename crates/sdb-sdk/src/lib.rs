//! High-level StatusDB client.
//!
//! Ties configuration, the per-database connections, the reconciler and
//! the barcode name matcher together. This is the main entry point for
//! applications embedding StatusDB.
//!
//! ```
//! use std::sync::Arc;
//!
//! use sdb_gate::{AutoAccept, ConfirmationGate, GateConfig};
//! use sdb_sdk::{documents, DatabaseConnection, Server};
//! use sdb_types::{FixedClock, Timestamp};
//! use serde_json::{json, Map};
//!
//! let gate = ConfirmationGate::new(Arc::new(AutoAccept), GateConfig::default());
//! let server = Server::new(Arc::new(FixedClock::new("2024-01-01T00:00:00.000000Z")), Arc::new(gate));
//!
//! let mut fields = Map::new();
//! fields.insert("name".into(), json!("J.Doe_13_01"));
//! let doc = documents::analysis(&fields, &Timestamp::now()).unwrap();
//!
//! let analysis = server.analysis().unwrap();
//! assert!(analysis.save(doc.clone()).unwrap().needs_write());
//!
//! // A fresh connection sees the document and skips the unchanged write.
//! let analysis = server.analysis().unwrap();
//! assert!(!analysis.save(doc).unwrap().needs_write());
//! ```

pub mod config;
pub mod connection;
pub mod documents;
pub mod error;
pub mod flowcells;
pub mod projects;
pub mod qc;
pub mod samples;
pub mod server;
pub mod views;

pub use config::{ConfigError, ConnectionOverrides, ConnectionSettings, MatchingConfig, StatusDbConfig};
pub use connection::{Connection, DatabaseConnection};
pub use error::{SdkError, SdkResult};
pub use flowcells::{BarcodeLaneStatistics, FlowcellRunMetricsConnection};
pub use projects::{sample_run_metrics, AnalysisConnection, LatestLibraryPreps, ProjectSummaryConnection};
pub use qc::{calc_avg_qv, get_qc_data, get_scilife_to_customer_name, QcRecord, SampleNames};
pub use samples::SampleRunMetricsConnection;
pub use server::Server;
pub use views::Database;

// Re-export key types
pub use sdb_match::{MatchOptions, MatchResult};
pub use sdb_reconcile::{Reconciliation, SaveStatus};
pub use sdb_types::{Document, DocumentId, EntityType, ProjectSample, ProjectSamples, Timestamp};
