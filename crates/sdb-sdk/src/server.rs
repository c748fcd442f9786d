use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use sdb_gate::ConfirmationGate;
use sdb_store::InMemoryDocumentStore;
use sdb_types::{Clock, Document, SystemClock};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::config::{ConnectionSettings, StatusDbConfig};
use crate::error::{SdkError, SdkResult};
use crate::flowcells::FlowcellRunMetricsConnection;
use crate::projects::{AnalysisConnection, ProjectSummaryConnection};
use crate::samples::SampleRunMetricsConnection;
use crate::views::Database;

/// A StatusDB server: the standard databases, the clock used to stamp
/// writes, and the gate used to confirm relaxed name matches.
///
/// Databases are held in memory and can be loaded from and written back to
/// a JSON dump of the form `{"projects": [...], "samples": [...], ...}`.
pub struct Server {
    databases: IndexMap<Database, Arc<InMemoryDocumentStore>>,
    settings: Option<ConnectionSettings>,
    clock: Arc<dyn Clock>,
    gate: Arc<ConfirmationGate>,
}

impl Server {
    /// A server with empty databases and their views registered.
    pub fn new(clock: Arc<dyn Clock>, gate: Arc<ConfirmationGate>) -> Self {
        let databases = Database::ALL
            .into_iter()
            .map(|db| {
                let store = InMemoryDocumentStore::new(db.name());
                db.register_views(&store);
                (db, Arc::new(store))
            })
            .collect();
        Self {
            databases,
            settings: None,
            clock,
            gate,
        }
    }

    /// A server described by `config`, stamping writes with the system
    /// clock.
    pub fn from_config(config: &StatusDbConfig, gate: Arc<ConfirmationGate>) -> Self {
        let mut server = Self::new(Arc::new(SystemClock), gate);
        debug!(url = %config.connection.display_url(), "connected to server");
        server.settings = Some(config.connection.clone());
        server
    }

    pub fn settings(&self) -> Option<&ConnectionSettings> {
        self.settings.as_ref()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn gate(&self) -> &Arc<ConfirmationGate> {
        &self.gate
    }

    pub fn database(&self, db: Database) -> &Arc<InMemoryDocumentStore> {
        &self.databases[&db]
    }

    /// Look a database up by name.
    pub fn database_named(&self, name: &str) -> SdkResult<&Arc<InMemoryDocumentStore>> {
        Ok(self.database(name.parse()?))
    }

    pub fn projects(&self) -> SdkResult<ProjectSummaryConnection> {
        ProjectSummaryConnection::open(
            self.database(Database::Projects).clone(),
            self.clock.clone(),
            self.gate.clone(),
        )
    }

    pub fn samples(&self) -> SdkResult<SampleRunMetricsConnection> {
        SampleRunMetricsConnection::open(self.database(Database::Samples).clone(), self.clock.clone())
    }

    pub fn flowcells(&self) -> SdkResult<FlowcellRunMetricsConnection> {
        FlowcellRunMetricsConnection::open(
            self.database(Database::Flowcells).clone(),
            self.clock.clone(),
        )
    }

    pub fn analysis(&self) -> SdkResult<AnalysisConnection> {
        AnalysisConnection::open(self.database(Database::Analysis).clone(), self.clock.clone())
    }

    /// Import a JSON dump. Databases absent from the dump are left as they
    /// are.
    pub fn load_dump(&self, path: &Path) -> SdkResult<()> {
        let text = std::fs::read_to_string(path).map_err(|source| SdkError::DumpIo {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_dump_str(&text)?;
        info!(path = %path.display(), "loaded dump");
        Ok(())
    }

    pub fn load_dump_str(&self, text: &str) -> SdkResult<()> {
        let Value::Object(dump) = serde_json::from_str::<Value>(text)? else {
            return Err(SdkError::Dump("top level must be an object".into()));
        };
        for (name, documents) in dump {
            let store = self.database_named(&name)?;
            let Value::Array(documents) = documents else {
                return Err(SdkError::Dump(format!("'{name}' must be a list of documents")));
            };
            let documents = documents
                .into_iter()
                .map(Document::from_value)
                .collect::<Result<Vec<_>, _>>()?;
            debug!(db = %name, count = documents.len(), "importing documents");
            store.load_documents(documents)?;
        }
        Ok(())
    }

    /// The databases as a JSON dump.
    pub fn dump(&self) -> SdkResult<Value> {
        let mut dump = Map::new();
        for (db, store) in &self.databases {
            let documents = store
                .documents()
                .iter()
                .map(|doc| doc.to_map().map(Value::Object))
                .collect::<Result<Vec<_>, _>>()?;
            dump.insert(db.name().to_string(), Value::Array(documents));
        }
        Ok(Value::Object(dump))
    }

    /// Write the databases to `path` as a JSON dump.
    pub fn write_dump(&self, path: &Path) -> SdkResult<()> {
        let text = serde_json::to_string_pretty(&self.dump()?)?;
        std::fs::write(path, text).map_err(|source| SdkError::DumpIo {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "wrote dump");
        Ok(())
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("settings", &self.settings)
            .field("databases", &self.databases.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
