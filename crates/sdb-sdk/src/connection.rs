use std::sync::Arc;

use sdb_reconcile::{Reconciler, Reconciliation, SaveStatus};
use sdb_store::{DocumentStore, IndexSnapshot};
use sdb_types::{Clock, Document, DocumentId};
use serde_json::Value;
use tracing::{debug, info_span, warn, Span};

use crate::error::{SdkError, SdkResult};
use crate::views;

/// A session on one database.
///
/// The index snapshots are taken once, when the connection is opened, and
/// never refreshed: documents written through the connection are not seen
/// by later lookups until a new connection is opened.
pub struct Connection {
    store: Arc<dyn DocumentStore>,
    entries: IndexSnapshot,
    ids: Option<IndexSnapshot>,
    names: IndexSnapshot,
    reconciler: Reconciler,
    span: Span,
}

impl Connection {
    /// Open a connection that looks entries up through `entry_view` and,
    /// optionally, `id_view`. Saves always go through `names/name`.
    pub fn open(
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
        entry_view: &str,
        id_view: Option<&str>,
    ) -> SdkResult<Self> {
        let snapshot = |view: &str| {
            store.index(view).map_err(|source| SdkError::Connection {
                database: store.name().to_string(),
                source,
            })
        };
        let entries = snapshot(entry_view)?;
        let ids = id_view.map(snapshot).transpose()?;
        let names = snapshot(views::NAMES)?;

        let span = info_span!("connection", db = %store.name());
        let reconciler =
            Reconciler::new(store.clone(), clock).with_span(info_span!(parent: &span, "reconciler"));
        debug!(parent: &span, entries = entries.len(), "opened connection");
        Ok(Self {
            store,
            entries,
            ids,
            names,
            reconciler,
            span,
        })
    }

    pub fn database(&self) -> &str {
        self.store.name()
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// The `names/name` snapshot used by [`Connection::save`].
    pub fn names(&self) -> &IndexSnapshot {
        &self.names
    }

    /// The snapshot used by [`Connection::get_entry`].
    pub fn entries(&self) -> &IndexSnapshot {
        &self.entries
    }

    /// Fetch the document registered under `name`.
    pub fn get_entry(&self, name: &str) -> SdkResult<Option<Document>> {
        self.lookup(&self.entries, name)
    }

    /// Fetch the document registered under `key` in the id view. Returns
    /// `None` when the connection has no id view.
    pub fn get_entry_by_id_view(&self, key: &str) -> SdkResult<Option<Document>> {
        match &self.ids {
            Some(ids) => self.lookup(ids, key),
            None => {
                let _entered = self.span.enter();
                warn!("no id view on {}", self.database());
                Ok(None)
            }
        }
    }

    /// One field of the document registered under `name`.
    pub fn get_field(&self, name: &str, field: &str) -> SdkResult<Option<Value>> {
        let _entered = self.span.enter();
        debug!(name, field, "retrieving field entry");
        Ok(self.get_entry(name)?.and_then(|doc| doc.get(field).cloned()))
    }

    /// Fetch a document by id, warning when it is missing.
    pub fn get_by_id(&self, id: &DocumentId) -> SdkResult<Option<Document>> {
        let doc = self.store.get(id)?;
        if doc.is_none() {
            let _entered = self.span.enter();
            warn!(id = %id, "no document with this id in {}", self.database());
        }
        Ok(doc)
    }

    /// Save `document` if its content differs from the stored document of
    /// the same name.
    pub fn save(&self, document: Document) -> SdkResult<Reconciliation> {
        Ok(self.reconciler.persist_by_name(document, &self.names)?)
    }

    /// Save `document` under its own id if it differs from the stored copy.
    pub fn save_by_id(&self, document: &mut Document) -> SdkResult<SaveStatus> {
        Ok(self.reconciler.save(document)?)
    }

    fn lookup(&self, view: &IndexSnapshot, key: &str) -> SdkResult<Option<Document>> {
        let _entered = self.span.enter();
        debug!(key, view = view.view(), "retrieving entry");
        let Some(id) = view.id_of(key) else {
            warn!("no entry '{key}' in {}", self.database());
            return Ok(None);
        };
        let doc = self.store.get(id)?;
        if doc.is_none() {
            warn!(id = %id, "entry '{key}' points at a missing document in {}", self.database());
        }
        Ok(doc)
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("db", &self.database())
            .field("entries", &self.entries.view())
            .finish_non_exhaustive()
    }
}

/// Entry and save operations shared by every typed connection.
pub trait DatabaseConnection {
    fn connection(&self) -> &Connection;

    fn get_entry(&self, name: &str) -> SdkResult<Option<Document>> {
        self.connection().get_entry(name)
    }

    fn get_entry_by_id_view(&self, key: &str) -> SdkResult<Option<Document>> {
        self.connection().get_entry_by_id_view(key)
    }

    fn get_field(&self, name: &str, field: &str) -> SdkResult<Option<Value>> {
        self.connection().get_field(name, field)
    }

    fn save(&self, document: Document) -> SdkResult<Reconciliation> {
        self.connection().save(document)
    }

    fn save_by_id(&self, document: &mut Document) -> SdkResult<SaveStatus> {
        self.connection().save_by_id(document)
    }
}

/// Read an index value or document field as text.
pub(crate) fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Look up a dotted path of keys in nested mappings.
pub(crate) fn path<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().try_fold(value, |value, key| value.get(key))
}
