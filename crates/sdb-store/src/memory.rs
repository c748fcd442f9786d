use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use indexmap::IndexMap;
use sdb_types::{Document, DocumentId, Revision};
use serde_json::Value;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::index::{IndexRow, IndexSnapshot};
use crate::traits::DocumentStore;

/// A view map function: emits `(key, value)` rows for one document.
pub type ViewFn = Arc<dyn Fn(&Document) -> Vec<(String, Value)> + Send + Sync>;

/// In-memory document store.
///
/// Intended for tests, embedding, and working from JSON dumps. Documents are
/// kept in insertion order behind a `RwLock`; views are plain map functions
/// evaluated over every document when a snapshot is requested.
pub struct InMemoryDocumentStore {
    name: String,
    documents: RwLock<IndexMap<DocumentId, Document>>,
    views: RwLock<HashMap<String, ViewFn>>,
    writes: AtomicUsize,
}

impl InMemoryDocumentStore {
    /// Create an empty database called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: RwLock::new(IndexMap::new()),
            views: RwLock::new(HashMap::new()),
            writes: AtomicUsize::new(0),
        }
    }

    /// Register (or replace) a view.
    pub fn register_view<F>(&self, view: impl Into<String>, map: F)
    where
        F: Fn(&Document) -> Vec<(String, Value)> + Send + Sync + 'static,
    {
        self.views
            .write()
            .expect("lock poisoned")
            .insert(view.into(), Arc::new(map));
    }

    /// Import documents as-is, bypassing revision checks. Documents without
    /// a revision get a first-generation one. Imports do not count as writes.
    pub fn load_documents(&self, documents: impl IntoIterator<Item = Document>) -> StoreResult<()> {
        let mut map = self.documents.write().expect("lock poisoned");
        for mut doc in documents {
            if doc.revision.is_none() {
                doc.revision = Some(Revision::next(None)?);
            }
            map.insert(doc.id.clone(), doc);
        }
        Ok(())
    }

    /// All documents in insertion order.
    pub fn documents(&self) -> Vec<Document> {
        self.documents
            .read()
            .expect("lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    /// Remove a document. Returns `true` if it existed.
    pub fn delete(&self, id: &DocumentId) -> bool {
        self.documents
            .write()
            .expect("lock poisoned")
            .shift_remove(id)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.documents.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().expect("lock poisoned").is_empty()
    }

    /// Number of accepted `save` calls since creation.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, id: &DocumentId) -> StoreResult<Option<Document>> {
        let map = self.documents.read().expect("lock poisoned");
        Ok(map.get(id).cloned())
    }

    fn save(&self, document: &Document) -> StoreResult<Revision> {
        let mut map = self.documents.write().expect("lock poisoned");
        let stored_rev = map.get(&document.id).and_then(|d| d.revision.clone());
        if map.contains_key(&document.id) && stored_rev != document.revision {
            return Err(StoreError::RevisionConflict {
                id: document.id.clone(),
                expected: stored_rev,
                actual: document.revision.clone(),
            });
        }

        let revision = Revision::next(stored_rev.as_ref())?;
        let mut stored = document.clone();
        stored.revision = Some(revision.clone());
        map.insert(stored.id.clone(), stored);
        self.writes.fetch_add(1, Ordering::SeqCst);
        debug!(db = %self.name, id = %document.id, rev = %revision, "document saved");
        Ok(revision)
    }

    fn index(&self, view: &str) -> StoreResult<IndexSnapshot> {
        let map_fn = self
            .views
            .read()
            .expect("lock poisoned")
            .get(view)
            .cloned()
            .ok_or_else(|| StoreError::ViewNotFound {
                database: self.name.clone(),
                view: view.to_string(),
            })?;

        let docs = self.documents.read().expect("lock poisoned");
        let mut rows: Vec<IndexRow> = docs
            .values()
            .flat_map(|doc| {
                map_fn(doc).into_iter().map(move |(key, value)| IndexRow {
                    key,
                    id: doc.id.clone(),
                    value,
                })
            })
            .collect();
        rows.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(IndexSnapshot::from_rows(view, rows))
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new("default")
    }
}

impl std::fmt::Debug for InMemoryDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDocumentStore")
            .field("name", &self.name)
            .field("document_count", &self.len())
            .finish()
    }
}
