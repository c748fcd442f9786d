use sdb_types::{Document, DocumentId, Revision};

use crate::error::StoreResult;
use crate::index::IndexSnapshot;

/// A database of open-schema documents.
///
/// All implementations must satisfy these invariants:
/// - `save` checks the supplied `_rev` against the stored one and rejects
///   stale writes with `RevisionConflict`; it never retries.
/// - Every accepted `save` assigns a fresh revision and returns it.
/// - `index` computes a snapshot of a view at call time; later writes are
///   not reflected in it.
pub trait DocumentStore: Send + Sync {
    /// Name of the database, for logs.
    fn name(&self) -> &str;

    /// Read a document by id.
    ///
    /// Returns `Ok(None)` if the document does not exist.
    fn get(&self, id: &DocumentId) -> StoreResult<Option<Document>>;

    /// Create or update a document and return its new revision.
    fn save(&self, document: &Document) -> StoreResult<Revision>;

    /// Snapshot the rows of a named view, ordered by key.
    fn index(&self, view: &str) -> StoreResult<IndexSnapshot>;
}
