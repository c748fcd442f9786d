use sdb_store::StoreError;
use sdb_types::{DocumentId, TypeError};

/// Errors raised while reconciling a document with the store.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Name-indexed reconciliation needs the candidate's `name`.
    #[error("document {id} has no name to look up")]
    MissingName { id: DocumentId },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Document(#[from] TypeError),
}

impl ReconcileError {
    /// Returns `true` if the store rejected the write as stale.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Store(StoreError::RevisionConflict { .. }))
    }
}

/// Convenience alias for reconciliation results.
pub type ReconcileResult<T> = Result<T, ReconcileError>;
