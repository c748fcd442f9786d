use sdb_types::{DocumentId, Revision, TypeError};

/// Errors from document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The write carried a revision other than the stored one.
    #[error("revision conflict for {id}: stored {expected:?}, supplied {actual:?}")]
    RevisionConflict {
        id: DocumentId,
        expected: Option<Revision>,
        actual: Option<Revision>,
    },

    /// No view with this name is registered on the database.
    #[error("view '{view}' not found in database '{database}'")]
    ViewNotFound { database: String, view: String },

    /// A document could not be converted to or from its stored form.
    #[error("document error: {0}")]
    Document(#[from] TypeError),

    /// The storage backend failed.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
