use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("could not open database '{database}': {source}")]
    Connection {
        database: String,
        #[source]
        source: sdb_store::StoreError,
    },

    #[error("unknown database: {0}")]
    UnknownDatabase(String),

    #[error("could not read dump {path}: {source}")]
    DumpIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dump: {0}")]
    Dump(String),

    #[error("store error: {0}")]
    Store(#[from] sdb_store::StoreError),

    #[error("reconcile error: {0}")]
    Reconcile(#[from] sdb_reconcile::ReconcileError),

    #[error("match error: {0}")]
    Match(#[from] sdb_match::MatchError),

    #[error("document error: {0}")]
    Document(#[from] sdb_types::TypeError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SdkResult<T> = Result<T, SdkError>;
