use std::fmt;

use sdb_types::{Document, DocumentId};
use serde::Serialize;

/// What a name-indexed reconciliation decided.
///
/// Serializes with an `outcome` tag (`insert`, `unchanged`, `update`).
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Reconciliation {
    /// Nothing stored under the name: write the candidate as a new document.
    Insert {
        document: Document,
        /// Id the name index pointed at although the store no longer holds
        /// it. Reported for logging only.
        #[serde(skip_serializing_if = "Option::is_none")]
        stale_id: Option<DocumentId>,
    },
    /// The stored document already has this content; do not write.
    Unchanged { existing_id: DocumentId },
    /// Write the candidate merged over the stored document.
    Update {
        document: Document,
        existing_id: DocumentId,
    },
}

impl Reconciliation {
    /// Returns `true` unless the outcome is [`Reconciliation::Unchanged`].
    pub fn needs_write(&self) -> bool {
        !matches!(self, Self::Unchanged { .. })
    }

    /// The document to write, if any.
    pub fn document(&self) -> Option<&Document> {
        match self {
            Self::Insert { document, .. } | Self::Update { document, .. } => Some(document),
            Self::Unchanged { .. } => None,
        }
    }
}

/// Result of an identity-indexed save.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
    Created,
    Updated,
    NotUpdated,
}

impl SaveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::NotUpdated => "not updated",
        }
    }

    /// Returns `true` if the store was written.
    pub fn wrote(self) -> bool {
        !matches!(self, Self::NotUpdated)
    }
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
