use indexmap::IndexMap;
use sdb_types::DocumentId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row of a view: the emitted key, the emitting document, and the
/// emitted value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexRow {
    pub key: String,
    pub id: DocumentId,
    pub value: Value,
}

/// Read-only snapshot of a view, keyed by row key.
///
/// Built once (typically when a connection is opened) and never refreshed.
/// When a view emits the same key twice the later row wins, keeping the
/// position of the first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndexSnapshot {
    view: String,
    rows: IndexMap<String, IndexRow>,
}

impl IndexSnapshot {
    /// Build a snapshot from rows in view order.
    pub fn from_rows(view: impl Into<String>, rows: impl IntoIterator<Item = IndexRow>) -> Self {
        let mut map = IndexMap::new();
        for row in rows {
            map.insert(row.key.clone(), row);
        }
        Self {
            view: view.into(),
            rows: map,
        }
    }

    /// Name of the view this snapshot was taken from.
    pub fn view(&self) -> &str {
        &self.view
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.rows.contains_key(key)
    }

    pub fn row(&self, key: &str) -> Option<&IndexRow> {
        self.rows.get(key)
    }

    /// Id of the document that emitted `key`.
    pub fn id_of(&self, key: &str) -> Option<&DocumentId> {
        self.rows.get(key).map(|row| &row.id)
    }

    /// Value emitted for `key`.
    pub fn value_of(&self, key: &str) -> Option<&Value> {
        self.rows.get(key).map(|row| &row.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexRow> {
        self.rows.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }
}
