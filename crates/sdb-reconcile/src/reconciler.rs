use std::sync::Arc;

use sdb_diff::{comp_obj, diff_documents, documents_equal, merge_documents};
use sdb_store::{DocumentStore, IndexSnapshot};
use sdb_types::{Clock, Document};
use tracing::{debug, info, info_span, warn, Span};

use crate::error::{ReconcileError, ReconcileResult};
use crate::outcome::{Reconciliation, SaveStatus};

/// Decides whether a candidate document needs writing, and writes it.
///
/// Every call performs at most one store write. Time stamps come from the
/// injected [`Clock`].
pub struct Reconciler {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    span: Span,
}

impl Reconciler {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            span: info_span!("reconciler"),
        }
    }

    /// Log under `span` instead of the default `reconciler` span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// The store this reconciler writes to.
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Decide what to do with `candidate`, looking it up by name in `index`.
    ///
    /// Does not write. An unknown name, or a name whose document has
    /// vanished from the store, yields [`Reconciliation::Insert`] with
    /// `creation_time` stamped. Equal content yields
    /// [`Reconciliation::Unchanged`]. Otherwise the candidate is merged over
    /// the stored document, its values winning, and keeps the stored id,
    /// revision and creation time.
    pub fn reconcile_by_name(
        &self,
        mut candidate: Document,
        index: &IndexSnapshot,
    ) -> ReconcileResult<Reconciliation> {
        let _entered = self.span.enter();
        let name = candidate
            .name
            .clone()
            .ok_or_else(|| ReconcileError::MissingName {
                id: candidate.id.clone(),
            })?;
        let now = self.clock.now();

        let Some(id) = index.id_of(&name) else {
            candidate.creation_time = Some(now);
            return Ok(Reconciliation::Insert {
                document: candidate,
                stale_id: None,
            });
        };

        let Some(existing) = self.store.get(id)? else {
            warn!(name = %name, id = %id, db = self.store.name(), "name index points at a missing document");
            candidate.creation_time = Some(now);
            return Ok(Reconciliation::Insert {
                document: candidate,
                stale_id: Some(id.clone()),
            });
        };

        if documents_equal(&candidate, &existing) {
            return Ok(Reconciliation::Unchanged {
                existing_id: existing.id,
            });
        }

        let changed = diff_documents(&existing, &candidate);
        debug!(name = %name, changed = ?changed.keys(), "content changed");

        let mut merged = merge_documents(&existing, &candidate)?;
        merged.creation_time = existing.creation_time.clone();
        merged.modification_time = Some(now);
        merged.revision = existing.revision.clone();
        merged.id = existing.id.clone();
        Ok(Reconciliation::Update {
            document: merged,
            existing_id: existing.id,
        })
    }

    /// Reconcile `candidate` by name and write it when needed.
    ///
    /// The returned outcome carries the written document with its new
    /// revision.
    pub fn persist_by_name(
        &self,
        candidate: Document,
        index: &IndexSnapshot,
    ) -> ReconcileResult<Reconciliation> {
        let mut outcome = self.reconcile_by_name(candidate, index)?;
        let _entered = self.span.enter();
        match &mut outcome {
            Reconciliation::Insert { document, .. } | Reconciliation::Update { document, .. } => {
                let revision = self.store.save(document)?;
                info!(document = %document, id = %document.id, rev = %revision, "saved document");
                document.revision = Some(revision);
            }
            Reconciliation::Unchanged { existing_id } => {
                info!(id = %existing_id, "document present and not in need of updating");
            }
        }
        Ok(outcome)
    }

    /// Identity-indexed save with time stamping.
    pub fn save(&self, candidate: &mut Document) -> ReconcileResult<SaveStatus> {
        self.save_with(candidate, true)
    }

    /// Save `candidate` under its own id if it differs from the stored copy.
    ///
    /// `candidate` is updated in place: it takes the stored revision (and
    /// the new one after a write), the stored creation time when
    /// `add_time_log` is set, and for `project_summary` documents the
    /// `doc_not_found` correction.
    pub fn save_with(
        &self,
        candidate: &mut Document,
        add_time_log: bool,
    ) -> ReconcileResult<SaveStatus> {
        let _entered = self.span.enter();
        let now = self.clock.now();

        let Some(mut existing) = self.store.get(&candidate.id)? else {
            if add_time_log {
                candidate.creation_time = Some(now.clone());
                candidate.modification_time = Some(now);
            }
            candidate.revision = Some(self.store.save(candidate)?);
            info!(document = %candidate, id = %candidate.id, "created document");
            return Ok(SaveStatus::Created);
        };

        candidate.revision = existing.revision.clone();
        if add_time_log {
            candidate.modification_time = Some(now.clone());
            existing.modification_time = Some(now);
            candidate.creation_time = existing.creation_time.clone();
        }

        if comp_obj(candidate, &existing)? {
            debug!(id = %candidate.id, "document not updated");
            return Ok(SaveStatus::NotUpdated);
        }

        candidate.revision = Some(self.store.save(candidate)?);
        info!(document = %candidate, id = %candidate.id, "updated document");
        Ok(SaveStatus::Updated)
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("db", &self.store.name())
            .finish_non_exhaustive()
    }
}
