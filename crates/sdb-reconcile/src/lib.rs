//! Conditional upsert for StatusDB.
//!
//! A caller assembles a fresh document and hands it to the [`Reconciler`],
//! which compares it with what the store holds and writes only when the
//! content actually changed. Two entry points exist:
//!
//! - [`Reconciler::reconcile_by_name`] / [`Reconciler::persist_by_name`]
//!   find the stored document through a name index and merge the candidate
//!   over it.
//! - [`Reconciler::save`] / [`Reconciler::save_with`] find the stored
//!   document by id and compare strictly.
//!
//! Neither path is transactional. A concurrent writer surfaces as
//! [`sdb_store::StoreError::RevisionConflict`], which is returned as is.

pub mod error;
pub mod outcome;
pub mod reconciler;

pub use error::{ReconcileError, ReconcileResult};
pub use outcome::{Reconciliation, SaveStatus};
pub use reconciler::Reconciler;
