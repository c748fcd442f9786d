//! Document comparison for StatusDB.
//!
//! Decides whether a freshly computed document differs meaningfully from the
//! stored one, and folds the two together when it does.
//!
//! # Key Items
//!
//! - [`deep_merge`] / [`merge_documents`] -- nested mapping merge, source wins
//! - [`documents_equal`] -- content equality ignoring bookkeeping fields
//! - [`comp_obj`] -- strict equality used by identity-indexed saves
//! - [`suppress_not_found_sentinels`] -- legacy `project_summary` correction
//! - [`DocumentDiff`] / [`FieldChange`] -- which content keys changed

pub mod document_diff;
pub mod equality;
pub mod merge;
pub mod sentinel;

pub use document_diff::{diff_documents, DocumentDiff, FieldChange};
pub use equality::{comp_obj, documents_equal};
pub use merge::{deep_merge, merge_documents};
pub use sentinel::{suppress_not_found_sentinels, DOC_NOT_FOUND};
