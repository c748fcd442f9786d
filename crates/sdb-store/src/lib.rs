//! Document storage for StatusDB.
//!
//! The store holds open-schema [`Document`]s keyed by [`DocumentId`] and
//! owns their revision tokens. Secondary lookups go through precomputed
//! views, materialized as read-only [`IndexSnapshot`]s.
//!
//! # Storage Backends
//!
//! All backends implement the [`DocumentStore`] trait:
//!
//! - [`InMemoryDocumentStore`] -- map-backed store with registered view
//!   functions, for tests, embedding, and JSON dumps
//!
//! # Design Rules
//!
//! 1. `save` is optimistic: a document whose `_rev` does not match the
//!    stored one is rejected with [`StoreError::RevisionConflict`].
//! 2. Every accepted write produces a new revision.
//! 3. Index snapshots are not live; a snapshot taken before a write does
//!    not see it.
//!
//! [`Document`]: sdb_types::Document
//! [`DocumentId`]: sdb_types::DocumentId

pub mod error;
pub mod index;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use index::{IndexRow, IndexSnapshot};
pub use memory::{InMemoryDocumentStore, ViewFn};
pub use traits::DocumentStore;
