//! Foundation types for StatusDB.
//!
//! This crate provides the document, identity, and temporal types shared by
//! every other StatusDB crate.
//!
//! # Key Types
//!
//! - [`Document`]: Open-schema record: fixed bookkeeping fields plus an
//!   insertion-ordered side-map for everything else
//! - [`DocumentId`]: Stable identity assigned once at creation
//! - [`Revision`]: Opaque optimistic-concurrency token owned by the store
//! - [`EntityType`]: Discriminates the document shape
//! - [`Timestamp`] / [`Clock`]: UTC time stamps and an injectable time source
//! - [`ProjectSample`]: Typed view over one entry of a project's `samples`

pub mod document;
pub mod error;
pub mod identity;
pub mod sample;
pub mod temporal;

pub use document::{Document, EntityType, VOLATILE_FIELDS};
pub use error::TypeError;
pub use identity::{find_or_make_key, DocumentId, Revision};
pub use sample::{LibraryPrep, ProjectSample, ProjectSamples};
pub use temporal::{Clock, FixedClock, SystemClock, Timestamp};
