//! Barcode-to-project-sample name matching for StatusDB.
//!
//! Sequencer barcode names follow several inconsistent conventions. The
//! [`NameMatcher`] maps one onto a canonical project sample name by running
//! an ordered list of [`MatchRule`]s against every canonical name in the
//! project's insertion order. The first hit wins. Hits from relaxed rules
//! are confirmed through a [`sdb_gate::ConfirmationGate`], and a declined
//! confirmation ends the search.
//!
//! # Key Items
//!
//! - [`classify`] / [`BarcodeForm`] -- split a barcode into its parts
//! - [`MatchRule`] and [`default_rules`] -- the cascade, in order
//! - [`NameMatcher::match_barcode`] -- the cascade driver

pub mod classify;
pub mod error;
pub mod matcher;
pub mod rules;

pub use classify::{classify, is_prefixed, project_id_of, BarcodeForm, UnprefixedParts};
pub use error::MatchError;
pub use matcher::{confirmation_question, MatchOptions, MatchResult, NameMatcher};
pub use rules::{default_rules, Candidate, Confidence, MatchRule};
