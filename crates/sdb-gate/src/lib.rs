//! Confirmation gate for StatusDB.
//!
//! Low-confidence decisions (such as an extensive barcode match) are put to
//! a [`Prompt`] before they take effect. The gate can be forced, in which
//! case every question is answered yes without asking, for unattended
//! batch runs.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use sdb_gate::{ConfirmationGate, DefaultAnswer, GateConfig, ScriptedPrompt};
//!
//! let prompt = Arc::new(ScriptedPrompt::new([false]));
//! let gate = ConfirmationGate::new(prompt.clone(), GateConfig::default());
//! let decision = gate.confirm("use this sample?", DefaultAnswer::No, false).unwrap();
//! assert!(!decision.is_accepted());
//! assert_eq!(prompt.asked(), vec!["use this sample?".to_string()]);
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod prompt;

pub use config::GateConfig;
pub use error::{GateError, GateResult};
pub use gate::{Confirmation, ConfirmationGate};
pub use prompt::{AutoAccept, ConsolePrompt, DefaultAnswer, Prompt, ScriptedPrompt};
