use std::sync::Arc;

use sdb_gate::{ConfirmationGate, DefaultAnswer};
use sdb_types::{ProjectSample, ProjectSamples};
use serde::Serialize;
use tracing::{debug, info_span, warn, Span};

use crate::classify::{classify, is_prefixed};
use crate::error::MatchError;
use crate::rules::{default_rules, Candidate, Confidence, MatchRule};

/// Per-call matching switches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// Also try barcode names without a project id prefix.
    pub extensive: bool,
    /// Accept relaxed matches without asking.
    pub force: bool,
}

impl MatchOptions {
    pub fn extensive() -> Self {
        Self {
            extensive: true,
            force: false,
        }
    }
}

/// A barcode name resolved to a project sample.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchResult {
    pub sample_name: String,
    pub project_sample: ProjectSample,
}

impl MatchResult {
    fn new(sample_name: &str, project_sample: &ProjectSample) -> Self {
        Self {
            sample_name: sample_name.to_string(),
            project_sample: project_sample.clone(),
        }
    }
}

/// Maps barcode names onto canonical project sample names.
///
/// Canonical names are tried in the project's insertion order, and for each
/// name the rules run in list order. The first hit ends the search, so when
/// two names could match, the earlier one wins regardless of how good
/// either match is.
pub struct NameMatcher {
    gate: Arc<ConfirmationGate>,
    rules: Vec<Box<dyn MatchRule>>,
    span: Span,
}

impl NameMatcher {
    /// A matcher running [`default_rules`].
    pub fn new(gate: Arc<ConfirmationGate>) -> Self {
        Self::with_rules(gate, default_rules())
    }

    pub fn with_rules(gate: Arc<ConfirmationGate>, rules: Vec<Box<dyn MatchRule>>) -> Self {
        Self {
            gate,
            rules,
            span: info_span!("name_matcher"),
        }
    }

    /// Log under `span` instead of the default `name_matcher` span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Number of rules in the cascade.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Resolve `barcode` against `samples`.
    ///
    /// Returns `Ok(None)` when nothing matches, when an unprefixed barcode
    /// is seen without extensive matching, when an unprefixed barcode has no
    /// recognisable layout, or when a relaxed match is declined. A declined
    /// match ends the search: no other rule or canonical name is tried.
    pub fn match_barcode(
        &self,
        barcode: &str,
        samples: &ProjectSamples,
        options: MatchOptions,
    ) -> Result<Option<MatchResult>, MatchError> {
        let _entered = self.span.enter();

        if let Some(sample) = samples.get(barcode) {
            debug!(barcode, "exact match");
            return Ok(Some(MatchResult::new(barcode, sample)));
        }
        if samples.is_empty() {
            return Ok(None);
        }
        if !is_prefixed(barcode) && !options.extensive {
            debug!(barcode, "barcode has no project prefix and extensive matching is off");
            return Ok(None);
        }

        let form = match classify(barcode) {
            Ok(form) => form,
            Err(err @ MatchError::PatternExtraction { .. }) => {
                warn!(barcode, "{err}");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        for (sample_name, sample) in samples {
            let candidate = Candidate {
                barcode,
                form: &form,
                sample_name,
                sample,
            };
            let Some(rule) = self.rules.iter().find(|rule| rule.matches(&candidate)) else {
                continue;
            };
            debug!(barcode, sample_name = %sample_name, rule = rule.name(), "rule matched");

            if rule.confidence() == Confidence::NeedsConfirmation {
                let question = confirmation_question(barcode, sample_name);
                let decision = self.gate.confirm(&question, DefaultAnswer::No, options.force)?;
                if !decision.is_accepted() {
                    debug!(barcode, sample_name = %sample_name, "mapping declined");
                    return Ok(None);
                }
            }
            return Ok(Some(MatchResult::new(sample_name, sample)));
        }

        Ok(None)
    }
}

/// The question put to the gate for a relaxed match.
pub fn confirmation_question(barcode: &str, sample_name: &str) -> String {
    format!(
        "found mapping '{barcode} : {sample_name}' (barcode_name:project_sample_name); \
         do you want to use this project_sample_name?"
    )
}

impl std::fmt::Debug for NameMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameMatcher")
            .field("rules", &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
