use std::sync::Arc;

use tracing::debug;

use crate::config::GateConfig;
use crate::error::GateResult;
use crate::prompt::{ConsolePrompt, DefaultAnswer, Prompt};

/// The outcome of a confirmation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Confirmation {
    /// Accepted without asking because force mode was on.
    Forced,
    /// The prompt answered yes.
    Confirmed,
    /// The prompt answered no.
    Declined,
}

impl Confirmation {
    /// Returns `true` unless the prompt declined.
    pub fn is_accepted(self) -> bool {
        !matches!(self, Self::Declined)
    }
}

/// Puts yes/no questions to a [`Prompt`], unless forced.
///
/// The call blocks until the prompt answers; there is no timeout.
pub struct ConfirmationGate {
    prompt: Arc<dyn Prompt>,
    config: GateConfig,
}

impl ConfirmationGate {
    pub fn new(prompt: Arc<dyn Prompt>, config: GateConfig) -> Self {
        Self { prompt, config }
    }

    /// A gate asking on the terminal.
    pub fn console(config: GateConfig) -> Self {
        Self::new(Arc::new(ConsolePrompt::stdio()), config)
    }

    /// The current configuration.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Ask `question`. Either the per-call `force` or the configured force
    /// flag skips the prompt entirely.
    pub fn confirm(
        &self,
        question: &str,
        default: DefaultAnswer,
        force: bool,
    ) -> GateResult<Confirmation> {
        if force || self.config.force {
            debug!(question, "confirmation forced");
            return Ok(Confirmation::Forced);
        }

        let decision = if self.prompt.ask(question, default)? {
            Confirmation::Confirmed
        } else {
            Confirmation::Declined
        };
        debug!(question, ?decision, "confirmation answered");
        Ok(decision)
    }
}

impl std::fmt::Debug for ConfirmationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmationGate")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{AutoAccept, ScriptedPrompt};

    #[test]
    fn prompt_answers_are_reported() {
        let prompt = Arc::new(ScriptedPrompt::new([true, false]));
        let gate = ConfirmationGate::new(prompt.clone(), GateConfig::default());

        assert_eq!(gate.confirm("a", DefaultAnswer::No, false).unwrap(), Confirmation::Confirmed);
        assert_eq!(gate.confirm("b", DefaultAnswer::No, false).unwrap(), Confirmation::Declined);
        assert_eq!(prompt.asked(), vec!["a", "b"]);
    }

    #[test]
    fn per_call_force_skips_prompt() {
        let prompt = Arc::new(ScriptedPrompt::default());
        let gate = ConfirmationGate::new(prompt.clone(), GateConfig::default());

        let decision = gate.confirm("q", DefaultAnswer::No, true).unwrap();
        assert_eq!(decision, Confirmation::Forced);
        assert!(decision.is_accepted());
        assert!(prompt.asked().is_empty());
    }

    #[test]
    fn configured_force_skips_prompt() {
        let prompt = Arc::new(ScriptedPrompt::default());
        let gate = ConfirmationGate::new(prompt.clone(), GateConfig::forced());
        assert_eq!(gate.confirm("q", DefaultAnswer::No, false).unwrap(), Confirmation::Forced);
        assert!(prompt.asked().is_empty());
    }

    #[test]
    fn prompt_errors_propagate() {
        let gate = ConfirmationGate::new(Arc::new(ScriptedPrompt::default()), GateConfig::default());
        assert!(gate.confirm("q", DefaultAnswer::No, false).is_err());
    }

    #[test]
    fn auto_accept_confirms() {
        let gate = ConfirmationGate::new(Arc::new(AutoAccept), GateConfig::default());
        assert_eq!(gate.confirm("q", DefaultAnswer::No, false).unwrap(), Confirmation::Confirmed);
    }
}
