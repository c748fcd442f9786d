use serde::{Deserialize, Serialize};

/// Configuration for the confirmation gate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// When `true`, every confirmation is accepted without prompting.
    #[serde(default)]
    pub force: bool,
}

impl GateConfig {
    /// A gate that never prompts.
    pub fn forced() -> Self {
        Self { force: true }
    }
}
