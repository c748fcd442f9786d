/// Errors that can occur while asking for a confirmation.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// Reading the answer or writing the question failed.
    #[error("prompt I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A scripted prompt ran out of canned answers.
    #[error("no scripted answer left for question: {question}")]
    ScriptExhausted { question: String },
}

/// Convenience alias for gate results.
pub type GateResult<T> = Result<T, GateError>;
