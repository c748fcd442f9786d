use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};
use std::sync::Mutex;

use tracing::warn;

use crate::error::{GateError, GateResult};

/// The answer assumed when the user just presses enter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DefaultAnswer {
    Yes,
    #[default]
    No,
    /// No default: an empty line is asked again.
    None,
}

impl DefaultAnswer {
    /// The hint appended to the question.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Yes => " [Y/n] ",
            Self::No => " [y/N] ",
            Self::None => " [y/n] ",
        }
    }

    /// The boolean this default stands for; `None` counts as a no.
    pub fn as_bool(self) -> bool {
        matches!(self, Self::Yes)
    }
}

/// A source of yes/no decisions.
pub trait Prompt: Send + Sync {
    /// Ask `question` and block until an answer is available.
    fn ask(&self, question: &str, default: DefaultAnswer) -> GateResult<bool>;
}

// ---------------------------------------------------------------------------
// ConsolePrompt
// ---------------------------------------------------------------------------

const REASK: &str = "Please respond with 'yes' or 'no' (or 'y' or 'n').";

/// Interprets one line of input; `None` means the line must be asked again.
fn parse_answer(line: &str, default: DefaultAnswer) -> Option<bool> {
    match line.trim().to_lowercase().as_str() {
        "" => match default {
            DefaultAnswer::None => None,
            other => Some(other.as_bool()),
        },
        "yes" | "ye" | "y" => Some(true),
        "no" | "n" => Some(false),
        _ => None,
    }
}

/// Interactive prompt over a reader/writer pair.
///
/// Accepts `yes`, `ye`, `y`, `no` and `n` in any case. Anything else is
/// asked again. End of input yields the default answer.
pub struct ConsolePrompt<R, W> {
    io: Mutex<(R, W)>,
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            io: Mutex::new((reader, writer)),
        }
    }

    /// Consume the prompt, returning the reader and writer.
    pub fn into_inner(self) -> (R, W) {
        self.io.into_inner().expect("lock poisoned")
    }
}

impl ConsolePrompt<BufReader<Stdin>, Stdout> {
    /// A prompt reading from stdin and writing to stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R, W> Prompt for ConsolePrompt<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn ask(&self, question: &str, default: DefaultAnswer) -> GateResult<bool> {
        let mut guard = self.io.lock().expect("lock poisoned");
        let (reader, writer) = &mut *guard;
        loop {
            write!(writer, "{question}{}", default.suffix())?;
            writer.flush()?;

            let mut line = String::new();
            if reader.read_line(&mut line)? == 0 {
                warn!(question, "end of input while waiting for an answer, using the default");
                return Ok(default.as_bool());
            }
            match parse_answer(&line, default) {
                Some(answer) => return Ok(answer),
                None => writeln!(writer, "{REASK}")?,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ScriptedPrompt
// ---------------------------------------------------------------------------

/// Answers from a fixed script, recording every question asked.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<bool>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Questions asked so far, in order.
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().expect("lock poisoned").clone()
    }

    /// Answers not yet consumed.
    pub fn remaining(&self) -> usize {
        self.answers.lock().expect("lock poisoned").len()
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&self, question: &str, _default: DefaultAnswer) -> GateResult<bool> {
        self.asked
            .lock()
            .expect("lock poisoned")
            .push(question.to_string());
        self.answers
            .lock()
            .expect("lock poisoned")
            .pop_front()
            .ok_or_else(|| GateError::ScriptExhausted {
                question: question.to_string(),
            })
    }
}

/// Answers yes to everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoAccept;

impl Prompt for AutoAccept {
    fn ask(&self, _question: &str, _default: DefaultAnswer) -> GateResult<bool> {
        Ok(true)
    }
}
