//! This module defines the core data structures and types used throughout the pushdown
//! automaton simulator, including the automaton definition, step outcomes, and error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transitions::TransitionTable;
use crate::Rule;

/// A stack or input symbol. Epsilon is never a `Symbol`; it is modelled as `None`
/// wherever a symbol is optional.
pub type Symbol = String;

/// The default maximum number of branches kept alive after each step.
pub const DEFAULT_BRANCH_CAP: usize = 100;
/// The number of branches rendered in a status summary before the rest are counted.
pub const STATUS_BRANCH_LIMIT: usize = 5;
/// The maximum number of steps `Engine::run` executes before giving up.
pub const MAX_EXECUTION_STEPS: usize = 10000;
/// The maximum allowed size for an automaton definition in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB
/// The literal word used in rule text for the empty symbol.
pub const EPSILON_WORD: &str = "epsilon";
/// How an empty stack or an exhausted input is rendered.
pub const DISPLAY_EPSILON: &str = "ε";

/// A pushdown automaton: the declared alphabets and states plus its transition table.
///
/// Constructing an `Automaton` performs no validation. Alphabet checks against a
/// concrete input happen in [`Automaton::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Automaton {
    /// A human readable name, used by the catalog and the CLI.
    pub name: String,
    pub states: Vec<String>,
    pub input_alphabet: Vec<Symbol>,
    pub stack_alphabet: Vec<Symbol>,
    pub initial_state: String,
    pub final_states: Vec<String>,
    pub table: TransitionTable,
    /// The symbol placed on the stack by `reset`, if any.
    pub initial_stack_symbol: Option<Symbol>,
}

impl Automaton {
    pub fn new(
        states: Vec<String>,
        input_alphabet: Vec<Symbol>,
        stack_alphabet: Vec<Symbol>,
        initial_state: impl Into<String>,
        final_states: Vec<String>,
        table: TransitionTable,
        initial_stack_symbol: Option<Symbol>,
    ) -> Self {
        Self {
            name: "Untitled".to_string(),
            states,
            input_alphabet,
            stack_alphabet,
            initial_state: initial_state.into(),
            final_states,
            table,
            initial_stack_symbol: initial_stack_symbol.filter(|s| !s.is_empty()),
        }
    }

    /// Sets the display name of the automaton.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Checks that `input` and the initial stack symbol respect the declared alphabets.
    ///
    /// Input characters are checked first, left to right, so the first offending
    /// character is the one reported.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the definition may be simulated on `input`.
    /// * `Err(PdaError::InputSymbol)` naming the first character outside the input alphabet.
    /// * `Err(PdaError::StackSymbol)` if the initial stack symbol is outside the stack alphabet.
    pub fn validate(&self, input: &str) -> Result<(), PdaError> {
        if let Some(c) = input
            .chars()
            .find(|c| !self.input_alphabet.iter().any(|s| s.chars().eq([*c])))
        {
            return Err(PdaError::InputSymbol(c));
        }

        match &self.initial_stack_symbol {
            Some(symbol) if !self.stack_alphabet.contains(symbol) => {
                Err(PdaError::StackSymbol(symbol.clone()))
            }
            _ => Ok(()),
        }
    }

    pub fn is_final(&self, state: &str) -> bool {
        self.final_states.iter().any(|s| s == state)
    }
}

/// The final outcome of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Some branch consumed the whole input in a final state.
    Accepted,
    /// Every branch died without accepting.
    Rejected,
}

/// Represents the outcome of a single engine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// At least one branch is still alive and none has accepted yet.
    Running,
    /// The simulation has halted with a verdict.
    Halt(Verdict),
}

impl Step {
    pub fn is_halt(&self) -> bool {
        matches!(self, Step::Halt(_))
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Running => write!(f, "running"),
            Step::Halt(Verdict::Accepted) => write!(f, "accepted"),
            Step::Halt(Verdict::Rejected) => write!(f, "rejected"),
        }
    }
}

/// Represents the errors that can occur while loading or validating an automaton.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PdaError {
    /// An input character that is not part of the input alphabet.
    #[error("Symbol '{0}' in the input does not belong to the input alphabet")]
    InputSymbol(char),
    /// The initial stack symbol is not part of the stack alphabet.
    #[error("Initial stack symbol '{0}' does not belong to the stack alphabet")]
    StackSymbol(String),
    /// Indicates an error during the parsing of an automaton definition.
    #[error("Definition parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates a structurally incomplete definition.
    #[error("Definition validation error: {0}")]
    ValidationError(String),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn automaton(stack_init: Option<&str>) -> Automaton {
        Automaton::new(
            vec!["q0".into(), "qf".into()],
            vec!["a".into(), "b".into()],
            vec!["Z0".into()],
            "q0",
            vec!["qf".into()],
            TransitionTable::default(),
            stack_init.map(String::from),
        )
    }

    #[test]
    fn test_validate_accepts_alphabet_input() {
        assert_eq!(automaton(Some("Z0")).validate("abba"), Ok(()));
        assert_eq!(automaton(Some("Z0")).validate(""), Ok(()));
    }

    #[test]
    fn test_validate_names_offending_input_symbol() {
        let error = automaton(Some("Z0")).validate("abcab").unwrap_err();
        assert_eq!(error, PdaError::InputSymbol('c'));
        assert!(error.to_string().contains("'c'"));
        assert!(error.to_string().contains("input alphabet"));
    }

    #[test]
    fn test_validate_names_offending_stack_symbol() {
        let error = automaton(Some("X")).validate("ab").unwrap_err();
        assert_eq!(error, PdaError::StackSymbol("X".into()));
        assert!(error.to_string().contains("stack alphabet"));
    }

    #[test]
    fn test_validate_input_checked_before_stack() {
        let error = automaton(Some("X")).validate("z").unwrap_err();
        assert_eq!(error, PdaError::InputSymbol('z'));
    }

    #[test]
    fn test_empty_stack_symbol_is_none() {
        let pda = automaton(Some(""));
        assert_eq!(pda.initial_stack_symbol, None);
        assert_eq!(pda.validate("ab"), Ok(()));
    }

    #[test]
    fn test_multi_char_alphabet_entry_does_not_match_char() {
        let mut pda = automaton(None);
        pda.input_alphabet = vec!["ab".into()];
        assert_eq!(pda.validate("a"), Err(PdaError::InputSymbol('a')));
    }

    #[test]
    fn test_verdict_serialization() {
        assert_eq!(
            serde_json::to_string(&Verdict::Accepted).unwrap(),
            "\"accepted\""
        );
        let verdict: Verdict = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(verdict, Verdict::Rejected);
    }

    #[test]
    fn test_step_display() {
        assert_eq!(Step::Running.to_string(), "running");
        assert_eq!(Step::Halt(Verdict::Accepted).to_string(), "accepted");
        assert_eq!(Step::Halt(Verdict::Rejected).to_string(), "rejected");
    }
}
