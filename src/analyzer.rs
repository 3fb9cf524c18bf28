//! This module provides functions for analyzing automaton definitions to detect common
//! inconsistencies before simulation: undeclared states, symbols outside the declared
//! alphabets, and states that no transition can reach.
//!
//! Diagnostics are advisory. A definition with diagnostics still loads and runs.

use crate::types::Automaton;
use std::collections::{HashSet, VecDeque};
use std::fmt;

/// A problem found while analyzing an automaton definition.
#[derive(Debug, PartialEq, Eq, Clone, PartialOrd, Ord)]
pub enum Diagnostic {
    /// The initial state is not among the declared states.
    UndeclaredInitialState(String),
    /// A final state is not among the declared states.
    UndeclaredFinalState(String),
    /// A transition mentions a state that is not declared. Carries the rule and the state.
    UndeclaredState(String, String),
    /// A transition reads an input symbol outside the input alphabet.
    UnknownInputSymbol(String, String),
    /// A transition reads or pushes a stack symbol outside the stack alphabet.
    UnknownStackSymbol(String, String),
    /// Declared states that no sequence of transitions reaches from the initial state.
    UnreachableStates(Vec<String>),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UndeclaredInitialState(state) => {
                write!(f, "Initial state '{state}' is not declared")
            }
            Diagnostic::UndeclaredFinalState(state) => {
                write!(f, "Final state '{state}' is not declared")
            }
            Diagnostic::UndeclaredState(rule, state) => {
                write!(f, "Transition {rule} uses undeclared state '{state}'")
            }
            Diagnostic::UnknownInputSymbol(rule, symbol) => write!(
                f,
                "Transition {rule} reads '{symbol}' which is not in the input alphabet"
            ),
            Diagnostic::UnknownStackSymbol(rule, symbol) => write!(
                f,
                "Transition {rule} uses '{symbol}' which is not in the stack alphabet"
            ),
            Diagnostic::UnreachableStates(states) => {
                write!(f, "Unreachable states detected: {states:?}")
            }
        }
    }
}

/// Analyzes an automaton and returns every diagnostic found, sorted and deduplicated.
///
/// Checks against a declaration list are skipped when that list is empty.
pub fn analyze(automaton: &Automaton) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = [
        check_declared_states,
        check_transition_states,
        check_transition_symbols,
        check_unreachable_states,
    ]
    .iter()
    .flat_map(|check| check(automaton))
    .collect();

    diagnostics.sort();
    diagnostics.dedup();
    diagnostics
}

fn check_declared_states(automaton: &Automaton) -> Vec<Diagnostic> {
    if automaton.states.is_empty() {
        return Vec::new();
    }

    let declared: HashSet<&str> = automaton.states.iter().map(String::as_str).collect();
    let mut diagnostics = Vec::new();

    if !declared.contains(automaton.initial_state.as_str()) {
        diagnostics.push(Diagnostic::UndeclaredInitialState(
            automaton.initial_state.clone(),
        ));
    }

    diagnostics.extend(
        automaton
            .final_states
            .iter()
            .filter(|state| !declared.contains(state.as_str()))
            .map(|state| Diagnostic::UndeclaredFinalState(state.clone())),
    );

    diagnostics
}

fn check_transition_states(automaton: &Automaton) -> Vec<Diagnostic> {
    if automaton.states.is_empty() {
        return Vec::new();
    }

    let declared: HashSet<&str> = automaton.states.iter().map(String::as_str).collect();
    let declared = &declared;

    automaton
        .table
        .iter()
        .flat_map(move |(key, mv)| {
            [&key.state, &mv.destination]
                .into_iter()
                .filter(move |state| !declared.contains(state.as_str()))
                .map(move |state| Diagnostic::UndeclaredState(key.to_string(), state.clone()))
        })
        .collect()
}

fn check_transition_symbols(automaton: &Automaton) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (key, mv) in automaton.table.iter() {
        if let Some(symbol) = &key.input {
            if !automaton.input_alphabet.is_empty() && !automaton.input_alphabet.contains(symbol)
            {
                diagnostics.push(Diagnostic::UnknownInputSymbol(
                    key.to_string(),
                    symbol.clone(),
                ));
            }
        }

        if automaton.stack_alphabet.is_empty() {
            continue;
        }

        diagnostics.extend(
            key.top
                .iter()
                .chain(mv.push.iter())
                .filter(|symbol| !automaton.stack_alphabet.contains(*symbol))
                .map(|symbol| Diagnostic::UnknownStackSymbol(key.to_string(), symbol.clone())),
        );
    }

    diagnostics
}

/// Performs a breadth-first traversal of the transition graph from the initial state,
/// ignoring input and stack contents.
fn check_unreachable_states(automaton: &Automaton) -> Vec<Diagnostic> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([automaton.initial_state.as_str()]);

    while let Some(state) = queue.pop_front() {
        if !visited.insert(state) {
            continue;
        }

        queue.extend(
            automaton
                .table
                .iter()
                .filter(|(key, _)| key.state == state)
                .map(|(_, mv)| mv.destination.as_str()),
        );
    }

    let mut unreachable: Vec<String> = automaton
        .states
        .iter()
        .filter(|state| !visited.contains(state.as_str()))
        .cloned()
        .collect();

    if unreachable.is_empty() {
        return Vec::new();
    }

    unreachable.sort();
    vec![Diagnostic::UnreachableStates(unreachable)]
}
