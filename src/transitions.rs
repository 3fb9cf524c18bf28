//! The transition relation of a pushdown automaton and the permissive parser that builds
//! it from rule text of the form `origin, input, top -> destination, push`.

use crate::types::{Symbol, DISPLAY_EPSILON, EPSILON_WORD};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

lazy_static! {
    static ref RULE_PATTERN: Regex =
        Regex::new(r"^\s*([^,]+)\s*,\s*([^,]+)\s*,\s*([^\-]+)\s*->\s*([^,]+)\s*,\s*(.+)\s*$")
            .unwrap();
    static ref COMPACT_SYMBOL: Regex = Regex::new(r"Z0|.").unwrap();
}

/// Identifies the moves available from a configuration.
///
/// `None` in `input` or `top` stands for epsilon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionKey {
    pub state: String,
    pub input: Option<Symbol>,
    pub top: Option<Symbol>,
}

impl TransitionKey {
    pub fn new(state: impl Into<String>, input: Option<&str>, top: Option<&str>) -> Self {
        Self {
            state: state.into(),
            input: input.map(String::from),
            top: top.map(String::from),
        }
    }
}

impl fmt::Display for TransitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            self.state,
            self.input.as_deref().unwrap_or(DISPLAY_EPSILON),
            self.top.as_deref().unwrap_or(DISPLAY_EPSILON)
        )
    }
}

/// A single nondeterministic choice: the destination state and the symbols to push.
///
/// The first symbol of `push` ends up on top of the stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub destination: String,
    pub push: Vec<Symbol>,
}

impl Move {
    pub fn new(destination: impl Into<String>, push: Vec<Symbol>) -> Self {
        Self {
            destination: destination.into(),
            push,
        }
    }
}

/// Maps `(state, input-or-epsilon, top-or-epsilon)` to an ordered list of moves.
///
/// Moves sharing a key keep the order in which they were inserted; that order is the
/// order in which the engine explores them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionTable {
    transitions: HashMap<TransitionKey, Vec<Move>>,
    keys: Vec<TransitionKey>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a move under `key`, after any moves already registered for it.
    pub fn insert(&mut self, key: TransitionKey, mv: Move) {
        match self.transitions.get_mut(&key) {
            Some(moves) => moves.push(mv),
            None => {
                self.keys.push(key.clone());
                self.transitions.insert(key, vec![mv]);
            }
        }
    }

    /// Returns the moves registered for the given key, or an empty slice.
    pub fn moves(&self, state: &str, input: Option<&str>, top: Option<&str>) -> &[Move] {
        self.transitions
            .get(&TransitionKey::new(state, input, top))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterates over every `(key, move)` pair in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&TransitionKey, &Move)> {
        self.keys.iter().flat_map(move |key| {
            self.transitions
                .get(key)
                .into_iter()
                .flatten()
                .map(move |mv| (key, mv))
        })
    }

    /// The number of moves in the table.
    pub fn len(&self) -> usize {
        self.transitions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Parses rule text, one rule per line, into a `TransitionTable`.
///
/// Blank lines and lines that do not match the rule grammar are skipped, so partially
/// typed definitions still load.
pub fn parse_transitions(text: &str) -> TransitionTable {
    let mut table = TransitionTable::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match parse_rule(line) {
            Some((key, mv)) => table.insert(key, mv),
            None => log::debug!("skipping malformed rule: {line}"),
        }
    }

    table
}

/// Parses a single rule line. Returns `None` if the line does not match the grammar.
pub fn parse_rule(line: &str) -> Option<(TransitionKey, Move)> {
    let caps = RULE_PATTERN.captures(line)?;
    let field = |i: usize| caps.get(i).map_or("", |m| m.as_str().trim());

    let key = TransitionKey {
        state: field(1).to_string(),
        input: parse_optional_symbol(field(2)),
        top: parse_optional_symbol(field(3)),
    };

    Some((key, Move::new(field(4), parse_push(field(5)))))
}

/// Reads an input or stack-top field, mapping `epsilon` (any case) to `None`.
fn parse_optional_symbol(field: &str) -> Option<Symbol> {
    if field.is_empty() || field.eq_ignore_ascii_case(EPSILON_WORD) {
        None
    } else {
        Some(field.to_string())
    }
}

/// Tokenizes a push specification.
///
/// * `epsilon` pushes nothing.
/// * A spec containing a comma or a space is an explicit list: `A B C` or `A,B,C`.
/// * Anything else is compact notation, where `Z0` is one symbol and every other
///   character is its own symbol: `Z0AB` is `[Z0, A, B]`.
pub fn parse_push(spec: &str) -> Vec<Symbol> {
    let spec = spec.trim();

    if spec.eq_ignore_ascii_case(EPSILON_WORD) {
        return Vec::new();
    }

    if spec.contains(',') || spec.contains(' ') {
        return spec
            .replace(',', " ")
            .split_whitespace()
            .map(String::from)
            .collect();
    }

    COMPACT_SYMBOL
        .find_iter(spec)
        .map(|m| m.as_str().to_string())
        .collect()
}
