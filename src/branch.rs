//! A single configuration of a nondeterministic computation.

use crate::transitions::Move;
use crate::types::Symbol;
use serde::{Deserialize, Serialize};

/// One candidate computation: the current state, the stack and the input cursor.
///
/// The stack is stored bottom-to-top, so the last element is the top. Two branches are
/// equal exactly when state, cursor and stack contents are equal, which is the key used
/// to merge duplicate branches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Branch {
    pub state: String,
    pub stack: Vec<Symbol>,
    pub cursor: usize,
}

impl Branch {
    pub fn new(state: impl Into<String>, stack: Vec<Symbol>, cursor: usize) -> Self {
        Self {
            state: state.into(),
            stack,
            cursor,
        }
    }

    /// The top of the stack, or `None` (epsilon) if the stack is empty.
    pub fn top(&self) -> Option<&str> {
        self.stack.last().map(String::as_str)
    }

    /// Returns the stack contents from top to bottom.
    pub fn stack_top_down(&self) -> impl Iterator<Item = &Symbol> {
        self.stack.iter().rev()
    }

    /// Builds the successor reached by taking `mv`.
    ///
    /// The top is popped when it was matched (non-epsilon), then `mv.push` is pushed so
    /// its first symbol becomes the new top. The cursor advances only when `consumes`.
    pub fn advance(&self, mv: &Move, consumes: bool) -> Branch {
        let mut stack = self.stack.clone();
        stack.pop();
        // An empty stack reads as epsilon and the pop above is a no-op.
        stack.extend(mv.push.iter().rev().cloned());

        Branch {
            state: mv.destination.clone(),
            stack,
            cursor: self.cursor + usize::from(consumes),
        }
    }
}
