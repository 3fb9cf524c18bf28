//! Read-only projections of an engine's progress for display.

use crate::branch::Branch;
use crate::types::{Symbol, Verdict, DISPLAY_EPSILON, STATUS_BRANCH_LIMIT};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A display-oriented view of one active branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchSummary {
    pub state: String,
    /// The unconsumed suffix of the input.
    pub remaining_input: String,
    /// Stack contents, top first.
    pub stack: Vec<Symbol>,
}

impl BranchSummary {
    pub fn new(branch: &Branch, input: &[Symbol]) -> Self {
        Self {
            state: branch.state.clone(),
            remaining_input: input.get(branch.cursor..).unwrap_or_default().concat(),
            stack: branch.stack_top_down().cloned().collect(),
        }
    }
}

impl fmt::Display for BranchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stack = if self.stack.is_empty() {
            DISPLAY_EPSILON.to_string()
        } else {
            self.stack.join(" ")
        };
        let rest = if self.remaining_input.is_empty() {
            DISPLAY_EPSILON
        } else {
            self.remaining_input.as_str()
        };

        write!(f, "state={} | stack={} | rest={}", self.state, stack, rest)
    }
}

/// A snapshot of the engine: step counter, verdict and the first few active branches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub step_count: usize,
    pub verdict: Option<Verdict>,
    pub total_branches: usize,
    pub branches: Vec<BranchSummary>,
    /// How many active branches are not listed in `branches`.
    pub hidden: usize,
}

impl StatusSnapshot {
    pub fn new(
        step_count: usize,
        verdict: Option<Verdict>,
        active: &[Branch],
        input: &[Symbol],
    ) -> Self {
        Self::with_limit(step_count, verdict, active, input, STATUS_BRANCH_LIMIT)
    }

    pub fn with_limit(
        step_count: usize,
        verdict: Option<Verdict>,
        active: &[Branch],
        input: &[Symbol],
        limit: usize,
    ) -> Self {
        let branches: Vec<BranchSummary> = active
            .iter()
            .take(limit)
            .map(|branch| BranchSummary::new(branch, input))
            .collect();

        Self {
            step_count,
            verdict,
            total_branches: active.len(),
            hidden: active.len() - branches.len(),
            branches,
        }
    }
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.branches.is_empty() {
            return write!(f, "No active branches.");
        }

        for (i, branch) in self.branches.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "Branch {}: {}", i + 1, branch)?;
        }

        if self.hidden > 0 {
            write!(f, "\n... (+{} more)", self.hidden)?;
        }

        Ok(())
    }
}
