//! This module defines the `Engine` struct, which simulates a nondeterministic pushdown
//! automaton by advancing every live branch in lockstep, one synchronized step at a time.

use crate::branch::Branch;
use crate::status::StatusSnapshot;
use crate::transitions::Move;
use crate::types::{Automaton, PdaError, Step, Symbol, Verdict, DEFAULT_BRANCH_CAP};
use std::collections::HashSet;

/// Breadth-first simulator for a pushdown automaton.
///
/// The engine owns the automaton and the set of active branches. A freshly constructed
/// engine has no branches; `reset` validates an input and places the initial branch.
/// Each `step` advances all branches together, merges duplicates and drops the tail
/// beyond the branch cap.
#[derive(Debug, Clone)]
pub struct Engine {
    automaton: Automaton,
    input: Vec<Symbol>,
    branches: Vec<Branch>,
    branch_cap: usize,
    step_count: usize,
    verdict: Option<Verdict>,
    loaded: bool,
}

impl Engine {
    /// Creates an engine for `automaton`. No validation is performed here.
    pub fn new(automaton: Automaton) -> Self {
        Self {
            automaton,
            input: Vec::new(),
            branches: Vec::new(),
            branch_cap: DEFAULT_BRANCH_CAP,
            step_count: 0,
            verdict: None,
            loaded: false,
        }
    }

    /// Overrides the maximum number of branches kept after each step. A cap of zero is
    /// treated as one.
    pub fn with_branch_cap(mut self, cap: usize) -> Self {
        self.branch_cap = cap.max(1);
        self
    }

    /// Checks `input` and the initial stack symbol against the declared alphabets.
    pub fn validate(&self, input: &str) -> Result<(), PdaError> {
        self.automaton.validate(input)
    }

    /// Validates `input` and reinitializes the simulation on it.
    ///
    /// On success the active set holds a single branch in the initial state, with the
    /// initial stack symbol (if any) on the stack and the cursor at zero.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the input was accepted by validation.
    /// * `Err(PdaError)` otherwise. The engine is then left without branches, so any
    ///   further `step` rejects until a successful `reset`.
    pub fn reset(&mut self, input: &str) -> Result<(), PdaError> {
        self.step_count = 0;
        self.verdict = None;

        if let Err(e) = self.validate(input) {
            self.input.clear();
            self.branches.clear();
            self.loaded = false;
            return Err(e);
        }

        let stack = self.automaton.initial_stack_symbol.iter().cloned().collect();

        self.input = input.chars().map(String::from).collect();
        self.branches = vec![Branch::new(self.automaton.initial_state.clone(), stack, 0)];
        self.loaded = true;

        Ok(())
    }

    /// Advances every active branch by one synchronized step.
    ///
    /// Once the engine has halted this returns the same verdict without touching any
    /// state.
    pub fn step(&mut self) -> Step {
        if let Some(verdict) = self.verdict {
            return Step::Halt(verdict);
        }

        if self.branches.is_empty() {
            return self.halt(Verdict::Rejected);
        }

        if self.has_accepting_branch() {
            return self.halt(Verdict::Accepted);
        }

        let successors: Vec<Branch> = self
            .branches
            .iter()
            .flat_map(|branch| self.successors(branch))
            .collect();
        let produced = successors.len();

        self.branches = merge(successors, self.branch_cap);
        self.step_count += 1;

        log::debug!(
            "step {}: {} successors, {} active",
            self.step_count,
            produced,
            self.branches.len()
        );

        if self.has_accepting_branch() {
            self.halt(Verdict::Accepted)
        } else if self.branches.is_empty() {
            self.halt(Verdict::Rejected)
        } else {
            Step::Running
        }
    }

    /// Steps until the engine halts or `max_steps` steps have been taken.
    ///
    /// Returns `Step::Running` if the bound was hit first.
    pub fn run(&mut self, max_steps: usize) -> Step {
        for _ in 0..max_steps {
            match self.step() {
                Step::Running => continue,
                halt => return halt,
            }
        }

        self.verdict.map_or(Step::Running, Step::Halt)
    }

    /// Returns a read-only summary of the current progress.
    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot::new(self.step_count, self.verdict, &self.branches, &self.input)
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }

    pub fn is_halted(&self) -> bool {
        self.verdict.is_some()
    }

    /// Whether the last `reset` succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn input(&self) -> &[Symbol] {
        &self.input
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    pub fn branch_cap(&self) -> usize {
        self.branch_cap
    }

    /// All successors of `branch`: input-consuming moves first, then epsilon moves.
    /// Both sets apply to the same pre-move configuration.
    fn successors(&self, branch: &Branch) -> Vec<Branch> {
        let table = &self.automaton.table;
        let top = branch.top();

        let consuming: &[Move] = match self.input.get(branch.cursor) {
            Some(symbol) => table.moves(&branch.state, Some(symbol.as_str()), top),
            None => &[],
        };
        let free = table.moves(&branch.state, None, top);

        let successors: Vec<Branch> = consuming
            .iter()
            .map(|mv| branch.advance(mv, true))
            .chain(free.iter().map(|mv| branch.advance(mv, false)))
            .collect();

        for successor in &successors {
            log::trace!("{:?} -> {:?}", branch, successor);
        }

        successors
    }

    fn has_accepting_branch(&self) -> bool {
        self.branches
            .iter()
            .any(|b| b.cursor >= self.input.len() && self.automaton.is_final(&b.state))
    }

    fn halt(&mut self, verdict: Verdict) -> Step {
        log::info!("halted after {} steps: {:?}", self.step_count, verdict);
        self.verdict = Some(verdict);
        Step::Halt(verdict)
    }
}

/// Removes duplicate branches, keeping the first occurrence, then keeps at most `cap`
/// branches in discovery order.
fn merge(branches: Vec<Branch>, cap: usize) -> Vec<Branch> {
    let mut seen = HashSet::with_capacity(branches.len());
    let mut unique: Vec<Branch> = branches
        .into_iter()
        .filter(|branch| seen.insert(branch.clone()))
        .collect();

    if unique.len() > cap {
        log::debug!("dropping {} branches over the cap of {}", unique.len() - cap, cap);
        unique.truncate(cap);
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transitions::parse_transitions;

    fn list(items: &str) -> Vec<String> {
        items
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    fn automaton(
        states: &str,
        input: &str,
        stack: &str,
        finals: &str,
        stack_init: Option<&str>,
        rules: &str,
    ) -> Automaton {
        Automaton::new(
            list(states),
            list(input),
            list(stack),
            "q0",
            list(finals),
            parse_transitions(rules),
            stack_init.map(String::from),
        )
    }

    fn loaded(automaton: Automaton, input: &str) -> Engine {
        let mut engine = Engine::new(automaton);
        engine.reset(input).unwrap();
        engine
    }

    fn a_then_b() -> Automaton {
        automaton(
            "q0, q1, qf",
            "a, b",
            "Z0",
            "qf",
            Some("Z0"),
            "q0, a, Z0 -> q0, Z0\n\
             q0, b, Z0 -> qf, Z0",
        )
    }

    fn ambiguous() -> Automaton {
        automaton(
            "q0, q1, q2, qf",
            "a, b, c",
            "Z0",
            "qf",
            Some("Z0"),
            "q0, a, Z0 -> q1, Z0\n\
             q0, a, Z0 -> q2, Z0\n\
             q1, b, Z0 -> q1, Z0\n\
             q1, c, Z0 -> qf, Z0\n\
             q2, c, Z0 -> q2, Z0",
        )
    }

    fn stack_top_down(branch: &Branch) -> Vec<&str> {
        branch.stack_top_down().map(String::as_str).collect()
    }

    #[test]
    fn test_reset_places_initial_branch() {
        let engine = loaded(a_then_b(), "ab");

        assert!(engine.is_loaded());
        assert_eq!(engine.step_count(), 0);
        assert_eq!(engine.verdict(), None);
        assert_eq!(engine.branches(), &[Branch::new("q0", vec!["Z0".into()], 0)]);
    }

    #[test]
    fn test_reset_without_stack_symbol_starts_empty() {
        let mut pda = a_then_b();
        pda.initial_stack_symbol = None;
        let engine = loaded(pda, "ab");

        assert!(engine.branches()[0].stack.is_empty());
    }

    #[test]
    fn test_accepts_ab() {
        let mut engine = loaded(a_then_b(), "ab");

        assert_eq!(engine.step(), Step::Running);
        assert_eq!(engine.branches(), &[Branch::new("q0", vec!["Z0".into()], 1)]);
        assert_eq!(engine.step(), Step::Halt(Verdict::Accepted));
        assert_eq!(engine.step_count(), 2);
    }

    #[test]
    fn test_rejects_ba_once_branches_die() {
        let mut engine = loaded(a_then_b(), "ba");

        // `b` is consumed into qf, but the trailing `a` has no move from qf.
        assert_eq!(engine.step(), Step::Running);
        assert_eq!(engine.step(), Step::Halt(Verdict::Rejected));
        assert_eq!(engine.step_count(), 2);
        assert!(engine.branches().is_empty());
    }

    #[test]
    fn test_rejects_immediately_without_matching_rule() {
        let pda = automaton(
            "q0, qf",
            "a, b",
            "Z0",
            "qf",
            Some("Z0"),
            "q0, a, Z0 -> q0, Z0",
        );
        let mut engine = loaded(pda, "ba");

        assert_eq!(engine.step(), Step::Halt(Verdict::Rejected));
        assert_eq!(engine.step_count(), 1);
    }

    #[test]
    fn test_ambiguous_split_tracks_both_branches() {
        let mut engine = loaded(ambiguous(), "abc");

        assert_eq!(engine.step(), Step::Running);
        let states: Vec<&str> = engine.branches().iter().map(|b| b.state.as_str()).collect();
        assert_eq!(states, vec!["q1", "q2"]);
        assert_eq!(engine.verdict(), None);

        assert_eq!(engine.step(), Step::Running);
        assert_eq!(engine.branches().len(), 1);
        assert_eq!(engine.branches()[0].state, "q1");

        assert_eq!(engine.step(), Step::Halt(Verdict::Accepted));
    }

    #[test]
    fn test_halted_engine_is_frozen() {
        let mut engine = loaded(a_then_b(), "ab");
        assert_eq!(engine.run(10), Step::Halt(Verdict::Accepted));

        let count = engine.step_count();
        let branches = engine.branches().to_vec();

        for _ in 0..3 {
            assert_eq!(engine.step(), Step::Halt(Verdict::Accepted));
        }
        assert_eq!(engine.step_count(), count);
        assert_eq!(engine.branches(), branches.as_slice());
    }

    #[test]
    fn test_rejection_is_frozen() {
        let mut engine = loaded(a_then_b(), "ba");
        assert_eq!(engine.run(10), Step::Halt(Verdict::Rejected));
        assert_eq!(engine.step(), Step::Halt(Verdict::Rejected));
        assert_eq!(engine.step_count(), 2);
    }

    #[test]
    fn test_identical_runs_are_deterministic() {
        let trace = |input: &str| {
            let mut engine = loaded(ambiguous(), input);
            let mut outcomes = Vec::new();
            loop {
                let step = engine.step();
                outcomes.push((step, engine.branches().to_vec()));
                if step.is_halt() {
                    return outcomes;
                }
            }
        };

        assert_eq!(trace("abbc"), trace("abbc"));
        assert_eq!(trace("acc"), trace("acc"));
    }

    #[test]
    fn test_accepts_empty_input_before_moving() {
        let pda = automaton("q0", "a", "Z0", "q0", Some("Z0"), "q0, epsilon, Z0 -> q0, AZ0");
        let mut engine = loaded(pda, "");

        assert_eq!(engine.step(), Step::Halt(Verdict::Accepted));
        assert_eq!(engine.step_count(), 0);
    }

    #[test]
    fn test_consuming_and_epsilon_moves_both_fire() {
        let pda = automaton(
            "q0, q1, q2",
            "a",
            "Z0",
            "",
            Some("Z0"),
            "q0, epsilon, Z0 -> q2, Z0\n\
             q0, a, Z0 -> q1, Z0",
        );
        let mut engine = loaded(pda, "a");

        assert_eq!(engine.step(), Step::Running);
        assert_eq!(
            engine.branches(),
            &[
                Branch::new("q1", vec!["Z0".into()], 1),
                Branch::new("q2", vec!["Z0".into()], 0),
            ]
        );
    }

    #[test]
    fn test_epsilon_top_matches_empty_stack() {
        let pda = automaton("q0, qf", "a", "", "qf", None, "q0, a, epsilon -> qf, epsilon");
        let mut engine = loaded(pda, "a");

        assert_eq!(engine.step(), Step::Halt(Verdict::Accepted));
        assert!(engine.branches()[0].stack.is_empty());
    }

    #[test]
    fn test_epsilon_top_does_not_match_non_empty_stack() {
        let pda = automaton(
            "q0, qf",
            "a",
            "Z0",
            "qf",
            Some("Z0"),
            "q0, a, epsilon -> qf, epsilon",
        );
        let mut engine = loaded(pda, "a");

        assert_eq!(engine.step(), Step::Halt(Verdict::Rejected));
    }

    #[test]
    fn test_compact_push_on_empty_stack() {
        let pda = automaton("q0, q1", "a", "A, B, Z0", "", None, "q0, a, epsilon -> q1, ABZ0");
        let mut engine = loaded(pda, "a");

        engine.step();
        assert_eq!(stack_top_down(&engine.branches()[0]), vec!["A", "B", "Z0"]);
    }

    #[test]
    fn test_comma_and_space_pushes_agree() {
        let run = |push: &str| {
            let rules = format!("q0, a, epsilon -> q1, {push}");
            let pda = automaton("q0, q1", "a", "A, Z0", "", None, &rules);
            let mut engine = loaded(pda, "a");
            engine.step();
            engine.branches()[0].clone()
        };

        let comma = run("Z0,A");
        let space = run("Z0 A");
        assert_eq!(comma, space);
        // The first listed symbol ends up on top.
        assert_eq!(stack_top_down(&comma), vec!["Z0", "A"]);
    }

    #[test]
    fn test_duplicate_configurations_merge() {
        let pda = automaton(
            "q0, q1, q2, q3",
            "a, b",
            "Z0",
            "",
            Some("Z0"),
            "q0, a, Z0 -> q1, Z0\n\
             q0, a, Z0 -> q2, Z0\n\
             q1, b, Z0 -> q3, Z0\n\
             q2, b, Z0 -> q3, Z0",
        );
        let mut engine = loaded(pda, "ab");

        engine.step();
        assert_eq!(engine.branches().len(), 2);
        engine.step();
        assert_eq!(engine.branches(), &[Branch::new("q3", vec!["Z0".into()], 2)]);
    }

    #[test]
    fn test_identical_rules_merge() {
        let pda = automaton(
            "q0, q1",
            "a",
            "Z0",
            "",
            Some("Z0"),
            "q0, a, Z0 -> q1, Z0\n\
             q0, a, Z0 -> q1, Z0",
        );
        let mut engine = loaded(pda, "aa");

        engine.step();
        assert_eq!(engine.branches().len(), 1);
    }

    /// Every `a` pushes either `A` or `B`, so after n steps there are 2^n distinct stacks.
    fn doubling() -> Automaton {
        automaton(
            "q0, qf",
            "a, b",
            "Z0, A, B",
            "qf",
            Some("Z0"),
            "q0, a, Z0 -> q0, AZ0\n\
             q0, a, Z0 -> q0, BZ0\n\
             q0, a, A -> q0, AA\n\
             q0, a, A -> q0, BA\n\
             q0, a, B -> q0, AB\n\
             q0, a, B -> q0, BB\n\
             q0, b, A -> qf, A",
        )
    }

    #[test]
    fn test_branch_cap_truncates_in_discovery_order() {
        let mut engine = loaded(doubling(), "aaaaaaab");

        for _ in 0..6 {
            assert_eq!(engine.step(), Step::Running);
        }
        assert_eq!(engine.branches().len(), 64);

        assert_eq!(engine.step(), Step::Running);
        assert_eq!(engine.branches().len(), DEFAULT_BRANCH_CAP);
        assert_eq!(
            stack_top_down(&engine.branches()[0]),
            vec!["A", "A", "A", "A", "A", "A", "A", "Z0"]
        );

        // The all-`A` path is discovered first, survives the cap and accepts.
        assert_eq!(engine.step(), Step::Halt(Verdict::Accepted));
    }

    #[test]
    fn test_custom_branch_cap() {
        let mut engine = Engine::new(doubling()).with_branch_cap(3);
        engine.reset("aaab").unwrap();

        engine.step();
        assert_eq!(engine.branches().len(), 2);
        engine.step();
        assert_eq!(engine.branches().len(), 3);
        let tops: Vec<Option<&str>> = engine.branches().iter().map(Branch::top).collect();
        assert_eq!(tops, vec![Some("A"), Some("B"), Some("A")]);
    }

    #[test]
    fn test_zero_branch_cap_is_clamped() {
        let engine = Engine::new(doubling()).with_branch_cap(0);
        assert_eq!(engine.branch_cap(), 1);
    }

    #[test]
    fn test_active_count_bounded_by_distinct_configurations() {
        let mut engine = loaded(doubling(), "aaaa");

        for depth in 1..=4 {
            engine.step();
            let distinct: HashSet<&Branch> = engine.branches().iter().collect();
            assert_eq!(distinct.len(), engine.branches().len());
            assert_eq!(engine.branches().len(), 1 << depth);
        }
    }

    #[test]
    fn test_run_stops_at_bound_on_epsilon_loop() {
        let pda = automaton(
            "q0, qf",
            "a",
            "Z0, A",
            "qf",
            Some("Z0"),
            "q0, epsilon, Z0 -> q0, AZ0\n\
             q0, epsilon, A -> q0, AA",
        );
        let mut engine = loaded(pda, "a");

        assert_eq!(engine.run(50), Step::Running);
        assert_eq!(engine.step_count(), 50);
        assert_eq!(engine.branches().len(), 1);
        assert!(!engine.is_halted());
    }

    #[test]
    fn test_failed_reset_leaves_engine_unusable() {
        let mut engine = loaded(a_then_b(), "ab");
        engine.step();

        let error = engine.reset("abc").unwrap_err();
        assert_eq!(error, PdaError::InputSymbol('c'));
        assert!(!engine.is_loaded());
        assert!(engine.branches().is_empty());
        assert_eq!(engine.step(), Step::Halt(Verdict::Rejected));

        engine.reset("ab").unwrap();
        assert_eq!(engine.run(10), Step::Halt(Verdict::Accepted));
    }

    #[test]
    fn test_unreset_engine_rejects() {
        let mut engine = Engine::new(a_then_b());
        assert!(!engine.is_loaded());
        assert_eq!(engine.step(), Step::Halt(Verdict::Rejected));
        assert_eq!(engine.step_count(), 0);
    }

    #[test]
    fn test_status_snapshot_reflects_progress() {
        let mut engine = loaded(ambiguous(), "abc");
        engine.step();

        let status = engine.status();
        assert_eq!(status.step_count, 1);
        assert_eq!(status.verdict, None);
        assert_eq!(status.total_branches, 2);
        assert_eq!(
            status.to_string(),
            "Branch 1: state=q1 | stack=Z0 | rest=bc\nBranch 2: state=q2 | stack=Z0 | rest=bc"
        );
    }

    #[test]
    fn test_merge_keeps_first_seen_order() {
        let branches = vec![
            Branch::new("q2", Vec::new(), 0),
            Branch::new("q1", Vec::new(), 0),
            Branch::new("q2", Vec::new(), 0),
            Branch::new("q1", Vec::new(), 1),
        ];

        let merged = merge(branches, 10);
        let states: Vec<(&str, usize)> =
            merged.iter().map(|b| (b.state.as_str(), b.cursor)).collect();
        assert_eq!(states, vec![("q2", 0), ("q1", 0), ("q1", 1)]);
    }
}
