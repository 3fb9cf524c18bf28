//! This crate provides the core logic for a nondeterministic pushdown automaton simulator.
//! It includes modules for parsing transition rules and definition files, exploring every
//! computation branch in lockstep, analyzing definitions, and a small catalog of built-in
//! automata.

pub mod analyzer;
pub mod branch;
pub mod engine;
pub mod loader;
pub mod parser;
pub mod programs;
pub mod status;
pub mod transitions;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `Diagnostic` enum from the analyzer module.
pub use analyzer::{analyze, Diagnostic};
/// Re-exports the `Branch` struct from the branch module.
pub use branch::Branch;
/// Re-exports the `Engine` struct from the engine module.
pub use engine::Engine;
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the definition `parse` function and the list splitter from the parser module.
pub use parser::{parse, parse_list};
/// Re-exports `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{ProgramInfo, ProgramManager, PROGRAMS};
/// Re-exports the status projections.
pub use status::{BranchSummary, StatusSnapshot};
/// Re-exports the transition table and its rule parser.
pub use transitions::{parse_push, parse_transitions, Move, TransitionKey, TransitionTable};
/// Re-exports the automaton definition, step outcomes and error type from the types module.
pub use types::{
    Automaton, PdaError, Step, Symbol, Verdict, DEFAULT_BRANCH_CAP, MAX_EXECUTION_STEPS,
    MAX_PROGRAM_SIZE,
};
