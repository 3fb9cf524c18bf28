use crate::parser::parse;
use crate::types::{Automaton, PdaError};

// Built-in definitions
const PROGRAM_TEXTS: [&str; 4] = [
    include_str!("../automata/abc.pda"),
    include_str!("../automata/anbn.pda"),
    include_str!("../automata/palindrome.pda"),
    include_str!("../automata/parentheses.pda"),
];

lazy_static::lazy_static! {
    pub static ref PROGRAMS: Vec<Automaton> = PROGRAM_TEXTS
        .iter()
        .filter_map(|text| match parse(text) {
            Ok(automaton) => Some(automaton),
            Err(e) => {
                log::error!("Failed to parse built-in definition: {e}");
                None
            }
        })
        .collect();
}

/// Read-only access to the built-in automata.
pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<Automaton, PdaError> {
        PROGRAMS
            .get(index)
            .cloned()
            .ok_or_else(|| PdaError::ValidationError(format!("Program index {index} out of range")))
    }

    /// Get a program by its name, ignoring case
    pub fn get_program_by_name(name: &str) -> Result<Automaton, PdaError> {
        PROGRAMS
            .iter()
            .find(|automaton| automaton.name.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| PdaError::ValidationError(format!("Program '{name}' not found")))
    }

    /// List all program names
    pub fn list_program_names() -> Vec<String> {
        PROGRAMS
            .iter()
            .map(|automaton| automaton.name.clone())
            .collect()
    }

    /// Get information about a program by its index
    pub fn get_program_info(index: usize) -> Result<ProgramInfo, PdaError> {
        let automaton = Self::get_program_by_index(index)?;

        Ok(ProgramInfo {
            index,
            name: automaton.name.clone(),
            initial_state: automaton.initial_state.clone(),
            final_states: automaton.final_states.clone(),
            state_count: automaton.states.len(),
            transition_count: automaton.table.len(),
        })
    }

    /// Get the original text of a program by its index
    pub fn get_program_text_by_index(index: usize) -> Result<&'static str, PdaError> {
        PROGRAM_TEXTS.get(index).copied().ok_or_else(|| {
            PdaError::ValidationError(format!("Program text index {index} out of range"))
        })
    }

    /// Search for programs by name
    pub fn search_programs(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();

        PROGRAMS
            .iter()
            .enumerate()
            .filter(|(_, automaton)| automaton.name.to_lowercase().contains(&query))
            .map(|(index, _)| index)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub initial_state: String,
    pub final_states: Vec<String>,
    pub state_count: usize,
    pub transition_count: usize,
}
