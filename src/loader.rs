//! This module provides the `ProgramLoader` struct, responsible for loading automaton
//! definitions from files, directories and strings.

use crate::parser::parse;
use crate::types::{Automaton, PdaError, MAX_PROGRAM_SIZE};
use std::fs;
use std::path::{Path, PathBuf};

/// The file extension of automaton definition files.
pub const PROGRAM_EXTENSION: &str = "pda";

/// `ProgramLoader` is a utility struct for loading automaton definitions.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a single definition from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Automaton)` if the file is successfully read and parsed.
    /// * `Err(PdaError::FileError)` if the file cannot be read.
    /// * `Err(PdaError::ParseError)` or `Err(PdaError::ValidationError)` if the content is
    ///   not a valid definition.
    pub fn load_program(path: &Path) -> Result<Automaton, PdaError> {
        let content = fs::read_to_string(path).map_err(|e| {
            PdaError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Self::load_program_from_string(&content)
    }

    /// Loads a single definition from the provided string content.
    pub fn load_program_from_string(content: &str) -> Result<Automaton, PdaError> {
        if content.len() > MAX_PROGRAM_SIZE {
            return Err(PdaError::ValidationError(format!(
                "Definition is {} bytes, the limit is {} bytes",
                content.len(),
                MAX_PROGRAM_SIZE
            )));
        }

        parse(content)
    }

    /// Loads every `.pda` file in `directory`.
    ///
    /// Directories and files with other extensions are skipped. Each remaining file yields
    /// either its path and automaton or the error that prevented loading it. Results are
    /// sorted by path.
    pub fn load_programs(directory: &Path) -> Vec<Result<(PathBuf, Automaton), PdaError>> {
        if !directory.exists() {
            return vec![Err(PdaError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(PdaError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut paths = Vec::new();
        let mut results = Vec::new();

        for entry in entries {
            match entry {
                Ok(entry) => paths.push(entry.path()),
                Err(e) => results.push(Err(PdaError::FileError(format!(
                    "Failed to read directory entry: {}",
                    e
                )))),
            }
        }

        paths.sort();

        results.extend(
            paths
                .into_iter()
                .filter(|path| {
                    !path.is_dir() && path.extension().is_some_and(|ext| ext == PROGRAM_EXTENSION)
                })
                .map(|path| match Self::load_program(&path) {
                    Ok(automaton) => Ok((path, automaton)),
                    Err(e) => Err(PdaError::FileError(format!(
                        "Failed to load definition from {}: {}",
                        path.display(),
                        e
                    ))),
                }),
        );

        results
    }
}
