//! This module provides the parser for pushdown automaton definition files, utilizing the
//! `pest` crate. Section structure is checked strictly; the rule lines themselves go through
//! the permissive transition parser, so malformed rules are dropped rather than reported.

use crate::{
    analyzer::analyze,
    transitions::parse_transitions,
    types::{Automaton, PdaError, EPSILON_WORD},
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::Pair,
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::HashSet;

/// Derives a `PestParser` for the definition grammar in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct DefinitionParser;

/// Parses a definition file into an `Automaton`.
///
/// The `initial` and `rules` sections are required. Analyzer diagnostics are logged as
/// warnings and never fail the parse.
///
/// # Returns
///
/// * `Ok(Automaton)` if the input is successfully parsed.
/// * `Err(PdaError::ParseError)` if there are syntax errors or duplicate sections.
/// * `Err(PdaError::ValidationError)` if a required section is missing.
pub fn parse(input: &str) -> Result<Automaton, PdaError> {
    let root = DefinitionParser::parse(Rule::program, input.trim())
        .map_err(|e| PdaError::ParseError(e.into()))?
        .next()
        .ok_or_else(|| PdaError::ValidationError("Empty definition".to_string()))?;

    let automaton = parse_program(root)?;

    for diagnostic in analyze(&automaton) {
        log::warn!("{}: {}", automaton.name, diagnostic);
    }

    Ok(automaton)
}

/// Splits a comma separated list, trimming items and dropping blanks, `epsilon` and
/// repeated entries. First occurrences keep their order.
pub fn parse_list(input: &str) -> Vec<String> {
    let mut seen = HashSet::new();

    input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty() && !item.eq_ignore_ascii_case(EPSILON_WORD))
        .filter(|item| seen.insert(*item))
        .map(String::from)
        .collect()
}

fn parse_program(pair: Pair<Rule>) -> Result<Automaton, PdaError> {
    let mut name: Option<String> = None;
    let mut states: Option<Vec<String>> = None;
    let mut input_alphabet: Option<Vec<String>> = None;
    let mut stack_alphabet: Option<Vec<String>> = None;
    let mut initial_state: Option<String> = None;
    let mut final_states: Option<Vec<String>> = None;
    let mut stack_init: Option<String> = None;
    let mut rules: Option<String> = None;
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        let span = p.as_span();
        let rule = p.as_rule();

        check_unique_rule(rule, span, &mut seen)?;

        match rule {
            Rule::name => name = Some(parse_value(p)),
            Rule::states => states = Some(parse_list(&parse_value(p))),
            Rule::input_alphabet => input_alphabet = Some(parse_list(&parse_value(p))),
            Rule::stack_alphabet => stack_alphabet = Some(parse_list(&parse_value(p))),
            Rule::initial_state => initial_state = Some(parse_value(p)),
            Rule::final_states => final_states = Some(parse_list(&parse_value(p))),
            Rule::stack_init => stack_init = Some(parse_value(p)),
            Rule::rules => rules = Some(parse_rule_lines(p)),
            _ => {} // EOI
        }
    }

    let initial_state = check_required_rule(initial_state, "initial")?;
    let rules = check_required_rule(rules, "rules")?;

    if initial_state.is_empty() {
        return Err(PdaError::ValidationError(
            "Initial state must not be empty".to_string(),
        ));
    }

    let name = name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Untitled".to_string());

    Ok(Automaton::new(
        states.unwrap_or_default(),
        input_alphabet.unwrap_or_default(),
        stack_alphabet.unwrap_or_default(),
        initial_state,
        final_states.unwrap_or_default(),
        parse_transitions(&rules),
        stack_init,
    )
    .with_name(name))
}

/// Extracts the trimmed `value` of a `key: value` section.
fn parse_value(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|p| p.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Joins the rule lines of a `rules:` section back into newline separated text.
fn parse_rule_lines(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::rule_line)
        .map(|p| p.as_str().trim().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Creates a `PdaError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> PdaError {
    PdaError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Rejects a section that appears more than once.
fn check_unique_rule(rule: Rule, span: Span, seen: &mut HashSet<Rule>) -> Result<(), PdaError> {
    if rule == Rule::EOI {
        return Ok(());
    }

    if !seen.insert(rule) {
        return Err(parse_error(
            &format!("Duplicate \"{}:\" declaration", section_name(rule)),
            span,
        ));
    }

    Ok(())
}

fn check_required_rule<T>(value: Option<T>, name: &str) -> Result<T, PdaError> {
    value.ok_or_else(|| PdaError::ValidationError(format!("Missing '{name}' section")))
}

/// The keyword a section is written with.
fn section_name(rule: Rule) -> &'static str {
    match rule {
        Rule::name => "name",
        Rule::states => "states",
        Rule::input_alphabet => "input",
        Rule::stack_alphabet => "stack",
        Rule::initial_state => "initial",
        Rule::final_states => "final",
        Rule::stack_init => "stack_init",
        Rule::rules => "rules",
        _ => "unknown",
    }
}
