//! Parsing of user-authored automaton definitions
//!
//! Two input shapes arrive here: the five raw field strings of the
//! definition form, and a flat key-value text file with a trailing
//! transition block. Both produce an [`AutomatonDefinition`] that is
//! syntactically well-formed but not yet checked against cross-field
//! invariants; that check belongs to DFA construction.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::domain::entities::{AutomatonDefinition, TransitionMap};

/// Marker line separating key-value header from transition rules in an
/// imported file. Matched case-insensitively.
const TRANSITION_MARKERS: [&str; 2] = ["transicoes:", "transitions:"];

/// Required header keys of an import file, canonical name first.
const REQUIRED_KEYS: [(&str, &str); 5] = [
    ("nome", "name"),
    ("alfabeto", "alphabet"),
    ("estados", "states"),
    ("inicial", "initial"),
    ("finais", "finals"),
];

/// Errors produced while parsing definition text.
///
/// Grammar errors carry the 1-based line number and the offending line so
/// the caller can point at the exact rule that failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid format on line {line}: missing '->'. Line: '{text}'")]
    MissingArrow { line: usize, text: String },

    #[error("invalid format on line {line}: more than one '->'. Line: '{text}'")]
    MultipleArrows { line: usize, text: String },

    #[error("invalid format on line {line}: missing ',' between state and symbol. Line: '{text}'")]
    MissingComma { line: usize, text: String },

    #[error("invalid format on line {line}: left side must be 'state, symbol'. Line: '{text}'")]
    MalformedPair { line: usize, text: String },

    #[error(
        "non-determinism on line {line}: state '{state}' already has a transition for symbol '{symbol}'"
    )]
    Nondeterministic {
        state: String,
        symbol: String,
        line: usize,
    },

    #[error("invalid header line (expected 'key: value'): '{text}'")]
    MalformedKeyValue { text: String },

    #[error("definition file is incomplete, missing keys: {}", .missing.join(", "))]
    MissingKeys { missing: Vec<String> },

    #[error("definition file contains no transition rules after the marker")]
    NoTransitions,
}

/// Raw field strings as they arrive from a form or an import file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinitionFields {
    pub name: String,
    pub states: String,
    pub alphabet: String,
    pub initial: String,
    pub finals: String,
    pub transitions: String,
}

/// Split a comma-separated field into a set of trimmed, non-empty tokens.
/// Order is irrelevant and duplicates collapse silently.
pub fn parse_token_set(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a multi-line transition block, one `STATE , SYMBOL -> DESTINATION`
/// rule per non-blank line.
///
/// Checks run in a fixed order per line: arrow count, comma count, then
/// the duplicate-pair guard. The guard must run here, over raw text; the
/// resulting map silently overwrites on duplicate keys otherwise.
pub fn parse_transitions(raw: &str) -> Result<TransitionMap, ParseError> {
    let mut transitions = TransitionMap::new();

    for (index, raw_line) in raw.lines().enumerate() {
        let line = index + 1;
        let text = raw_line.trim();
        if text.is_empty() {
            continue;
        }

        let arrow_parts: Vec<&str> = text.split("->").collect();
        match arrow_parts.len() {
            1 => {
                return Err(ParseError::MissingArrow {
                    line,
                    text: text.to_string(),
                })
            }
            2 => {}
            _ => {
                return Err(ParseError::MultipleArrows {
                    line,
                    text: text.to_string(),
                })
            }
        }

        let left = arrow_parts[0].trim();
        let destination = arrow_parts[1].trim();

        let pair_parts: Vec<&str> = left.split(',').collect();
        match pair_parts.len() {
            1 => {
                return Err(ParseError::MissingComma {
                    line,
                    text: text.to_string(),
                })
            }
            2 => {}
            _ => {
                return Err(ParseError::MalformedPair {
                    line,
                    text: text.to_string(),
                })
            }
        }

        let state = pair_parts[0].trim();
        let symbol = pair_parts[1].trim();

        let row = transitions.entry(state.to_string()).or_default();
        if row.contains_key(symbol) {
            return Err(ParseError::Nondeterministic {
                state: state.to_string(),
                symbol: symbol.to_string(),
                line,
            });
        }
        row.insert(symbol.to_string(), destination.to_string());
    }

    Ok(transitions)
}

/// Assemble the five raw fields plus the transition block into a
/// structural definition.
///
/// The output is not validated against cross-field invariants (whether a
/// transition's state is declared, and so on); DFA construction is the
/// single source of truth for semantic validity.
pub fn parse_fields(fields: &DefinitionFields) -> Result<AutomatonDefinition, ParseError> {
    Ok(AutomatonDefinition {
        name: fields.name.trim().to_string(),
        states: parse_token_set(&fields.states),
        alphabet: parse_token_set(&fields.alphabet),
        initial_state: fields.initial.trim().to_string(),
        final_states: parse_token_set(&fields.finals),
        transitions: parse_transitions(&fields.transitions)?,
    })
}

/// Parse the flat import-file format: `key: value` header lines, a
/// `transicoes:`/`transitions:` marker, then the transition block.
///
/// Header keys are case-insensitive and accepted in Portuguese (the
/// documented format) or English. All five are required; the error names
/// every missing key at once.
pub fn parse_file(content: &str) -> Result<DefinitionFields, ParseError> {
    let mut header: BTreeMap<String, String> = BTreeMap::new();
    let mut transition_lines: Vec<&str> = Vec::new();
    let mut in_transitions = false;

    for raw_line in content.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if !in_transitions {
            let lowered = line.to_lowercase();
            if TRANSITION_MARKERS
                .iter()
                .any(|marker| lowered.starts_with(marker))
            {
                in_transitions = true;
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                return Err(ParseError::MalformedKeyValue {
                    text: line.to_string(),
                });
            };
            header.insert(key.trim().to_lowercase(), value.trim().to_string());
        } else {
            transition_lines.push(line);
        }
    }

    let lookup = |canonical: &str, alias: &str| {
        header
            .get(canonical)
            .or_else(|| header.get(alias))
            .cloned()
    };

    let missing: Vec<String> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|&(canonical, alias)| lookup(canonical, alias).is_none())
        .map(|(canonical, _)| canonical.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ParseError::MissingKeys { missing });
    }

    if transition_lines.is_empty() {
        return Err(ParseError::NoTransitions);
    }

    Ok(DefinitionFields {
        name: lookup("nome", "name").unwrap_or_default(),
        alphabet: lookup("alfabeto", "alphabet").unwrap_or_default(),
        states: lookup("estados", "states").unwrap_or_default(),
        initial: lookup("inicial", "initial").unwrap_or_default(),
        finals: lookup("finais", "finals").unwrap_or_default(),
        transitions: transition_lines.join("\n"),
    })
}
