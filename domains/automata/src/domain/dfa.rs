//! DFA construction and execution
//!
//! A [`Dfa`] is a definition that has passed structural validation: the
//! initial state is declared, final states are a subset of the state set,
//! and every transition endpoint and symbol is declared. Construction is
//! atomic: a definition that fails any check yields no instance.

use std::collections::BTreeSet;

use thiserror::Error;
use tracing::debug;

use crate::domain::entities::{AutomatonDefinition, RunResult, TransitionMap};

/// Structural validation failures, each naming the offending identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("initial state '{0}' is not in the state set")]
    InitialStateUndeclared(String),

    #[error("final state '{0}' is not in the state set")]
    FinalStateUndeclared(String),

    #[error("transition source state '{0}' is not in the state set")]
    SourceStateUndeclared(String),

    #[error("symbol '{symbol}' in transitions of state '{state}' is not in the alphabet")]
    SymbolUndeclared { state: String, symbol: String },

    #[error("destination state '{destination}' in transitions of state '{state}' is not in the state set")]
    DestinationUndeclared {
        state: String,
        destination: String,
    },
}

/// A validated deterministic finite automaton.
///
/// The transition function may be partial: an undefined `(state, symbol)`
/// pair acts as an implicit reject during a run, never as an error.
/// Instances hold no mutable simulation state; `run` can be called any
/// number of times, from any number of readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    states: BTreeSet<String>,
    alphabet: BTreeSet<String>,
    transitions: TransitionMap,
    initial_state: String,
    final_states: BTreeSet<String>,
}

impl Dfa {
    /// Validate a structural definition and take ownership of its pieces.
    ///
    /// Checks run in a fixed order (initial state, final states, then
    /// each transition's source, symbol, and destination) and the first
    /// mismatch encountered is reported. Scan order over transitions is
    /// the map's iteration order and is not contractual.
    pub fn new(definition: &AutomatonDefinition) -> Result<Self, ValidationError> {
        Self::validate(definition)?;
        Ok(Self {
            states: definition.states.clone(),
            alphabet: definition.alphabet.clone(),
            transitions: definition.transitions.clone(),
            initial_state: definition.initial_state.clone(),
            final_states: definition.final_states.clone(),
        })
    }

    fn validate(definition: &AutomatonDefinition) -> Result<(), ValidationError> {
        if !definition.states.contains(&definition.initial_state) {
            return Err(ValidationError::InitialStateUndeclared(
                definition.initial_state.clone(),
            ));
        }

        for state in &definition.final_states {
            if !definition.states.contains(state) {
                return Err(ValidationError::FinalStateUndeclared(state.clone()));
            }
        }

        for (source, row) in &definition.transitions {
            if !definition.states.contains(source) {
                return Err(ValidationError::SourceStateUndeclared(source.clone()));
            }
            for (symbol, destination) in row {
                if !definition.alphabet.contains(symbol) {
                    return Err(ValidationError::SymbolUndeclared {
                        state: source.clone(),
                        symbol: symbol.clone(),
                    });
                }
                if !definition.states.contains(destination) {
                    return Err(ValidationError::DestinationUndeclared {
                        state: source.clone(),
                        destination: destination.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn initial_state(&self) -> &str {
        &self.initial_state
    }

    /// Run one input word through the automaton.
    ///
    /// The whole word is checked against the alphabet before any stepping:
    /// a single foreign symbol rejects with a path of just the initial
    /// state, even when a prefix of the word would have been consumable.
    /// During stepping, an undefined `(state, symbol)` pair stops the run
    /// and rejects with the path walked so far; no synthetic dead state
    /// is appended.
    pub fn run(&self, word: &str) -> RunResult {
        for symbol in word.chars() {
            let symbol = symbol.to_string();
            if !self.alphabet.contains(&symbol) {
                debug!(%symbol, "symbol not in alphabet, rejecting without stepping");
                return RunResult {
                    accepted: false,
                    path: vec![self.initial_state.clone()],
                };
            }
        }

        let mut current = self.initial_state.clone();
        let mut path = vec![current.clone()];

        for symbol in word.chars() {
            let symbol = symbol.to_string();
            let next = self
                .transitions
                .get(&current)
                .and_then(|row| row.get(&symbol));
            match next {
                Some(destination) => {
                    current = destination.clone();
                    path.push(current.clone());
                }
                None => {
                    debug!(state = %current, %symbol, "transition undefined, rejecting");
                    return RunResult {
                        accepted: false,
                        path,
                    };
                }
            }
        }

        RunResult {
            accepted: self.final_states.contains(&current),
            path,
        }
    }
}
